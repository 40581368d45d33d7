use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use super::{SummaryRow, SummaryTable, TableError};

/// Postgres-backed summary table. The table name comes from configuration,
/// so statements are built at runtime against a validated identifier.
pub struct PgSummaryTable {
    pool: PgPool,
    table: String,
}

impl PgSummaryTable {
    pub fn new(pool: PgPool, table: &str) -> Result<Self, TableError> {
        validate_table_name(table)?;
        Ok(Self { pool, table: table.to_string() })
    }

    pub async fn connect(dsn: &str, table: &str) -> Result<Self, TableError> {
        validate_table_name(table)?;
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(dsn)
            .await?;
        Self::new(pool, table)
    }

    /// Create the table and its date index if missing (idempotent).
    pub async fn ensure_schema(&self) -> Result<(), TableError> {
        let create = create_table_sql(&self.table);
        sqlx::query(&create).execute(&self.pool).await?;
        let index = format!(
            "CREATE INDEX IF NOT EXISTS {t}_date_idx ON {t} (summary_date)",
            t = self.table
        );
        sqlx::query(&index).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl SummaryTable for PgSummaryTable {
    fn name(&self) -> &str { &self.table }

    async fn put_summary(&self, row: &SummaryRow) -> Result<(), TableError> {
        let sql = upsert_sql(&self.table);
        sqlx::query(&sql)
            .bind(&row.source_key)
            .bind(&row.source_bucket)
            .bind(&row.summary_key)
            .bind(row.summary_date)
            .bind(row.record_count)
            .bind(row.data_type.as_str())
            .bind(row.total_amount)
            .bind(&row.sums)
            .bind(row.processed_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub fn validate_table_name(name: &str) -> Result<(), TableError> {
    let mut chars = name.chars();
    let ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.len() <= 48;
    if ok { Ok(()) } else { Err(TableError::InvalidName(name.to_string())) }
}

fn create_table_sql(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            source_bucket TEXT NOT NULL,
            source_key    TEXT NOT NULL,
            summary_key   TEXT NOT NULL,
            summary_date  DATE NOT NULL,
            record_count  BIGINT NOT NULL,
            data_type     TEXT NOT NULL,
            total_amount  DOUBLE PRECISION NOT NULL DEFAULT 0,
            sums          JSONB NOT NULL DEFAULT '{{}}'::jsonb,
            processed_at  TIMESTAMPTZ NOT NULL,
            PRIMARY KEY (source_bucket, source_key)
        )
        "#
    )
}

fn upsert_sql(table: &str) -> String {
    format!(
        r#"
        INSERT INTO {table} (source_key, source_bucket, summary_key, summary_date,
            record_count, data_type, total_amount, sums, processed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (source_bucket, source_key) DO UPDATE
          SET summary_key   = EXCLUDED.summary_key,
              summary_date  = EXCLUDED.summary_date,
              record_count  = EXCLUDED.record_count,
              data_type     = EXCLUDED.data_type,
              total_amount  = EXCLUDED.total_amount,
              sums          = EXCLUDED.sums,
              processed_at  = EXCLUDED.processed_at
        "#
    )
}
