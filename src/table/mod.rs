use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::summary::{DataKind, Summary};

pub mod db;
#[cfg(test)]
pub mod memory;

pub use db::PgSummaryTable;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("invalid table name '{0}'")]
    InvalidName(String),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
    #[cfg(test)]
    #[error("table backend error: {0}")]
    Backend(String),
}

/// One row of the per-object summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub summary_date: NaiveDate,
    pub source_bucket: String,
    pub source_key: String,
    pub summary_key: String,
    pub record_count: i64,
    pub data_type: DataKind,
    pub total_amount: f64,
    pub sums: serde_json::Value,
    pub processed_at: DateTime<Utc>,
}

impl SummaryRow {
    pub fn new(bucket: &str, key: &str, summary_key: &str, summary: &Summary, data_type: DataKind) -> Self {
        SummaryRow {
            summary_date: summary.timestamp.date_naive(),
            source_bucket: bucket.to_string(),
            source_key: key.to_string(),
            summary_key: summary_key.to_string(),
            record_count: i64::try_from(summary.count).unwrap_or(i64::MAX),
            data_type,
            total_amount: summary.total_amount(),
            sums: serde_json::to_value(&summary.sums).unwrap_or(serde_json::Value::Null),
            processed_at: summary.timestamp,
        }
    }
}

/// Structured-table persistence for summaries, kept apart from the blob write.
#[async_trait]
pub trait SummaryTable: Send + Sync {
    fn name(&self) -> &str;

    /// Insert or replace the row for `(row.source_bucket, row.source_key)`.
    async fn put_summary(&self, row: &SummaryRow) -> Result<(), TableError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordBatch;
    use crate::summary::summarize;
    use serde_json::json;

    #[test]
    fn row_carries_summary_fields() {
        let batch = RecordBatch::from_json(json!([{"transaction": "t1", "amount": 10.5}, {"transaction": "t2", "amount": 2}]));
        let summary = summarize(&batch);
        let row = SummaryRow::new("raw", "in/tx.json", "processed/in/tx.json.summary.json", &summary, DataKind::infer(&batch));

        assert_eq!(row.record_count, 2);
        assert_eq!(row.data_type, DataKind::Transactions);
        assert_eq!(row.total_amount, 12.5);
        assert_eq!(row.sums, json!({"amount": 12.5}));
        assert_eq!(row.summary_date, summary.timestamp.date_naive());
    }
}
