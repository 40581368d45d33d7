use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::config::Settings;
use crate::table::PgSummaryTable;
use crate::telemetry::{self};
use crate::telemetry::ops::init::Phase as InitPhase;

/// Create the summary table (idempotent)
#[derive(Args)]
pub struct InitCmd {}

#[derive(Serialize)]
struct InitResult<'a> {
    table: &'a str,
    ready: bool,
}

pub async fn run(settings: &Settings, _args: InitCmd) -> Result<()> {
    let started = Instant::now();
    let log = telemetry::init();
    let _g = log.root_span_kv([("table", settings.summary_table.clone())]).entered();

    let dsn = settings
        .database_url
        .as_deref()
        .context("init needs a database: pass --dsn or set DATABASE_URL")?;

    let table = {
        let _s = log.span(&InitPhase::Connect).entered();
        PgSummaryTable::connect(dsn, &settings.summary_table).await.context("connect to database")?
    };
    {
        let _s = log.span(&InitPhase::EnsureTable).entered();
        table.ensure_schema().await.with_context(|| format!("create table {}", settings.summary_table))?;
    }
    log.info(format!("✅ Table {} ready", settings.summary_table));
    log.result(&InitResult { table: &settings.summary_table, ready: true }, started)?;
    Ok(())
}
