mod logic;

use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use crate::app::App;
use crate::pipeline::types::{InvocationResult, RollupView};
use crate::telemetry::{self};
use crate::telemetry::ops::rollup::Phase as RollupPhase;

pub use self::logic::RollupAggregator;

#[derive(Args)]
pub struct RollupCmd {
    /// Defaults to RAW_BUCKET
    #[arg(long)] pub bucket: Option<String>,
    /// Defaults to SUMMARY_PREFIX
    #[arg(long)] pub prefix: Option<String>,
    #[arg(long, default_value_t = false)] pub apply: bool,
    #[arg(long, default_value_t = 10)] pub plan_limit: usize,
}

pub async fn run(app: &App, args: RollupCmd) -> Result<()> {
    let started = Instant::now();
    let bucket = args.bucket.unwrap_or_else(|| app.settings.bucket.clone());
    let prefix = args.prefix.unwrap_or_else(|| app.settings.summary_prefix.clone());
    let log = telemetry::rollup();
    let _g = log.root_span_kv([
        ("bucket", bucket.clone()),
        ("prefix", prefix.clone()),
        ("apply", args.apply.to_string()),
    ]).entered();

    let aggregator = app.aggregator();

    if !args.apply {
        let out = aggregator
            .collect(&bucket, &prefix, Utc::now())
            .await
            .with_context(|| format!("collect summaries under {}/{}", bucket, prefix))?;
        let _sp = log.span(&RollupPhase::Plan).entered();
        log.info(format!(
            "📝 Rollup plan — {} → {} summaries={} skipped={} count={}",
            prefix, out.report_key, out.aggregate.sources.len(), out.skipped.len(), out.aggregate.count
        ));
        for s in out.skipped.iter().take(args.plan_limit) { log.info(format!("  skip {} ({})", s.key, s.reason)); }
        if out.skipped.len() > args.plan_limit { log.info(format!("  ... ({} more)", out.skipped.len() - args.plan_limit)); }
        log.info("   Use --apply to execute.");
        let plan = RollupView {
            bucket: &bucket,
            prefix: &prefix,
            report_key: &out.report_key,
            count: out.aggregate.count,
            sums: &out.aggregate.sums,
            sources: out.aggregate.sources.len(),
            skipped: &out.skipped,
        };
        log.plan(&plan)?;
        return Ok(());
    }

    let out = aggregator
        .rollup(&bucket, &prefix)
        .await
        .with_context(|| format!("rollup {}/{}", bucket, prefix))?;
    log.result(&InvocationResult::rolled_up(out.report_key, None), started)?;
    Ok(())
}
