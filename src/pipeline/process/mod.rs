mod logic;

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::App;
use crate::pipeline::types::{InvocationResult, ProcessView};
use crate::telemetry::{self};
use crate::telemetry::ops::process::Phase as ProcessPhase;

pub use self::logic::ObjectProcessor;

#[derive(Args)]
pub struct ProcessCmd {
    /// Bucket holding the source object
    #[arg(long)] pub bucket: String,
    /// Key of the JSON object to summarize
    #[arg(long)] pub key: String,
    #[arg(long, default_value_t = false)] pub apply: bool,
}

pub async fn run(app: &App, args: ProcessCmd) -> Result<()> {
    let started = Instant::now();
    let log = telemetry::process();
    let _g = log.root_span_kv([
        ("bucket", args.bucket.clone()),
        ("key", args.key.clone()),
        ("apply", args.apply.to_string()),
    ]).entered();

    let processor = app.processor();

    if !args.apply {
        let out = processor
            .evaluate(&args.bucket, &args.key)
            .await
            .with_context(|| format!("summarize {}/{}", args.bucket, args.key))?;
        let _sp = log.span(&ProcessPhase::Plan).entered();
        log.info(format!(
            "📝 Process plan — {}/{} → {}/{} count={} fields={}",
            args.bucket, args.key, out.summary_bucket, out.summary_key, out.summary.count, out.summary.sums.len()
        ));
        log.info("   Use --apply to execute.");
        let plan = ProcessView {
            bucket: &args.bucket,
            key: &args.key,
            summary_bucket: &out.summary_bucket,
            summary_key: &out.summary_key,
            data_type: out.data_type.as_str(),
            count: out.summary.count,
            sums: &out.summary.sums,
        };
        log.plan(&plan)?;
        return Ok(());
    }

    let out = processor
        .process(&args.bucket, &args.key)
        .await
        .with_context(|| format!("process {}/{}", args.bucket, args.key))?;
    log.result(&InvocationResult::processed(out.summary_key), started)?;
    Ok(())
}
