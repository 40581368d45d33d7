mod logic;
mod trigger;

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use tokio::io::AsyncReadExt;

use crate::app::App;
use crate::telemetry::{self};
use crate::telemetry::ops::dispatch::Phase as DispatchPhase;

pub use self::logic::Dispatcher;

#[derive(Args)]
pub struct InvokeCmd {
    /// Trigger payload file; `-` or absent reads stdin
    #[arg(long)] pub event: Option<String>,
}

pub async fn run(app: &App, args: InvokeCmd) -> Result<()> {
    let started = Instant::now();
    let log = telemetry::dispatch();
    let source = args.event.clone().unwrap_or_else(|| "-".to_string());
    let _g = log.root_span_kv([("event", source.clone())]).entered();

    let event = {
        let _s = log.span(&DispatchPhase::ReadEvent).entered();
        read_event(&source).await?
    };

    let result = app
        .dispatcher()
        .dispatch(&event)
        .await
        .context("dispatch trigger")?;
    log.result(&result, started)?;
    Ok(())
}

async fn read_event(source: &str) -> Result<Value> {
    let raw = if source == "-" {
        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await.context("read trigger from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(source).await.with_context(|| format!("read trigger file {}", source))?
    };
    serde_json::from_str(&raw).with_context(|| format!("trigger payload from {} is not JSON", source))
}
