use clap::{Parser, Subcommand};
use anyhow::Result;
use dotenvy::dotenv;
use std::path::PathBuf;

mod app;
mod config;
mod error;
mod init;
mod output;
mod pipeline;
mod record;
mod store;
mod summary;
mod table;
mod telemetry;

use crate::config::Settings;
use crate::output::config::{OutputConfig, OutputFormat};

#[derive(Parser)]
#[command(name = "rollup", about = "Per-object summaries and daily rollup reports")]
struct Cli {
    #[arg(global = true, short, long)]
    dsn: Option<String>,
    /// Root directory of the local object store
    #[arg(global = true, long)]
    store_root: Option<PathBuf>,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch one trigger payload
    Invoke(pipeline::dispatch::InvokeCmd),
    /// Summarize a single object
    Process(pipeline::process::ProcessCmd),
    /// Merge all summaries into today's report
    Rollup(pipeline::rollup::RollupCmd),
    Init(init::InitCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json || OutputConfig::from_env().format == OutputFormat::Json);

    // logs on stderr; RUST_LOG and ROLLUP_LOG_FORMAT apply
    telemetry::config::init_tracing();

    let mut settings = Settings::from_env();
    if let Some(dsn) = cli.dsn { settings.database_url = Some(dsn); }
    if let Some(root) = cli.store_root { settings.store_root = root; }

    match cli.command {
        Commands::Init(args) => init::run(&settings, args).await?,
        Commands::Invoke(args) => pipeline::dispatch::run(&app::App::from_settings(settings).await?, args).await?,
        Commands::Process(args) => pipeline::process::run(&app::App::from_settings(settings).await?, args).await?,
        Commands::Rollup(args) => pipeline::rollup::run(&app::App::from_settings(settings).await?, args).await?,
    }

    Ok(())
}
