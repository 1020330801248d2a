// Molt Agent
// Main entry point for the molt-agent binary

use clap::Parser;
use molt_engine::cli::{Cli, Command};
use molt_engine::config::Config;
use molt_engine::handlers::{handle_cycle, handle_run, handle_stats, report_failure, OutputFormat};
use molt_engine::telemetry::{init_telemetry_with_level, update_log_level};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize telemetry first (before config is loaded)
    init_telemetry_with_level(cli.log.as_deref().unwrap_or("info"));

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::info!("Molt Agent v{} ({} - {})", version, commit, timestamp);

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    if let Err(e) = run(cli, format).await {
        std::process::exit(report_failure(&e));
    }
}

async fn run(cli: Cli, format: OutputFormat) -> anyhow::Result<()> {
    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // The --log flag wins over the configured level
    if cli.log.is_none() {
        update_log_level(&config.core.log_level);
    }

    // Handle commands
    match cli.command {
        Command::Run => {
            tracing::info!("Starting agent loop...");
            handle_run(&config).await
        }

        Command::Cycle { count } => {
            tracing::info!("Running {} cycle(s)", count);
            handle_cycle(count, &config, format).await
        }

        Command::Stats => handle_stats(&config, format),
    }
}
