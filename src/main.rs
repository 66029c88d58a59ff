//! Samplecut CLI - Audio Sample Extraction
//!
//! Command-line interface for cutting samples out of recordings.

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use samplecut::cli::commands::{self, ExtractArgs};
use samplecut::cli::{Cli, Commands};
use samplecut::engine::TimeRange;
use samplecut::SampleCutConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = SampleCutConfig::load(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;

    // RUST_LOG wins over settings; --verbose wins over both
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Samplecut v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Info { input } => commands::show_info(&input, cli.json)
            .with_context(|| format!("reading {}", input.display()))?,
        Commands::Extract {
            input,
            start,
            end,
            output,
            float,
            first_channel_only,
        } => {
            let args = ExtractArgs {
                range: TimeRange::new(start, end),
                output: output.as_deref(),
                float,
                first_channel_only,
                json: cli.json,
            };
            commands::extract(&config, &input, args)
                .with_context(|| format!("extracting from {}", input.display()))?
        }
        Commands::Preview { input, start, end } => {
            commands::preview(&input, TimeRange::new(start, end))
                .await
                .with_context(|| format!("previewing {}", input.display()))?
        }
        Commands::CheckRange { start, end } => {
            if !commands::check_range(&start, &end) {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
