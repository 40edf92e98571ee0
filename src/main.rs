use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use networth::config::{default_config_path, ResolvedConfig};
use networth::dashboard::Dashboard;
use networth::quotes::providers::YahooQuoteSource;
use networth::quotes::{NoopQuoteSource, QuoteSource};
use networth::report::{dashboard_output, render_text};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "networth")]
#[command(about = "Net worth dashboard from a personal spreadsheet and live quotes")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Compute and show net worth (default)
    Show {
        /// Print JSON instead of the text dashboard
        #[arg(long)]
        json: bool,

        /// Skip live quotes; equities fall back to cost basis
        #[arg(long)]
        offline: bool,
    },
    /// Show the resolved configuration
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    let cli = Cli::parse();

    let config = ResolvedConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;

    match cli.command.unwrap_or(Command::Show {
        json: false,
        offline: false,
    }) {
        Command::Show { json, offline } => show(&config, json, offline).await,
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

async fn show(config: &ResolvedConfig, json: bool, offline: bool) -> Result<()> {
    let source: Arc<dyn QuoteSource> = if offline {
        Arc::new(NoopQuoteSource)
    } else {
        Arc::new(
            YahooQuoteSource::new(config.quotes.timeout)?.with_base_url(&config.quotes.base_url),
        )
    };

    let mut dashboard = Dashboard::from_config(config, source);
    let report = dashboard.run(&config.workbook_path, Utc::now()).await?;

    if json {
        let output = dashboard_output(&report, &config.display);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_text(&report, &config.display));
    }

    Ok(())
}
