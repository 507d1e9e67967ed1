//! Main entry point for the BibTeX metadata CLI

#![forbid(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bibtex_metadata::cli::commands::{self, Commands, ConvertOptions};
use bibtex_metadata::AppConfig;

/// Enrich BibTeX entries with translated abstracts, summaries and keywords
#[derive(Parser, Debug)]
#[command(name = "bibtex-metadata", version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors, hide the progress bar
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Config file (defaults to ./config.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("bibtex_metadata={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &args.config {
        Some(path) => AppConfig::load_from(path, true),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;

    match args.command {
        Some(Commands::Convert {
            input,
            output,
            provider,
            recursive,
            format,
            test,
        }) => {
            let options = ConvertOptions {
                input,
                output,
                provider,
                recursive,
                format,
                test,
                quiet: args.quiet,
            };
            commands::handle_convert(config, options).await?;
        }
        Some(Commands::Providers) => {
            commands::handle_providers(&config)?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
