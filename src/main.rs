// SPDX-License-Identifier: PMPL-1.0-or-later
//! Canvasbot CLI - WCAG accessibility checker for design documents

use canvasbot::advisor::AdviceClient;
use canvasbot::host::JsonDocument;
use canvasbot::issue::Severity;
use canvasbot::report::{generate_report, OutputFormat, Report};
use canvasbot::scanner::{ContinuousValidation, Validator};
use canvasbot::Config;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// WCAG accessibility checker for design documents
#[derive(Parser)]
#[command(name = "canvasbot")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a JSON design document
    Check {
        /// Document to check
        document: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Attach AI remediation advice to each issue
        #[arg(long)]
        advice: bool,

        /// Configuration file
        #[arg(long, default_value = "canvasbot.toml")]
        config: String,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// Re-check a document on a fixed interval until interrupted
    Watch {
        /// Document to watch
        document: PathBuf,

        /// Scan interval in milliseconds (defaults to scan.check_frequency_ms)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Configuration file
        #[arg(long, default_value = "canvasbot.toml")]
        config: String,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// Check the bundled sample document
    Demo {
        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },
}

/// Output format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// Standalone HTML
    Html,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Html => OutputFormat::Html,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("canvasbot=debug")
        } else {
            EnvFilter::new("canvasbot=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { document, format, output, advice, config, verbose } => {
            init_logging(verbose);
            let config = Config::load(&config)?;
            let advisor = if advice {
                let client = AdviceClient::from_config(&config.advisor)?;
                if client.is_none() {
                    eprintln!("No API key configured; continuing without AI advice");
                }
                client
            } else {
                None
            };

            let doc = JsonDocument::from_path(&document).await?;
            let validator = Validator::new(config.rules, advisor);
            let report = validator.validate_with_advice(&doc).await;
            write_output(&generate_report(&report, format.into()), output.as_deref())?;

            if has_errors(&report) {
                std::process::exit(1);
            }
        }

        Commands::Watch { document, interval_ms, config, verbose } => {
            init_logging(verbose);
            let config = Config::load(&config)?;
            let interval = interval_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.scan.check_frequency());

            let doc = Arc::new(JsonDocument::from_path(&document).await?);
            let validator = Arc::new(Validator::new(config.rules, None));
            let watcher = ContinuousValidation::start(validator, doc, interval, |report| {
                println!(
                    "[{}] score {}/100 ({}), {} issue(s) in {} element(s)",
                    report.generated_at.format("%H:%M:%S"),
                    report.score,
                    report.compliance_level(),
                    report.issues.len(),
                    report.total_elements
                );
            });

            tokio::signal::ctrl_c().await?;
            info!("Interrupted, stopping");
            watcher.stop().await;
        }

        Commands::Demo { format, verbose } => {
            init_logging(verbose);
            let validator = Validator::new(Config::default().rules, None);
            let report = validator.validate(&JsonDocument::sample()).await;
            println!("{}", generate_report(&report, format.into()));
        }
    }

    Ok(())
}

fn has_errors(report: &Report) -> bool {
    report.issues.iter().any(|i| i.severity == Severity::Error)
}

/// Write output to file or stdout
fn write_output(content: &str, path: Option<&std::path::Path>) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, content)?;
            eprintln!("Report written to {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
