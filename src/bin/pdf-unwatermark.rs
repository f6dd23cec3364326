//! PDF Unwatermark CLI tool
//!
//! Removes watermark XObject invocations from every page of a PDF.
//! Files that cannot be processed are copied to the output unchanged.

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use pdf_unwatermark::pdf::{strip_watermark, Outcome};

const USAGE: &str = "Usage: pdf-unwatermark <input_path> <output_path>";

/// PDF Unwatermark - Strip watermark XObject invocations from page content
#[derive(Parser)]
#[command(name = "pdf-unwatermark")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Remove the watermark from a handout
    pdf-unwatermark handout.pdf handout-clean.pdf

    # Show per-stream debug output
    RUST_LOG=debug pdf-unwatermark handout.pdf handout-clean.pdf")]
struct Cli {
    /// Input PDF file
    #[arg(allow_hyphen_values = true)]
    input: PathBuf,

    /// Output PDF file path
    #[arg(allow_hyphen_values = true)]
    output: PathBuf,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => {
            println!("{}", USAGE);
            process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_ansi(std::io::stdout().is_terminal())
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let outcome = strip_watermark(&cli.input, &cli.output)
        .with_context(|| format!("could not produce {}", cli.output.display()))?;

    match outcome {
        Outcome::Cleaned(report) => {
            let failed = report.failed_pages();
            if !failed.is_empty() {
                tracing::warn!(?failed, "some pages kept their original content");
            }
        }
        Outcome::PassedThrough(_) => {
            tracing::debug!(output = %cli.output.display(), "original copied unchanged");
        }
    }

    Ok(())
}
