//! wemkit-convert - batch Wwise audio converter
//!
//! Usage: `wemkit-convert <INPUT_DIR> <OUTPUT_DIR>`
//!
//! Walks INPUT_DIR for bank descriptions, decodes every streamed asset into
//! `OUTPUT_DIR/<language>/<bank>/`, and writes the bank manifests plus the
//! global missing-asset and event reports.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use wemkit_common::config::ConfigResolver;
use wemkit_common::fs::check_io_dirs;
use wemkit_common::logging::{init_tracing, with_startup_logging};
use wemkit_convert::{Converter, ConverterOptions, VgmstreamDecoder};

/// Command-line arguments for wemkit-convert
#[derive(Parser, Debug)]
#[command(name = "wemkit-convert")]
#[command(about = "Convert a Wwise audio asset tree into per-language, per-bank WAV directories")]
#[command(version)]
struct Args {
    /// Directory tree containing bank descriptions and source assets
    input_dir: PathBuf,

    /// Output root (created on demand)
    output_dir: PathBuf,

    /// Config file (overrides WEMKIT_CONFIG and the platform default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Decoder executable (overrides config and WEMKIT_DECODER)
    #[arg(long)]
    decoder: Option<String>,

    /// Decoder processes to run at once within one bank
    #[arg(short = 'j', long)]
    jobs: Option<usize>,
}

fn usage_error(message: &str) -> ExitCode {
    eprintln!("error: {message}\n");
    eprintln!("{}", Args::command().render_usage());
    ExitCode::from(1)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            return ExitCode::from(1);
        }
        Err(e) => {
            // --help / --version
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    if let Err(e) = check_io_dirs(&args.input_dir, &args.output_dir) {
        return usage_error(&e.to_string());
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = with_startup_logging(|| ConfigResolver::new(args.config.as_deref()).resolve())
        .context("Failed to load configuration")?;
    if let Some(decoder) = args.decoder {
        config.decoder.command = decoder;
    }
    if let Some(jobs) = args.jobs {
        config.decoder.workers = jobs.max(1);
    }

    init_tracing(&config.logging);

    info!(
        "Starting wemkit-convert v{} ({} {} {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let decoder = Arc::new(VgmstreamDecoder::new(config.decoder.command.clone()));
    let converter = Converter::new(decoder, ConverterOptions::from(&config));
    info!(
        "Decoding with {} ({} worker(s) per bank)",
        config.decoder.command,
        converter.options().workers
    );

    let summary = converter
        .run(&args.input_dir, &args.output_dir)
        .await
        .with_context(|| format!("Failed to read {}", args.input_dir.display()))?;

    info!("{}", summary.display_string());
    if summary.directory_failures > 0 || summary.banks_skipped > 0 {
        warn!(
            directory_failures = summary.directory_failures,
            banks_skipped = summary.banks_skipped,
            "Some directories or banks were skipped, see log above"
        );
    }
    if summary.missing_report_rows > 0 {
        info!(
            "{} missing source assets listed in {}",
            summary.missing_report_rows,
            args.output_dir.join(wemkit_convert::reports::MISSING_REPORT_NAME).display()
        );
    }
    Ok(())
}
