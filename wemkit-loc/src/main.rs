//! wemkit-loc - gameplay database localization rewrite
//!
//! Usage: `wemkit-loc [LANGUAGE [GAMEPLAY_DB [LOCALIZATION_DB]]]`
//!
//! Arguments left out fall back to the `[localization]` config section.

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use wemkit_common::config::{ConfigResolver, TomlConfig};
use wemkit_common::logging::{init_tracing, with_startup_logging};
use wemkit_loc::{translate_to_language, RewriteOptions};

/// Command-line arguments for wemkit-loc
#[derive(Parser, Debug)]
#[command(name = "wemkit-loc")]
#[command(about = "Replace LOC_ tags in a gameplay database copy with localized text")]
#[command(version)]
struct Args {
    /// Target language code, e.g. zh_Hans_CN
    language: Option<String>,

    /// Gameplay database to copy and rewrite
    gameplay_db: Option<PathBuf>,

    /// Localization database holding LocalizedText
    localization_db: Option<PathBuf>,

    /// Config file (overrides WEMKIT_CONFIG and the platform default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Candidate rows per transaction
    #[arg(long)]
    batch_size: Option<usize>,
}

impl Args {
    /// Config values overridden by whatever was given on the command line
    fn rewrite_options(&self, config: &TomlConfig) -> RewriteOptions {
        let mut options = RewriteOptions::from(&config.localization);
        if let Some(language) = &self.language {
            options.target_language = language.clone();
        }
        if let Some(path) = &self.gameplay_db {
            options.gameplay_db = path.clone();
        }
        if let Some(path) = &self.localization_db {
            options.localization_db = path.clone();
        }
        if let Some(batch_size) = self.batch_size {
            options.batch_size = batch_size.max(1);
        }
        options
    }
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
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    let config = match with_startup_logging(|| ConfigResolver::new(args.config.as_deref()).resolve()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(1);
        }
    };

    let options = args.rewrite_options(&config);
    if let Err(e) = config.localization.check_language(&options.target_language) {
        return usage_error(&e.to_string());
    }

    init_tracing(&config.logging);

    match run(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Localization rewrite failed: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(options: RewriteOptions) -> Result<()> {
    info!(
        "Starting wemkit-loc v{} ({} {} {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!(
        "Translating {} to {} using {}",
        options.gameplay_db.display(),
        options.target_language,
        options.localization_db.display()
    );

    let report = translate_to_language(&options).await?;

    info!("Output: {}", report.output_path.display());
    if report.unresolved > 0 || report.conflicts > 0 {
        info!(
            "{} unresolved and {} conflicting values left unchanged, see {}",
            report.unresolved,
            report.conflicts,
            report.log_path.display()
        );
    }
    Ok(())
}
