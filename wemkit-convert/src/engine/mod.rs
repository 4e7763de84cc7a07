//! Traversal engine
//!
//! Walks the input tree depth-first and, for each bank description found:
//!
//! 1. parses it into a [`Bank`] (a bad document is logged and skipped)
//! 2. provisions `output/<language>/` once per language and
//!    `output/<language>/<bank>/` for every bank
//! 3. converts the bank's streamed assets
//! 4. folds missing assets and events into the run's [`TraversalContext`]
//! 5. writes the bank manifest
//!
//! After the walk the missing-asset report and the event index are written
//! at the output root. The output layout is keyed by language and bank
//! name, never by the shape of the input tree.
//!
//! Only failing to read the input root aborts a run. Unreadable
//! subdirectories, unparsable documents and failed conversions are logged
//! and counted in the [`TraversalSummary`].

pub mod context;
pub mod statistics;

pub use context::TraversalContext;
pub use statistics::TraversalSummary;

use crate::decoder::AudioDecoder;
use crate::error::ConvertError;
use crate::model::Bank;
use crate::parser::BankParser;
use crate::reports;
use futures::future::BoxFuture;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use wemkit_common::config::TomlConfig;
use wemkit_common::fs::{classify, ensure_dir, FileKind};
use wemkit_common::human_time::format_elapsed;

/// Engine settings, usually taken from [`TomlConfig`]
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterOptions {
    /// Extension of bank-description documents (without dot)
    pub description_extension: String,
    /// Extension of raw source assets (without dot)
    pub source_extension: String,
    /// Decoder processes allowed to run at once within one bank
    pub workers: usize,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self::from(&TomlConfig::default())
    }
}

impl From<&TomlConfig> for ConverterOptions {
    fn from(config: &TomlConfig) -> Self {
        Self {
            description_extension: config.convert.description_extension.clone(),
            source_extension: config.convert.source_extension.clone(),
            workers: config.decoder.workers.max(1),
        }
    }
}

/// Drives one or more traversals with a shared decoder
pub struct Converter {
    decoder: Arc<dyn AudioDecoder>,
    parser: BankParser,
    options: ConverterOptions,
}

impl Converter {
    pub fn new(decoder: Arc<dyn AudioDecoder>, options: ConverterOptions) -> Self {
        Self {
            parser: BankParser::new(options.source_extension.clone()),
            decoder,
            options,
        }
    }

    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    /// Convert everything under `input_root` into `output_root`.
    ///
    /// Each call uses a fresh [`TraversalContext`]. Fails only when
    /// `input_root` itself cannot be read.
    pub async fn run(&self, input_root: &Path, output_root: &Path) -> Result<TraversalSummary, ConvertError> {
        let start = Instant::now();
        info!(
            input = %input_root.display(),
            output = %output_root.display(),
            decoder = self.decoder.name(),
            workers = self.options.workers,
            "Starting conversion"
        );

        let entries = read_sorted_entries(input_root)
            .await
            .map_err(|e| ConvertError::Directory(input_root.to_path_buf(), e))?;

        let mut ctx = TraversalContext::new();
        ctx.summary.directories_visited += 1;
        self.visit_entries(input_root, entries, output_root, &mut ctx).await;

        self.write_global_reports(output_root, &mut ctx).await;

        let mut summary = ctx.summary;
        summary.elapsed = start.elapsed();
        info!(
            "Finished {} in {}",
            input_root.display(),
            format_elapsed(summary.elapsed)
        );
        Ok(summary)
    }

    fn walk_dir<'a>(
        &'a self,
        dir: &'a Path,
        output_root: &'a Path,
        ctx: &'a mut TraversalContext,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let start = Instant::now();
            info!("Entering {}", dir.display());

            match read_sorted_entries(dir).await {
                Ok(entries) => {
                    ctx.summary.directories_visited += 1;
                    self.visit_entries(dir, entries, output_root, ctx).await;
                    info!(
                        "Leaving {} ({})",
                        dir.display(),
                        format_elapsed(start.elapsed())
                    );
                }
                Err(e) => {
                    ctx.summary.directory_failures += 1;
                    warn!(
                        path = %dir.display(),
                        error = %e,
                        elapsed = %format_elapsed(start.elapsed()),
                        "Failed to read directory, skipping"
                    );
                }
            }
        })
    }

    async fn visit_entries(
        &self,
        dir: &Path,
        entries: Vec<PathBuf>,
        output_root: &Path,
        ctx: &mut TraversalContext,
    ) {
        for path in entries {
            let metadata = match tokio::fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to stat entry, skipping");
                    continue;
                }
            };

            if metadata.is_dir() {
                self.walk_dir(&path, output_root, ctx).await;
                continue;
            }

            let kind = classify(
                &path,
                &self.options.description_extension,
                &self.options.source_extension,
            );
            if kind == FileKind::Description {
                self.process_description(&path, dir, output_root, ctx).await;
            }
        }
    }

    async fn process_description(
        &self,
        document: &Path,
        input_dir: &Path,
        output_root: &Path,
        ctx: &mut TraversalContext,
    ) {
        ctx.summary.description_files += 1;

        let mut bank = match self.parser.parse(document, input_dir, output_root).await {
            Ok(bank) => bank,
            Err(e) => {
                ctx.summary.parse_failures += 1;
                warn!(document = %document.display(), error = %e, "Skipping bank description");
                return;
            }
        };
        ctx.summary.banks_parsed += 1;

        if let Err(e) = self.provision_bank_dirs(&bank, output_root, ctx).await {
            ctx.summary.banks_skipped += 1;
            warn!(document = %document.display(), bank = %bank.name, error = %e, "Skipping bank");
            return;
        }

        let decoder = self.decoder.as_ref();
        let batch = bank.batch_convert(decoder, self.options.workers).await;
        ctx.summary.assets_converted += batch.converted;
        ctx.summary.assets_failed += batch.failed;
        if !batch.all_succeeded {
            debug!(
                bank = %bank.name,
                missing = batch.missing_assets.len(),
                failed = batch.failed,
                "Bank converted with failures"
            );
        }
        ctx.record_missing(batch.missing_assets);
        ctx.merge_events(&bank.events);

        let rows = reports::collect_manifest_rows(&mut bank, decoder).await;
        let bank_dir = bank.output_dir(output_root);
        match reports::write_bank_manifest(&bank_dir, &bank.name, &rows).await {
            Ok(Some(path)) => debug!(path = %path.display(), "Wrote bank manifest"),
            Ok(None) => debug!(bank = %bank.name, "Bank has no assets, no manifest"),
            Err(e) => warn!(bank = %bank.name, error = %e, "Failed to write bank manifest"),
        }
    }

    /// Language and bank directories for the bank and for any streamed
    /// asset tagged with a different language.
    async fn provision_bank_dirs(
        &self,
        bank: &Bank,
        output_root: &Path,
        ctx: &mut TraversalContext,
    ) -> Result<(), ConvertError> {
        let mut languages = BTreeSet::new();
        languages.insert(bank.language.as_str());
        languages.extend(bank.streamed_files.iter().map(|f| f.language()));

        for language in languages {
            let language_dir = output_root.join(language);
            ctx.ensure_language_dir(output_root, language)
                .await
                .map_err(|e| ConvertError::Directory(language_dir.clone(), e))?;

            let bank_dir = language_dir.join(&bank.name);
            ensure_dir(&bank_dir)
                .await
                .map_err(|e| ConvertError::Directory(bank_dir, e))?;
        }
        Ok(())
    }

    async fn write_global_reports(&self, output_root: &Path, ctx: &mut TraversalContext) {
        match reports::write_missing_report(output_root, ctx.missing_assets()).await {
            Ok(Some(path)) => {
                ctx.summary.missing_report_rows = ctx.missing_assets().len();
                info!(path = %path.display(), rows = ctx.summary.missing_report_rows, "Wrote missing-asset report");
            }
            Ok(None) => debug!("No missing assets"),
            Err(e) => warn!(error = %e, "Failed to write missing-asset report"),
        }

        let event_rows = reports::event_rows(ctx.events_by_id()).len();
        match reports::write_event_index(output_root, ctx.events_by_id()).await {
            Ok(Some(path)) => {
                ctx.summary.event_index_rows = event_rows;
                info!(path = %path.display(), rows = event_rows, "Wrote event index");
            }
            Ok(None) => debug!("No events"),
            Err(e) => warn!(error = %e, "Failed to write event index"),
        }
    }
}

/// Entries of `dir` in lexicographic order
async fn read_sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}
