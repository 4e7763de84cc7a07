//! Traversal-scoped aggregation state
//!
//! One [`TraversalContext`] lives for exactly one [`Converter::run`](super::Converter::run)
//! and is passed by `&mut` through the recursive walk. Nothing here is
//! process-global, so concurrent runs never share state.

use super::statistics::TraversalSummary;
use crate::model::{AudioFile, Event};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;
use wemkit_common::fs::{ensure_dir, path_exists};

#[derive(Debug, Default)]
pub struct TraversalContext {
    language_dir_created: HashMap<String, bool>,
    missing_assets: Vec<AudioFile>,
    events_by_id: BTreeMap<String, Event>,
    pub summary: TraversalSummary,
}

impl TraversalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `output_root/language` the first time `language` is seen.
    ///
    /// Later calls for the same language do not touch the filesystem. A
    /// directory left by an earlier run is reused as-is. A failed creation
    /// is not remembered, so the next bank retries it.
    pub async fn ensure_language_dir(&mut self, output_root: &Path, language: &str) -> std::io::Result<()> {
        if self.is_language_provisioned(language) {
            return Ok(());
        }

        let dir = output_root.join(language);
        if path_exists(&dir).await {
            debug!(path = %dir.display(), "Language directory already present");
        } else {
            ensure_dir(&dir).await?;
            debug!(path = %dir.display(), "Provisioned language directory");
        }
        self.language_dir_created.insert(language.to_string(), true);
        self.summary.language_dirs_provisioned += 1;
        Ok(())
    }

    pub fn is_language_provisioned(&self, language: &str) -> bool {
        self.language_dir_created.get(language).copied().unwrap_or(false)
    }

    pub fn record_missing(&mut self, assets: impl IntoIterator<Item = AudioFile>) {
        let before = self.missing_assets.len();
        self.missing_assets.extend(assets);
        self.summary.assets_missing += self.missing_assets.len() - before;
    }

    /// Insert new events; union owning banks into events already known by id
    pub fn merge_events<'a>(&mut self, events: impl IntoIterator<Item = &'a Event>) {
        for event in events {
            match self.events_by_id.get_mut(event.id()) {
                Some(known) => {
                    known.merge(event);
                }
                None => {
                    self.events_by_id.insert(event.id().to_string(), event.clone());
                }
            }
        }
    }

    pub fn missing_assets(&self) -> &[AudioFile] {
        &self.missing_assets
    }

    pub fn events_by_id(&self) -> &BTreeMap<String, Event> {
        &self.events_by_id
    }
}
