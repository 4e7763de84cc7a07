//! Sound banks

use super::audio_file::{AudioFile, ConvertOutcome};
use super::event::Event;
use crate::decoder::AudioDecoder;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};

/// Result of converting every streamed asset of a bank
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// True iff every streamed asset converted successfully
    pub all_succeeded: bool,
    /// Assets whose source file was absent
    pub missing_assets: Vec<AudioFile>,
    pub converted: usize,
    /// Conversions that failed for a reason other than a missing source
    pub failed: usize,
}

/// One bank description: its events and the assets it references
#[derive(Debug, Clone)]
pub struct Bank {
    pub id: String,
    pub name: String,
    pub language: String,
    pub events: Vec<Event>,
    pub streamed_files: Vec<AudioFile>,
    pub memory_files: Vec<AudioFile>,
}

impl Bank {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        language: impl Into<String>,
        events: Vec<Event>,
        streamed_files: Vec<AudioFile>,
        memory_files: Vec<AudioFile>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            language: language.into(),
            events,
            streamed_files,
            memory_files,
        }
    }

    /// `output_root/language/name`
    pub fn output_dir(&self, output_root: &Path) -> PathBuf {
        output_root.join(&self.language).join(&self.name)
    }

    /// Streamed then resident assets, the order used by the manifest
    pub fn all_files_mut(&mut self) -> impl Iterator<Item = &mut AudioFile> {
        self.streamed_files
            .iter_mut()
            .chain(self.memory_files.iter_mut())
    }

    pub fn file_count(&self) -> usize {
        self.streamed_files.len() + self.memory_files.len()
    }

    /// Convert every streamed asset; resident assets are never decoded.
    ///
    /// All assets are attempted even after failures. Up to `workers`
    /// decoder processes run at once; outcomes keep asset order.
    pub async fn batch_convert(&mut self, decoder: &dyn AudioDecoder, workers: usize) -> BatchOutcome {
        let conversions: Vec<_> = self
            .streamed_files
            .iter_mut()
            .map(|file| file.convert(decoder))
            .collect();
        let outcomes: Vec<ConvertOutcome> = stream::iter(conversions)
            .buffered(workers.max(1))
            .collect()
            .await;

        let mut batch = BatchOutcome {
            all_succeeded: true,
            ..Default::default()
        };
        for (file, outcome) in self.streamed_files.iter().zip(outcomes) {
            match outcome {
                ConvertOutcome::Success => batch.converted += 1,
                ConvertOutcome::MissingSource => {
                    batch.all_succeeded = false;
                    batch.missing_assets.push(file.clone());
                }
                ConvertOutcome::OtherFailure => {
                    batch.all_succeeded = false;
                    batch.failed += 1;
                }
            }
        }
        batch
    }
}
