//! Audio asset references and per-asset conversion

use super::memo::Memo;
use crate::decoder::AudioDecoder;
use crate::error::ModelError;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Language tag used when a document omits one
pub const DEFAULT_LANGUAGE: &str = "SFX";

/// Default raw asset extension
pub const DEFAULT_SOURCE_EXTENSION: &str = "wem";

/// How the bank references an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadType {
    /// Standalone file on disk, eligible for decoding
    Streamed,
    /// Embedded in the bank container, reported only
    Resident,
}

impl LoadType {
    /// Name of the document section this load type comes from
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadType::Streamed => "ReferencedStreamedFiles",
            LoadType::Resident => "IncludedMemoryFiles",
        }
    }
}

impl fmt::Display for LoadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of converting one asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertOutcome {
    Success,
    /// Source asset absent on disk. Expected, not an error.
    MissingSource,
    OtherFailure,
}

/// One audio asset referenced by a bank
#[derive(Debug, Clone)]
pub struct AudioFile {
    id: String,
    display_name: String,
    load_type: LoadType,
    owner_bank_name: String,
    language: String,
    input_dir: PathBuf,
    output_dir: PathBuf,
    source_extension: String,
    duration: Memo<Option<u64>>,
    missing: Memo<bool>,
}

impl AudioFile {
    /// Create an asset reference.
    ///
    /// `output_dir` is the output root; the decoded file lands in
    /// `output_dir/language/owner_bank_name/display_name`. A blank
    /// `language` falls back to [`DEFAULT_LANGUAGE`].
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        language: impl Into<String>,
        load_type: LoadType,
        owner_bank_name: impl Into<String>,
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, ModelError> {
        let id = id.into();
        let display_name = display_name.into();
        if id.trim().is_empty() {
            return Err(ModelError::MissingField { entity: "AudioFile", field: "id" });
        }
        if display_name.trim().is_empty() {
            return Err(ModelError::MissingField {
                entity: "AudioFile",
                field: "display name",
            });
        }

        let mut language = language.into();
        if language.trim().is_empty() {
            language = DEFAULT_LANGUAGE.to_string();
        }

        Ok(Self {
            id,
            display_name,
            load_type,
            owner_bank_name: owner_bank_name.into(),
            language,
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            duration: Memo::Unset,
            missing: Memo::Unset,
        })
    }

    /// Use `extension` (without dot) for the source asset file name
    pub fn with_source_extension(mut self, extension: impl Into<String>) -> Self {
        self.source_extension = extension.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn load_type(&self) -> LoadType {
        self.load_type
    }

    pub fn owner_bank_name(&self) -> &str {
        &self.owner_bank_name
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn is_streamed(&self) -> bool {
        self.load_type == LoadType::Streamed
    }

    /// Source asset file name: `<id>.<ext>`
    pub fn source_file_name(&self) -> String {
        format!("{}.{}", self.id, self.source_extension)
    }

    pub fn source_path(&self) -> PathBuf {
        self.input_dir.join(self.source_file_name())
    }

    /// `output_dir/language/owner_bank_name/display_name`
    pub fn output_path(&self) -> PathBuf {
        self.output_dir
            .join(&self.language)
            .join(&self.owner_bank_name)
            .join(&self.display_name)
    }

    /// Cached duration: `None` until probed, `Some(None)` if the probe failed
    pub fn cached_duration(&self) -> Option<Option<u64>> {
        self.duration.get().copied()
    }

    /// Cached missing flag: `None` until probed or converted
    pub fn cached_missing(&self) -> Option<bool> {
        self.missing.get().copied()
    }

    /// Record a duration. Ignored (returns `false`) once a value is cached.
    pub fn set_duration(&mut self, seconds: Option<u64>) -> bool {
        let accepted = self.duration.set(seconds);
        if !accepted {
            debug!(asset = %self.source_file_name(), "Duration already cached");
        }
        accepted
    }

    /// Record the missing flag. Ignored (returns `false`) once cached.
    pub fn set_missing(&mut self, missing: bool) -> bool {
        let accepted = self.missing.set(missing);
        if !accepted {
            debug!(asset = %self.source_file_name(), "Missing flag already cached");
        }
        accepted
    }

    /// Duration in whole seconds, inspecting the source at most once.
    ///
    /// Resident assets are never inspected and return `None`. A failed
    /// inspection is cached as unknown, and so is the duration of a source
    /// already known to be missing.
    pub async fn duration_seconds(&mut self, decoder: &dyn AudioDecoder) -> Option<u64> {
        if !self.is_streamed() {
            return None;
        }
        if let Some(cached) = self.duration.get() {
            return *cached;
        }
        if self.cached_missing() == Some(true) {
            self.duration.set(None);
            return None;
        }

        let source = self.source_path();
        let seconds = match decoder.duration_seconds(&source).await {
            Ok(seconds) => Some(seconds),
            Err(e) => {
                warn!(source = %source.display(), error = %e, "Failed to read audio duration");
                None
            }
        };
        self.duration.set(seconds);
        seconds
    }

    /// Whether the source asset is absent, probing the filesystem at most once.
    ///
    /// Resident assets are never probed and return `None`.
    pub async fn is_missing(&mut self, decoder: &dyn AudioDecoder) -> Option<bool> {
        if !self.is_streamed() {
            return None;
        }
        Some(self.probe_missing(decoder).await)
    }

    async fn probe_missing(&mut self, decoder: &dyn AudioDecoder) -> bool {
        if let Some(missing) = self.missing.get() {
            return *missing;
        }
        let missing = !decoder.probe_exists(&self.source_path()).await;
        self.missing.set(missing);
        missing
    }

    /// Decode the source asset into [`AudioFile::output_path`].
    ///
    /// Never fails: a missing source and a decoder failure are reported
    /// through the returned outcome.
    pub async fn convert(&mut self, decoder: &dyn AudioDecoder) -> ConvertOutcome {
        let source = self.source_path();
        let output = self.output_path();

        if self.probe_missing(decoder).await {
            info!(
                output = %output.display(),
                source = %source.display(),
                "Source asset missing, skipping"
            );
            return ConvertOutcome::MissingSource;
        }

        match decoder.convert(&source, &output).await {
            Ok(()) => {
                debug!(output = %output.display(), "Converted");
                ConvertOutcome::Success
            }
            Err(e) => {
                warn!(output = %output.display(), error = %e, "Conversion failed");
                ConvertOutcome::OtherFailure
            }
        }
    }
}

impl fmt::Display for AudioFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}, bank {})",
            self.source_file_name(),
            self.display_name,
            self.language,
            self.owner_bank_name
        )
    }
}
