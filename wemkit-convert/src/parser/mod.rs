//! Bank-description parser
//!
//! Reads one `SoundbanksInfo` document and builds one [`Bank`]:
//!
//! ```text
//! SoundBanksInfo
//! └── SoundBanks
//!     └── SoundBank  Id, Language
//!         ├── ShortName
//!         ├── IncludedEvents/Event           Id, Name
//!         ├── ReferencedStreamedFiles/File   Id, Language, ShortName
//!         └── IncludedMemoryFiles/File       Id, Language, ShortName
//! ```
//!
//! Each document describes exactly one bank. A bad event or file entry is
//! logged and skipped; a missing bank structure fails the whole document.

pub mod xml_tree;

use crate::error::ParseError;
use crate::model::{AudioFile, Bank, Event, LoadType, DEFAULT_LANGUAGE};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use xml_tree::{parse_tree, TreeError, XmlElement};

/// Parses bank-description documents into [`Bank`]s
#[derive(Debug, Clone)]
pub struct BankParser {
    source_extension: String,
}

impl Default for BankParser {
    fn default() -> Self {
        Self::new(crate::model::audio_file::DEFAULT_SOURCE_EXTENSION)
    }
}

impl BankParser {
    /// `source_extension` names the raw asset files (`<id>.<ext>`)
    pub fn new(source_extension: impl Into<String>) -> Self {
        Self {
            source_extension: source_extension.into(),
        }
    }

    /// Read and parse `document_path`.
    ///
    /// `input_dir` is where the bank's streamed assets live; `output_dir`
    /// is the output root.
    pub async fn parse(
        &self,
        document_path: &Path,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<Bank, ParseError> {
        let content = tokio::fs::read_to_string(document_path)
            .await
            .map_err(|e| ParseError::Io(document_path.to_path_buf(), e))?;
        self.parse_str(&content, document_path, input_dir, output_dir)
    }

    /// Parse an in-memory document. `document_path` is only used in errors.
    pub fn parse_str(
        &self,
        content: &str,
        document_path: &Path,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<Bank, ParseError> {
        let malformed = |reason: &str| ParseError::MalformedDocument(document_path.to_path_buf(), reason.to_string());

        let root = parse_tree(content).map_err(|e| match e {
            TreeError::Xml(e) => ParseError::Xml(document_path.to_path_buf(), e),
            TreeError::Structure(reason) => malformed(&reason),
        })?;

        if root.name != "SoundBanksInfo" {
            return Err(malformed(&format!("unexpected root element <{}>", root.name)));
        }
        let bank_element = root
            .child("SoundBanks")
            .and_then(|banks| banks.child("SoundBank"))
            .ok_or_else(|| malformed("missing SoundBanks/SoundBank"))?;

        self.build_bank(bank_element, document_path, input_dir, output_dir)
    }

    fn build_bank(
        &self,
        element: &XmlElement,
        document_path: &Path,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<Bank, ParseError> {
        let name = element.child_text("ShortName").ok_or_else(|| {
            ParseError::MalformedDocument(document_path.to_path_buf(), "bank has no ShortName".to_string())
        })?;
        let id = element
            .attr("Id")
            .or_else(|| element.attr("id"))
            .unwrap_or_default();
        let language = element
            .attr("Language")
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(DEFAULT_LANGUAGE);

        let events: Vec<Event> = element
            .child("IncludedEvents")
            .into_iter()
            .flat_map(|section| section.children_named("Event"))
            .filter_map(|e| self.build_event(e, name, document_path))
            .collect();

        let streamed_files =
            self.build_files(element, LoadType::Streamed, name, document_path, input_dir, output_dir);
        let memory_files =
            self.build_files(element, LoadType::Resident, name, document_path, input_dir, output_dir);

        debug!(
            document = %document_path.display(),
            bank = name,
            language,
            events = events.len(),
            streamed = streamed_files.len(),
            resident = memory_files.len(),
            "Parsed bank description"
        );

        Ok(Bank::new(id, name, language, events, streamed_files, memory_files))
    }

    fn build_event(&self, element: &XmlElement, bank_name: &str, document_path: &Path) -> Option<Event> {
        let id = element.attr("Id").unwrap_or_default();
        let name = element.attr("Name").unwrap_or_default();
        match Event::new(id, name, bank_name) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(document = %document_path.display(), id, error = %e, "Skipping event");
                None
            }
        }
    }

    fn build_files(
        &self,
        bank: &XmlElement,
        load_type: LoadType,
        bank_name: &str,
        document_path: &Path,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Vec<AudioFile> {
        bank.child(load_type.as_str())
            .into_iter()
            .flat_map(|section| section.children_named("File"))
            .filter_map(|file| {
                let id = file.attr("Id").unwrap_or_default();
                let display_name = file.child_text("ShortName").unwrap_or_default();
                let language = file.attr("Language").unwrap_or(DEFAULT_LANGUAGE);
                match AudioFile::new(
                    id,
                    display_name,
                    language,
                    load_type,
                    bank_name,
                    PathBuf::from(input_dir),
                    PathBuf::from(output_dir),
                ) {
                    Ok(audio) => Some(audio.with_source_extension(self.source_extension.as_str())),
                    Err(e) => {
                        warn!(
                            document = %document_path.display(),
                            id,
                            section = load_type.as_str(),
                            error = %e,
                            "Skipping file reference"
                        );
                        None
                    }
                }
            })
            .collect()
    }
}
