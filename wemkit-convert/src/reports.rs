//! Spreadsheet reports
//!
//! Three CSV reports, each with a header row:
//! - `<bank>_mapping.csv` in every bank output directory
//! - `missing_wem.csv` at the output root
//! - `sound_bank_events.csv` at the output root
//!
//! A report with no rows is not written at all.

use crate::decoder::AudioDecoder;
use crate::error::ConvertError;
use crate::model::{AudioFile, Bank, Event};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use wemkit_common::human_time::format_clip_length;

pub const REPORT_EXTENSION: &str = "csv";
pub const MISSING_REPORT_NAME: &str = "missing_wem.csv";
pub const EVENTS_REPORT_NAME: &str = "sound_bank_events.csv";
const MANIFEST_SUFFIX: &str = "_mapping";

/// Placeholder for values that were never computed
pub const UNKNOWN: &str = "UNKNOWN";

/// One row of a bank manifest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestRow {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Language")]
    pub language: String,
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(rename = "LoadType")]
    pub load_type: String,
    #[serde(rename = "SoundBank")]
    pub sound_bank: String,
    #[serde(rename = "SourceMissing")]
    pub source_missing: String,
}

/// One row of the missing-asset report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingRow {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Language")]
    pub language: String,
    #[serde(rename = "SoundBank")]
    pub sound_bank: String,
    #[serde(rename = "InputDir")]
    pub input_dir: String,
}

impl From<&AudioFile> for MissingRow {
    fn from(file: &AudioFile) -> Self {
        Self {
            source: file.source_file_name(),
            name: file.display_name().to_string(),
            language: file.language().to_string(),
            sound_bank: file.owner_bank_name().to_string(),
            input_dir: file.input_dir().display().to_string(),
        }
    }
}

/// One (event, owning bank) pair of the event index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRow {
    #[serde(rename = "EventId")]
    pub event_id: String,
    #[serde(rename = "EventName")]
    pub event_name: String,
    #[serde(rename = "SoundBankName")]
    pub sound_bank_name: String,
}

/// Build manifest rows for every asset of `bank`, streamed first.
///
/// Reading duration and missing flag here computes them for streamed assets
/// that were not probed during conversion. Resident rows report both as
/// unknown.
pub async fn collect_manifest_rows(bank: &mut Bank, decoder: &dyn AudioDecoder) -> Vec<ManifestRow> {
    let mut rows = Vec::with_capacity(bank.file_count());
    for file in bank.all_files_mut() {
        let duration = file
            .duration_seconds(decoder)
            .await
            .map(format_clip_length)
            .unwrap_or_else(|| UNKNOWN.to_string());
        let source_missing = file
            .is_missing(decoder)
            .await
            .map(|m| m.to_string())
            .unwrap_or_else(|| UNKNOWN.to_string());

        rows.push(ManifestRow {
            source: file.source_file_name(),
            name: file.display_name().to_string(),
            language: file.language().to_string(),
            duration,
            load_type: file.load_type().to_string(),
            sound_bank: file.owner_bank_name().to_string(),
            source_missing,
        });
    }
    rows
}

/// Expand each event's bank-name set into one row per owning bank
pub fn event_rows(events_by_id: &BTreeMap<String, Event>) -> Vec<EventRow> {
    events_by_id
        .values()
        .flat_map(|event| {
            event.bank_names().iter().map(move |bank| EventRow {
                event_id: event.id().to_string(),
                event_name: event.name().to_string(),
                sound_bank_name: bank.clone(),
            })
        })
        .collect()
}

/// Serialize `rows` with a header row into `path`.
///
/// Returns `Ok(None)` without touching the filesystem when `rows` is empty.
pub async fn write_sheet<R: Serialize>(path: &Path, rows: &[R]) -> Result<Option<PathBuf>, ConvertError> {
    if rows.is_empty() {
        return Ok(None);
    }

    let report_err = |e: csv::Error| ConvertError::Report(path.to_path_buf(), e);

    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).map_err(report_err)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| report_err(csv::Error::from(e.into_error())))?;

    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| report_err(csv::Error::from(e)))?;

    debug!(path = %path.display(), rows = rows.len(), "Wrote report");
    Ok(Some(path.to_path_buf()))
}

/// `<bank_dir>/<bank_name>_mapping.csv`
pub fn manifest_path(bank_dir: &Path, bank_name: &str) -> PathBuf {
    bank_dir.join(format!("{bank_name}{MANIFEST_SUFFIX}.{REPORT_EXTENSION}"))
}

pub async fn write_bank_manifest(
    bank_dir: &Path,
    bank_name: &str,
    rows: &[ManifestRow],
) -> Result<Option<PathBuf>, ConvertError> {
    write_sheet(&manifest_path(bank_dir, bank_name), rows).await
}

pub async fn write_missing_report(
    output_root: &Path,
    missing_assets: &[AudioFile],
) -> Result<Option<PathBuf>, ConvertError> {
    let rows: Vec<MissingRow> = missing_assets.iter().map(MissingRow::from).collect();
    write_sheet(&output_root.join(MISSING_REPORT_NAME), &rows).await
}

pub async fn write_event_index(
    output_root: &Path,
    events_by_id: &BTreeMap<String, Event>,
) -> Result<Option<PathBuf>, ConvertError> {
    write_sheet(&output_root.join(EVENTS_REPORT_NAME), &event_rows(events_by_id)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LoadType;
    use tempfile::TempDir;

    fn missing_file(id: &str) -> AudioFile {
        AudioFile::new(id, "Line.wav", "", LoadType::Streamed, "Leader_Gandhi", "/in/vo", "/out").unwrap()
    }

    #[test]
    fn test_event_rows_expand_bank_names() {
        let mut play = Event::new("100", "Play_Theme", "Music_B").unwrap();
        play.merge(&Event::new("100", "Play_Theme", "Music_A").unwrap());
        let stop = Event::new("200", "Stop_Theme", "Music_A").unwrap();

        let mut events = BTreeMap::new();
        events.insert(play.id().to_string(), play);
        events.insert(stop.id().to_string(), stop);

        let banks: Vec<(String, String)> = event_rows(&events)
            .into_iter()
            .map(|r| (r.event_id, r.sound_bank_name))
            .collect();
        assert_eq!(
            banks,
            vec![
                ("100".to_string(), "Music_A".to_string()),
                ("100".to_string(), "Music_B".to_string()),
                ("200".to_string(), "Music_A".to_string()),
            ]
        );
    }

    #[test]
    fn test_manifest_path() {
        assert_eq!(
            manifest_path(Path::new("/out/SFX/Init"), "Init"),
            PathBuf::from("/out/SFX/Init/Init_mapping.csv")
        );
    }

    #[tokio::test]
    async fn test_empty_reports_are_not_written() {
        let temp = TempDir::new().unwrap();
        assert!(write_missing_report(temp.path(), &[]).await.unwrap().is_none());
        assert!(write_event_index(temp.path(), &BTreeMap::new()).await.unwrap().is_none());
        assert!(!temp.path().join(MISSING_REPORT_NAME).exists());
        assert!(!temp.path().join(EVENTS_REPORT_NAME).exists());
    }

    #[tokio::test]
    async fn test_missing_report_contents() {
        let temp = TempDir::new().unwrap();
        let written = write_missing_report(temp.path(), &[missing_file("42")])
            .await
            .unwrap()
            .unwrap();

        let content = std::fs::read_to_string(written).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Source,Name,Language,SoundBank,InputDir");
        assert_eq!(lines[1], "42.wem,Line.wav,SFX,Leader_Gandhi,/in/vo");
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn test_unwritable_report_is_error() {
        let temp = TempDir::new().unwrap();
        let missing_dir = temp.path().join("does/not/exist");
        let err = write_missing_report(&missing_dir, &[missing_file("1")]).await.unwrap_err();
        assert!(matches!(err, ConvertError::Report(..)));
    }
}
