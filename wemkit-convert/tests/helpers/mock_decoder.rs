//! Recording decoder
//!
//! Stands in for vgmstream: conversions write a small placeholder file,
//! inspections answer from a fixed duration, and every call is counted.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use wemkit_convert::{AudioDecoder, DecodeError};

#[derive(Debug, Default)]
struct Calls {
    probes: Vec<PathBuf>,
    inspects: Vec<PathBuf>,
    converts: Vec<(PathBuf, PathBuf)>,
}

pub struct RecordingDecoder {
    duration_seconds: u64,
    /// Source file names whose conversion fails
    failing: HashSet<String>,
    /// Source file names whose inspection fails
    failing_inspect: HashSet<String>,
    calls: Mutex<Calls>,
}

impl Default for RecordingDecoder {
    fn default() -> Self {
        Self::new(30)
    }
}

impl RecordingDecoder {
    pub fn new(duration_seconds: u64) -> Self {
        Self {
            duration_seconds,
            failing: HashSet::new(),
            failing_inspect: HashSet::new(),
            calls: Mutex::new(Calls::default()),
        }
    }

    pub fn failing_convert(mut self, source_file_name: &str) -> Self {
        self.failing.insert(source_file_name.to_string());
        self
    }

    pub fn failing_inspect(mut self, source_file_name: &str) -> Self {
        self.failing_inspect.insert(source_file_name.to_string());
        self
    }

    pub fn probe_count(&self) -> usize {
        self.calls.lock().unwrap().probes.len()
    }

    pub fn inspect_count(&self) -> usize {
        self.calls.lock().unwrap().inspects.len()
    }

    pub fn convert_count(&self) -> usize {
        self.calls.lock().unwrap().converts.len()
    }

    /// Inspection calls per source path
    pub fn inspects_by_path(&self) -> HashMap<PathBuf, usize> {
        let mut counts = HashMap::new();
        for path in &self.calls.lock().unwrap().inspects {
            *counts.entry(path.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn converted_outputs(&self) -> Vec<PathBuf> {
        self.calls
            .lock()
            .unwrap()
            .converts
            .iter()
            .map(|(_, output)| output.clone())
            .collect()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[async_trait]
impl AudioDecoder for RecordingDecoder {
    fn name(&self) -> &str {
        "recording"
    }

    async fn probe_exists(&self, path: &Path) -> bool {
        self.calls.lock().unwrap().probes.push(path.to_path_buf());
        path.is_file()
    }

    async fn duration_seconds(&self, path: &Path) -> Result<u64, DecodeError> {
        self.calls.lock().unwrap().inspects.push(path.to_path_buf());
        if self.failing_inspect.contains(&file_name(path)) || !path.is_file() {
            return Err(DecodeError::DecodeFailed {
                code: Some(1),
                stderr: format!("failed opening {}", path.display()),
            });
        }
        Ok(self.duration_seconds)
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<(), DecodeError> {
        self.calls
            .lock()
            .unwrap()
            .converts
            .push((input.to_path_buf(), output.to_path_buf()));
        if self.failing.contains(&file_name(input)) {
            return Err(DecodeError::DecodeFailed {
                code: Some(1),
                stderr: "corrupt stream".to_string(),
            });
        }
        tokio::fs::write(output, b"RIFF")
            .await
            .map_err(DecodeError::Spawn)
    }
}
