//! External audio decoder adapter
//!
//! The decoder is an external command-line tool (vgmstream by default):
//! - `<tool> -I <in>` prints stream info as JSON (`numberOfSamples`, `sampleRate`)
//! - `<tool> -o <out> <in>` writes a decoded WAV
//!
//! Exit code 0 means success. Calls block until the process exits; there
//! is no internal timeout.
//!
//! [`AudioDecoder`] is the seam the traversal engine depends on, so tests
//! can substitute a recording fake for the real tool.

use crate::error::DecodeError;
use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Operations the traversal needs from a decoder
#[async_trait]
pub trait AudioDecoder: Send + Sync {
    /// Decoder name for logging
    fn name(&self) -> &str;

    /// Whether `path` is an existing regular file. Never fails.
    async fn probe_exists(&self, path: &Path) -> bool {
        wemkit_common::fs::is_file(path).await
    }

    /// Stream length in whole seconds (`floor(samples / sample_rate)`)
    async fn duration_seconds(&self, path: &Path) -> Result<u64, DecodeError>;

    /// Decode `input` into `output`
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), DecodeError>;
}

/// Stream info printed by the decoder's inspect mode
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamInfo {
    pub number_of_samples: u64,
    pub sample_rate: u64,
}

impl StreamInfo {
    pub fn duration_seconds(&self) -> Result<u64, DecodeError> {
        if self.sample_rate == 0 {
            return Err(DecodeError::InvalidInfo("sampleRate is 0".to_string()));
        }
        Ok(self.number_of_samples / self.sample_rate)
    }
}

/// Parse inspect-mode stdout.
///
/// Accepts bare JSON, or JSON surrounded by other console text.
pub fn parse_stream_info(stdout: &str) -> Result<StreamInfo, DecodeError> {
    if let Ok(info) = serde_json::from_str::<StreamInfo>(stdout.trim()) {
        return Ok(info);
    }

    let start = stdout.find('{');
    let end = stdout.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str::<StreamInfo>(&stdout[start..=end])
                .map_err(|e| DecodeError::InvalidInfo(e.to_string()))
        }
        _ => Err(DecodeError::InvalidInfo("no JSON object in output".to_string())),
    }
}

/// vgmstream-cli backed decoder
#[derive(Debug, Clone)]
pub struct VgmstreamDecoder {
    command: String,
}

impl VgmstreamDecoder {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    async fn run(&self, args: &[&OsStr]) -> Result<Output, DecodeError> {
        let output = Command::new(&self.command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DecodeError::ToolNotFound(self.command.clone())
                } else {
                    DecodeError::Spawn(e)
                }
            })?;

        if !output.status.success() {
            return Err(DecodeError::DecodeFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

#[async_trait]
impl AudioDecoder for VgmstreamDecoder {
    fn name(&self) -> &str {
        &self.command
    }

    async fn duration_seconds(&self, path: &Path) -> Result<u64, DecodeError> {
        let output = self.run(&[OsStr::new("-I"), path.as_os_str()]).await?;
        let info = parse_stream_info(&String::from_utf8_lossy(&output.stdout))?;
        let seconds = info.duration_seconds()?;
        debug!(
            path = %path.display(),
            samples = info.number_of_samples,
            sample_rate = info.sample_rate,
            seconds,
            "Stream info"
        );
        Ok(seconds)
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<(), DecodeError> {
        self.run(&[OsStr::new("-o"), output.as_os_str(), input.as_os_str()])
            .await
            .map(|_| ())
    }
}
