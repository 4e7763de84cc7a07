//! Error types for wemkit-convert
//!
//! Every error here is recoverable at some boundary of the traversal:
//! - [`ParseError`]: the description file is skipped
//! - [`DecodeError`]: the asset is recorded as a failed conversion
//! - [`ConvertError::Directory`]: the subtree (or bank) is skipped
//!
//! Only a failure to read the top-level input directory aborts a run.

use std::path::PathBuf;
use thiserror::Error;

/// Bank-description parsing errors
#[derive(Debug, Error)]
pub enum ParseError {
    /// Document could not be read
    #[error("Failed to read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    /// Document is not well-formed XML
    #[error("Invalid XML in {0}: {1}")]
    Xml(PathBuf, #[source] quick_xml::Error),

    /// Well-formed, but the expected bank-description structure is absent
    #[error("Malformed bank description {0}: {1}")]
    MalformedDocument(PathBuf, String),
}

/// Domain entity construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A required field was missing or blank
    #[error("{entity} requires a non-empty {field}")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },
}

/// External decoder errors
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Decoder executable could not be found
    #[error("Decoder '{0}' not found")]
    ToolNotFound(String),

    /// Decoder process could not be started
    #[error("Failed to run decoder: {0}")]
    Spawn(#[source] std::io::Error),

    /// Decoder exited unsuccessfully
    #[error("Decoder failed (exit code {code:?}): {stderr}")]
    DecodeFailed { code: Option<i32>, stderr: String },

    /// Decoder succeeded but its stream info could not be interpreted
    #[error("Unparsable decoder output: {0}")]
    InvalidInfo(String),
}

/// Traversal-level errors
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Directory could not be read or created
    #[error("Directory error at {0}: {1}")]
    Directory(PathBuf, #[source] std::io::Error),

    /// Report file could not be written
    #[error("Failed to write report {0}: {1}")]
    Report(PathBuf, #[source] csv::Error),
}
