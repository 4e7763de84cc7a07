//! wemkit-convert library interface
//!
//! Converts a game's Wwise audio asset tree into per-language, per-bank
//! directories of decoded audio plus CSV manifests. The binary is a thin
//! wrapper around [`Converter::run`]; integration tests drive the same
//! entry point with a fake [`AudioDecoder`].

pub mod decoder;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod reports;

pub use decoder::{AudioDecoder, VgmstreamDecoder};
pub use engine::{Converter, ConverterOptions, TraversalSummary};
pub use error::{ConvertError, DecodeError, ModelError, ParseError};
pub use parser::BankParser;
