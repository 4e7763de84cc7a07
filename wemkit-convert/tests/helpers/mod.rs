//! Test Helper Utilities
//!
//! Shared utilities for testing wemkit-convert

pub mod fixtures;
pub mod mock_decoder;

pub use fixtures::{write_bank_xml, write_source, BankFixture, FileFixture};
pub use mock_decoder::RecordingDecoder;
