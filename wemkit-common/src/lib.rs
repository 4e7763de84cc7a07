//! # wemkit Common Library
//!
//! Shared code for the wemkit tools:
//! - Error type used across crates
//! - TOML configuration loading and resolution
//! - Tracing subscriber initialization
//! - Path / filesystem helpers (existence checks, extension classification)
//! - Elapsed-time and clip-length formatting

pub mod config;
pub mod error;
pub mod fs;
pub mod human_time;
pub mod logging;

pub use error::{Error, Result};
