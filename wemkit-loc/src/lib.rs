//! wemkit-loc library interface
//!
//! Rewrites `LOC_*` placeholder text in a Civilization VI gameplay database
//! copy using a companion localization database. See [`rewrite`].

pub mod db;
pub mod error;
pub mod rewrite;
pub mod text;

pub use error::{Result, RewriteError};
pub use rewrite::{translate_to_language, RewriteOptions, RewriteReport};
