//! Domain model: banks, events and the audio assets they reference

pub mod audio_file;
pub mod bank;
pub mod event;
pub mod memo;

pub use audio_file::{AudioFile, ConvertOutcome, LoadType, DEFAULT_LANGUAGE};
pub use bank::{Bank, BatchOutcome};
pub use event::Event;
pub use memo::Memo;
