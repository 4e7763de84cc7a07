//! Traversal statistics
//!
//! Counters accumulated during one run, returned by
//! [`Converter::run`](super::Converter::run) and logged as the final summary.

use serde::Serialize;
use std::time::Duration;
use wemkit_common::human_time::format_elapsed;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TraversalSummary {
    /// Directories whose entries were read (root included)
    pub directories_visited: usize,
    /// Directories that could not be read and were skipped
    pub directory_failures: usize,
    /// Description documents found
    pub description_files: usize,
    pub banks_parsed: usize,
    pub parse_failures: usize,
    /// Banks parsed but not converted because their output directory could not be created
    pub banks_skipped: usize,
    pub assets_converted: usize,
    pub assets_missing: usize,
    /// Conversions failed for a reason other than a missing source
    pub assets_failed: usize,
    pub language_dirs_provisioned: usize,
    pub missing_report_rows: usize,
    pub event_index_rows: usize,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl TraversalSummary {
    /// True when no bank, asset or directory failed
    pub fn is_clean(&self) -> bool {
        self.directory_failures == 0
            && self.parse_failures == 0
            && self.banks_skipped == 0
            && self.assets_failed == 0
            && self.assets_missing == 0
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} banks from {} descriptions ({} failed to parse), {} converted, {} missing, {} failed in {}",
            self.banks_parsed,
            self.description_files,
            self.parse_failures,
            self.assets_converted,
            self.assets_missing,
            self.assets_failed,
            format_elapsed(self.elapsed)
        )
    }
}
