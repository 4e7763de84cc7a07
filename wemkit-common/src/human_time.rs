//! Human-readable time formatting
//!
//! Two fixed formats are used by the tools:
//! - Elapsed run time: `HHh MMm SSs`
//! - Audio clip length: `M:SS`

use std::time::Duration;

/// Format an elapsed wall-clock duration as `HHh MMm SSs`.
///
/// Hours are not wrapped into days; fractional seconds are truncated.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use wemkit_common::human_time::format_elapsed;
///
/// assert_eq!(format_elapsed(Duration::from_secs(0)), "00h 00m 00s");
/// assert_eq!(format_elapsed(Duration::from_secs(3725)), "01h 02m 05s");
/// ```
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Format a clip length in whole seconds as `M:SS`.
///
/// # Examples
///
/// ```
/// use wemkit_common::human_time::format_clip_length;
///
/// assert_eq!(format_clip_length(5), "0:05");
/// assert_eq!(format_clip_length(754), "12:34");
/// ```
pub fn format_clip_length(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
