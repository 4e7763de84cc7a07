//! Translated-text normalization

use regex::Regex;
use std::sync::LazyLock;

/// `{1_Amount}` style placeholders, optionally prefixed by `+`
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\+?\{[^}]*\}").unwrap());

/// `[ICON_Gold]` / `[NEWLINE]` style markup
static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.*?\]").unwrap());

/// Strip placeholders and markup, then trim.
///
/// Used to compare a translation with values already stored in a column.
///
/// ```
/// use wemkit_loc::text::clean_text;
///
/// assert_eq!(clean_text("+{1_Amount} [ICON_Gold] Gold"), "Gold");
/// ```
pub fn clean_text(text: &str) -> String {
    let without_placeholders = PLACEHOLDER.replace_all(text, "");
    MARKUP.replace_all(&without_placeholders, "").trim().to_string()
}
