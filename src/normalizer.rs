//! Whitespace canonicalization and counting for extracted plain text.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// No-break spaces that render as ordinary spaces.
const NO_BREAK_SPACES: [char; 3] = ['\u{00A0}', '\u{2007}', '\u{202F}'];

/// Invisible code points that contribute nothing to length.
const ZERO_WIDTH: [char; 4] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

static CJK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Han}\p{Hiragana}\p{Katakana}]").expect("CJK_RE: hardcoded regex is valid")
});

/// Which quantity a caller should show as the length of a text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CountMetric {
    Words,
    Characters,
}

/// Canonicalizes plain text for counting.
///
/// In order: no-break spaces become spaces, zero-width characters and BOMs
/// are removed, whitespace runs collapse to a single space, and the result
/// is trimmed. Normalizing twice gives the same result as normalizing once.
///
/// # Examples
/// ```
/// use studybuddy_text::normalizer::normalize_text;
///
/// assert_eq!(normalize_text("a\u{00A0}\u{00A0}b\u{200B} c"), "a b c");
/// assert_eq!(normalize_text("\n\t  "), "");
/// ```
pub fn normalize_text(text: &str) -> String {
    let visible: String = text
        .chars()
        .filter(|c| !ZERO_WIDTH.contains(c))
        .map(|c| if NO_BREAK_SPACES.contains(&c) { ' ' } else { c })
        .collect();

    visible.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Length of `text` in Unicode scalar values.
///
/// This is the quantity compared against character limits, so an astral
/// character such as an emoji counts once.
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Counts whitespace-separated words. Returns 0 for empty or blank text.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Returns true if `text` contains any Han, Hiragana or Katakana character.
///
/// Word counts are meaningless for such text; this is advisory and changes
/// nothing by itself.
pub fn contains_cjk(text: &str) -> bool {
    CJK_RE.is_match(text)
}

/// Picks the metric to show for `text`: characters for CJK, words otherwise.
pub fn suggested_metric(text: &str) -> CountMetric {
    if contains_cjk(text) {
        CountMetric::Characters
    } else {
        CountMetric::Words
    }
}
