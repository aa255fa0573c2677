//! Character-limit checks.

use crate::models::{NormalizationResult, ValidationResult};

/// Checks a normalization result against `max_chars`.
///
/// Total over every limit: a zero limit only accepts blank text.
///
/// # Examples
/// ```
/// use studybuddy_text::models::NormalizationResult;
/// use studybuddy_text::validator::validate;
///
/// let normalized = NormalizationResult::new("<p>hello world</p>".into(), "hello world".into());
/// let result = validate(normalized, 5);
/// assert!(!result.is_valid);
/// assert_eq!(result.over_by, 6);
/// ```
pub fn validate(normalized: NormalizationResult, max_chars: usize) -> ValidationResult {
    let length = normalized.length;
    ValidationResult {
        normalized,
        max_chars,
        is_valid: length <= max_chars,
        over_by: length.saturating_sub(max_chars),
    }
}

/// Converts a signed limit from an untyped source, treating negatives as 0.
pub fn clamp_max_chars(value: i64) -> usize {
    usize::try_from(value.max(0)).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(text: &str) -> NormalizationResult {
        NormalizationResult::new(text.to_string(), text.to_string())
    }

    #[test]
    fn test_over_limit() {
        let result = validate(normalized("hello world"), 5);
        assert!(!result.is_valid);
        assert_eq!(result.over_by, 6);
    }

    #[test]
    fn test_exactly_at_limit() {
        let result = validate(normalized("hello"), 5);
        assert!(result.is_valid);
        assert_eq!(result.over_by, 0);
    }

    #[test]
    fn test_under_limit() {
        let result = validate(normalized("hi"), 500);
        assert!(result.is_valid);
        assert_eq!(result.over_by, 0);
        assert_eq!(result.remaining(), 498);
    }

    #[test]
    fn test_zero_limit() {
        assert!(validate(normalized(""), 0).is_valid);

        let result = validate(normalized("x"), 0);
        assert!(!result.is_valid);
        assert_eq!(result.over_by, 1);
    }

    #[test]
    fn test_invariants_hold() {
        for (text, max) in [("", 3), ("abc", 3), ("abcd", 3), ("😀😀😀😀", 2)] {
            let result = validate(normalized(text), max);
            assert_eq!(result.is_valid, result.length() <= max);
            assert_eq!(result.over_by, result.length().saturating_sub(max));
        }
    }

    #[test]
    fn test_clamp_max_chars() {
        assert_eq!(clamp_max_chars(-5), 0);
        assert_eq!(clamp_max_chars(0), 0);
        assert_eq!(clamp_max_chars(280), 280);
    }
}
