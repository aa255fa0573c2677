//! Result values produced by the normalization pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sanitized markup plus the canonical plain text derived from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationResult {
    /// Markup restricted to the allow-list, safe to render.
    pub sanitized_html: String,
    /// Normalized text with no markup.
    pub plain_text: String,
    /// Code points in `plain_text`.
    pub length: usize,
}

impl NormalizationResult {
    /// Creates a result from sanitized markup and already-normalized text.
    pub fn new(sanitized_html: String, plain_text: String) -> Self {
        let length = plain_text.chars().count();
        Self {
            sanitized_html,
            plain_text,
            length,
        }
    }

    /// Returns true if there is no visible text.
    pub fn is_blank(&self) -> bool {
        self.length == 0
    }

    /// Whitespace-separated words in `plain_text`.
    pub fn word_count(&self) -> usize {
        crate::normalizer::count_words(&self.plain_text)
    }
}

/// A normalization result checked against a character limit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    #[serde(flatten)]
    pub normalized: NormalizationResult,
    pub max_chars: usize,
    pub is_valid: bool,
    /// How many characters need to go; 0 when valid.
    pub over_by: usize,
}

impl ValidationResult {
    /// Characters still available before the limit is reached.
    pub fn remaining(&self) -> usize {
        self.max_chars.saturating_sub(self.normalized.length)
    }

    /// Code points in the normalized text.
    pub fn length(&self) -> usize {
        self.normalized.length
    }

    /// The normalized plain text.
    pub fn plain_text(&self) -> &str {
        &self.normalized.plain_text
    }

    /// The sanitized markup.
    pub fn sanitized_html(&self) -> &str {
        &self.normalized.sanitized_html
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid {
            write!(f, "{}/{} characters", self.normalized.length, self.max_chars)
        } else {
            write!(
                f,
                "{}/{} characters ({} over)",
                self.normalized.length, self.max_chars, self.over_by
            )
        }
    }
}
