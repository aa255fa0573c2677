//! The sanitize -> extract -> normalize -> validate pipeline.

use crate::config::PipelineConfig;
use crate::models::{NormalizationResult, ValidationResult};
use crate::normalizer::normalize_text;
use crate::policy::AllowListPolicy;
use crate::sanitizer::{HtmlCleaner, PlainTextExtractor, Sanitizer};
use crate::validator::validate;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// A configured pipeline. Build it once at startup and share it by reference.
pub struct TextPipeline {
    policy: AllowListPolicy,
    sanitizer: Sanitizer,
    extractor: PlainTextExtractor,
    max_chars: Option<usize>,
}

impl TextPipeline {
    /// Builds a pipeline whose display and extraction passes both derive
    /// from `policy`.
    pub fn new(policy: AllowListPolicy) -> Self {
        debug!(
            tags = policy.tags().len(),
            opaque_tags = policy.opaque_tags().len(),
            "building text pipeline"
        );
        Self {
            sanitizer: Sanitizer::new(policy.clone()),
            extractor: PlainTextExtractor::new(&policy),
            policy,
            max_chars: None,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut pipeline = Self::new(config.policy.clone());
        pipeline.max_chars = config.max_chars;
        pipeline
    }

    /// Replaces both cleaning backends (for testing). The policy is kept for
    /// reporting only.
    pub fn with_cleaners(
        mut self,
        display: impl HtmlCleaner + 'static,
        plain: impl HtmlCleaner + 'static,
    ) -> Self {
        self.sanitizer = Sanitizer::with_cleaner(display);
        self.extractor = PlainTextExtractor::with_cleaner(plain);
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = Some(max_chars);
        self
    }

    pub fn policy(&self) -> &AllowListPolicy {
        &self.policy
    }

    pub fn max_chars(&self) -> Option<usize> {
        self.max_chars
    }

    /// Sanitizes `html` for display and derives its canonical plain text.
    ///
    /// Never fails: a cleaner failure degrades to empty output.
    pub fn normalize(&self, html: &str) -> NormalizationResult {
        let sanitized_html = self.sanitizer.sanitize(html);
        // Extraction starts from the raw input, not the display output.
        let extracted = self.extractor.extract(html);
        let plain_text = normalize_text(&extracted);

        let result = NormalizationResult::new(sanitized_html, plain_text);
        trace!(
            input_len = html.len(),
            length = result.length,
            "normalized rich text"
        );
        result
    }

    pub fn normalize_and_validate(&self, html: &str, max_chars: usize) -> ValidationResult {
        validate(self.normalize(html), max_chars)
    }

    /// Validates against the configured limit. Without one, any length passes.
    pub fn check(&self, html: &str) -> ValidationResult {
        self.normalize_and_validate(html, self.max_chars.unwrap_or(usize::MAX))
    }
}

impl Default for TextPipeline {
    fn default() -> Self {
        Self::new(AllowListPolicy::rich_text())
    }
}

/// The shared pipeline with the rich-text policy, built on first use.
pub fn default_pipeline() -> &'static TextPipeline {
    static DEFAULT_PIPELINE: OnceLock<TextPipeline> = OnceLock::new();
    DEFAULT_PIPELINE.get_or_init(TextPipeline::default)
}

/// Normalizes rich-text HTML with the default policy.
///
/// # Examples
/// ```
/// use studybuddy_text::normalize;
///
/// let result = normalize("<script>alert(1)</script><p>hi</p>");
/// assert_eq!(result.sanitized_html, "<p>hi</p>");
/// assert_eq!(result.plain_text, "hi");
/// assert_eq!(result.length, 2);
/// ```
pub fn normalize(html: &str) -> NormalizationResult {
    default_pipeline().normalize(html)
}

/// Normalizes with the default policy and checks the result against `max_chars`.
///
/// # Examples
/// ```
/// use studybuddy_text::normalize_and_validate;
///
/// let result = normalize_and_validate("<p>hello world</p>", 5);
/// assert_eq!(result.plain_text(), "hello world");
/// assert_eq!(result.length(), 11);
/// assert!(!result.is_valid);
/// assert_eq!(result.over_by, 6);
/// ```
pub fn normalize_and_validate(html: &str, max_chars: usize) -> ValidationResult {
    default_pipeline().normalize_and_validate(html, max_chars)
}
