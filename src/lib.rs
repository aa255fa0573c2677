//! StudyBuddy rich-text library
//!
//! Sanitizes rich-text editor HTML against an allow-list, derives its plain
//! text, and counts it the way character limits are enforced.

pub mod config;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod policy;
pub mod sanitizer;
pub mod validator;

pub use config::PipelineConfig;
pub use error::{ConfigError, PolicyError};
pub use models::{NormalizationResult, ValidationResult};
pub use normalizer::{contains_cjk, count_words, CountMetric};
pub use pipeline::{default_pipeline, normalize, normalize_and_validate, TextPipeline};
pub use policy::{AllowListPolicy, PolicySpec};
