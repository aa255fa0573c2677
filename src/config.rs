//! Pipeline configuration loaded from JSON.
//!
//! ```json
//! {
//!   "policy": { "tags": { "p": [], "a": ["href"] }, "urlSchemes": ["https"] },
//!   "maxChars": 500
//! }
//! ```
//!
//! Both keys are optional. A missing policy means the rich-text policy; a
//! negative `maxChars` is treated as 0.

use crate::error::ConfigError;
use crate::policy::{AllowListPolicy, PolicySpec};
use crate::validator::clamp_max_chars;
use serde::Deserialize;
use std::fs;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    policy: Option<PolicySpec>,
    #[serde(default)]
    max_chars: Option<i64>,
}

/// Settings a [`crate::TextPipeline`] is built from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineConfig {
    pub policy: AllowListPolicy,
    pub max_chars: Option<usize>,
}

impl PipelineConfig {
    pub fn new(policy: AllowListPolicy) -> Self {
        Self {
            policy,
            max_chars: None,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = Some(max_chars);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Self::from_raw(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Self::from_raw(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let policy = match raw.policy {
            Some(spec) => AllowListPolicy::new(spec)?,
            None => AllowListPolicy::rich_text(),
        };

        Ok(Self {
            policy,
            max_chars: raw.max_chars.map(clamp_max_chars),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PolicyError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = PipelineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.policy, AllowListPolicy::rich_text());
        assert_eq!(config.max_chars, None);
    }

    #[test]
    fn test_custom_policy_and_limit() {
        let json = r#"{"policy": {"tags": {"p": [], "A": ["HREF"]}}, "maxChars": 280}"#;
        let config = PipelineConfig::from_json_str(json).unwrap();
        assert!(config.policy.allows_tag("a"));
        assert!(!config.policy.allows_tag("strong"));
        assert_eq!(config.max_chars, Some(280));
    }

    #[test]
    fn test_negative_limit_clamped() {
        let config = PipelineConfig::from_json_str(r#"{"maxChars": -10}"#).unwrap();
        assert_eq!(config.max_chars, Some(0));
    }

    #[test]
    fn test_policy_error_reported() {
        let json = r#"{"policy": {"tags": {"p": ["onmouseover"]}}}"#;
        let err = PipelineConfig::from_json_str(json).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Policy(PolicyError::ForbiddenAttribute { .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        let err = PipelineConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = PipelineConfig::from_json_str(r#"{"maxLength": 5}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"maxChars": 1000}}"#).unwrap();

        let config = PipelineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.max_chars, Some(1000));
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");

        let err = PipelineConfig::from_path(&missing).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn test_from_reader() {
        let json = br#"{"policy": {"tags": {"em": []}, "opaqueTags": ["svg"]}}"#;
        let config = PipelineConfig::from_reader(&json[..]).unwrap();
        assert!(config.policy.allows_tag("em"));
        assert!(config.policy.opaque_tags().contains("svg"));
        assert!(config.policy.opaque_tags().contains("script"));
    }
}
