//! Tag and attribute allow-lists.
//!
//! An [`AllowListPolicy`] is the single configuration surface of the
//! sanitizer. It is validated once when built and immutable afterwards, so a
//! policy that made it into a [`crate::TextPipeline`] can never smuggle
//! `style`, event handlers or `script` through.

use crate::error::PolicyError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Tags whose content is dropped no matter what the policy says.
///
/// Besides `script` and `style` these are the elements whose text is
/// serialized without escaping, so sanitized output never holds a raw `<`
/// outside of a tag or a quoted attribute value.
const ALWAYS_OPAQUE: [&str; 8] = [
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

/// Non-rendering elements dropped together with their content by default.
pub const DEFAULT_OPAQUE_TAGS: [&str; 11] = [
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
    "template", "object", "embed",
];

/// Schemes allowed in `href` by default. Relative URLs are always kept.
pub const DEFAULT_URL_SCHEMES: [&str; 4] = ["http", "https", "mailto", "tel"];

const FORBIDDEN_SCHEMES: [&str; 3] = ["javascript", "vbscript", "data"];

/// Tags produced by the rich-text editor, paired with their attributes.
const RICH_TEXT_TAGS: [(&str, &[&str]); 23] = [
    ("p", &[]),
    ("br", &[]),
    ("blockquote", &[]),
    ("b", &[]),
    ("strong", &[]),
    ("i", &[]),
    ("em", &[]),
    ("u", &[]),
    ("s", &[]),
    ("strike", &[]),
    ("span", &["class"]),
    ("ul", &[]),
    ("ol", &[]),
    ("li", &[]),
    ("h1", &[]),
    ("h2", &[]),
    ("h3", &[]),
    ("h4", &[]),
    ("h5", &[]),
    ("h6", &[]),
    ("code", &["class"]),
    ("pre", &["class"]),
    ("a", &["href", "target", "rel"]),
];

/// Unvalidated policy description, as written in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PolicySpec {
    /// Tag name -> permitted attribute names.
    #[serde(default)]
    pub tags: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_opaque_tags")]
    pub opaque_tags: Vec<String>,
    #[serde(default = "default_url_schemes")]
    pub url_schemes: Vec<String>,
}

fn default_opaque_tags() -> Vec<String> {
    DEFAULT_OPAQUE_TAGS.iter().map(|t| t.to_string()).collect()
}

fn default_url_schemes() -> Vec<String> {
    DEFAULT_URL_SCHEMES.iter().map(|s| s.to_string()).collect()
}

impl Default for PolicySpec {
    fn default() -> Self {
        Self {
            tags: BTreeMap::new(),
            opaque_tags: default_opaque_tags(),
            url_schemes: default_url_schemes(),
        }
    }
}

/// A validated mapping from tag name to the set of attributes it may carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicySpec", into = "PolicySpec")]
pub struct AllowListPolicy {
    tags: BTreeMap<String, BTreeSet<String>>,
    opaque_tags: BTreeSet<String>,
    url_schemes: BTreeSet<String>,
}

impl AllowListPolicy {
    /// Validates a policy description.
    ///
    /// Names are trimmed and lowercased. `script`, `style` and the other
    /// raw-text elements are always treated as opaque even when the
    /// description leaves them out.
    pub fn new(spec: PolicySpec) -> Result<Self, PolicyError> {
        let mut opaque_tags: BTreeSet<String> =
            ALWAYS_OPAQUE.iter().map(|t| t.to_string()).collect();
        for tag in &spec.opaque_tags {
            opaque_tags.insert(normalize_tag_name(tag)?);
        }

        let mut tags = BTreeMap::new();
        for (tag, attributes) in &spec.tags {
            let tag = normalize_tag_name(tag)?;
            if opaque_tags.contains(&tag) {
                return Err(PolicyError::OpaqueTagAllowed(tag));
            }

            let mut allowed = BTreeSet::new();
            for attribute in attributes {
                allowed.insert(normalize_attribute_name(&tag, attribute)?);
            }
            tags.entry(tag)
                .or_insert_with(BTreeSet::new)
                .extend(allowed);
        }

        let url_schemes = spec
            .url_schemes
            .iter()
            .map(|s| normalize_scheme(s))
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Self {
            tags,
            opaque_tags,
            url_schemes,
        })
    }

    /// The display policy for rich-text editor content.
    ///
    /// Anchors keep `href`, `target` and `rel`; `span`, `code` and `pre` keep
    /// `class`; every other allowed tag keeps no attributes at all.
    pub fn rich_text() -> Self {
        let tags = RICH_TEXT_TAGS
            .iter()
            .map(|(tag, attributes)| {
                (
                    tag.to_string(),
                    attributes.iter().map(|a| a.to_string()).collect(),
                )
            })
            .collect();

        Self {
            tags,
            opaque_tags: DEFAULT_OPAQUE_TAGS.iter().map(|t| t.to_string()).collect(),
            url_schemes: DEFAULT_URL_SCHEMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The extraction counterpart of this policy: same opaque tags and
    /// schemes, no allowed tags, so only text survives.
    pub fn plain_text(&self) -> Self {
        Self {
            tags: BTreeMap::new(),
            opaque_tags: self.opaque_tags.clone(),
            url_schemes: self.url_schemes.clone(),
        }
    }

    /// Returns true if `tag` may appear in sanitized output.
    pub fn allows_tag(&self, tag: &str) -> bool {
        self.tags.contains_key(&tag.to_ascii_lowercase())
    }

    /// Attributes permitted on `tag`, or `None` if the tag itself is not allowed.
    pub fn allowed_attributes(&self, tag: &str) -> Option<&BTreeSet<String>> {
        self.tags.get(&tag.to_ascii_lowercase())
    }

    /// Every allowed tag with its permitted attributes.
    pub fn tags(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.tags
    }

    /// Tags dropped together with their content.
    pub fn opaque_tags(&self) -> &BTreeSet<String> {
        &self.opaque_tags
    }

    /// Schemes an `href` may use; relative URLs need none.
    pub fn url_schemes(&self) -> &BTreeSet<String> {
        &self.url_schemes
    }

    /// Returns true if the policy strips every tag.
    pub fn is_text_only(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Default for AllowListPolicy {
    fn default() -> Self {
        Self::rich_text()
    }
}

impl TryFrom<PolicySpec> for AllowListPolicy {
    type Error = PolicyError;

    fn try_from(spec: PolicySpec) -> Result<Self, Self::Error> {
        Self::new(spec)
    }
}

impl From<AllowListPolicy> for PolicySpec {
    fn from(policy: AllowListPolicy) -> Self {
        Self {
            tags: policy
                .tags
                .into_iter()
                .map(|(tag, attributes)| (tag, attributes.into_iter().collect()))
                .collect(),
            opaque_tags: policy.opaque_tags.into_iter().collect(),
            url_schemes: policy.url_schemes.into_iter().collect(),
        }
    }
}

fn normalize_tag_name(raw: &str) -> Result<String, PolicyError> {
    let name = raw.trim().to_ascii_lowercase();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(PolicyError::InvalidTagName(raw.to_string()));
    }
    Ok(name)
}

fn normalize_attribute_name(tag: &str, raw: &str) -> Result<String, PolicyError> {
    let name = raw.trim().to_ascii_lowercase();
    let well_formed = name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !well_formed {
        return Err(PolicyError::InvalidAttributeName {
            tag: tag.to_string(),
            attribute: raw.to_string(),
        });
    }

    // Inline styles and event handlers are never safe to pass through.
    if name == "style" || name.starts_with("on") {
        return Err(PolicyError::ForbiddenAttribute {
            tag: tag.to_string(),
            attribute: name,
        });
    }
    Ok(name)
}

fn normalize_scheme(raw: &str) -> Result<String, PolicyError> {
    let scheme = raw.trim().trim_end_matches(':').to_ascii_lowercase();
    let well_formed = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !well_formed || FORBIDDEN_SCHEMES.contains(&scheme.as_str()) {
        return Err(PolicyError::ForbiddenScheme(raw.to_string()));
    }
    Ok(scheme)
}
