//! HTML sanitization and plain-text extraction for rich-text editor content.

use crate::policy::AllowListPolicy;
use ammonia::{Builder, UrlRelative};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, OnceLock, PoisonError};
use tracing::warn;

/// Elements whose first newline the HTML parser swallows.
const LEADING_NEWLINE_TAGS: [&str; 3] = ["pre", "textarea", "listing"];

/// Trait for the HTML cleaning backend, allowing for mocking in tests.
pub trait HtmlCleaner: Send + Sync {
    fn clean(&self, html: &str) -> String;
}

/// Default implementation backed by `ammonia`'s html5ever-based cleaner.
pub struct AmmoniaCleaner {
    policy: AllowListPolicy,
    builder: Builder<'static>,
}

impl AmmoniaCleaner {
    /// Translates the policy into an ammonia builder, once.
    ///
    /// Starts from `Builder::empty()` so nothing from ammonia's own defaults
    /// leaks into the output. `link_rel` stays unset because `rel` may be
    /// allow-listed on anchors.
    pub fn new(policy: AllowListPolicy) -> Self {
        let tags: HashSet<&'static str> = policy.tags().keys().map(|t| intern(t)).collect();
        let tag_attributes: HashMap<&'static str, HashSet<&'static str>> = policy
            .tags()
            .iter()
            .filter(|(_, attributes)| !attributes.is_empty())
            .map(|(tag, attributes)| (intern(tag), attributes.iter().map(|a| intern(a)).collect()))
            .collect();
        let opaque: HashSet<&'static str> =
            policy.opaque_tags().iter().map(|t| intern(t)).collect();
        let schemes: HashSet<&'static str> =
            policy.url_schemes().iter().map(|s| intern(s)).collect();

        let mut builder = Builder::empty();
        builder
            .tags(tags)
            .tag_attributes(tag_attributes)
            .generic_attributes(HashSet::new())
            .clean_content_tags(opaque)
            .url_schemes(schemes)
            .url_relative(UrlRelative::PassThrough)
            .link_rel(None)
            .strip_comments(true);

        Self { policy, builder }
    }

    pub fn policy(&self) -> &AllowListPolicy {
        &self.policy
    }
}

impl HtmlCleaner for AmmoniaCleaner {
    fn clean(&self, html: &str) -> String {
        let cleaned = self.builder.clean(html).to_string();
        if let Cow::Owned(restored) = restore_leading_newlines(&cleaned) {
            return restored;
        }
        cleaned
    }
}

/// Returns a `'static` copy of a policy name, leaking each distinct name once.
///
/// The ammonia builder borrows its tables; names come from a small, fixed
/// vocabulary, so the table stays tiny however many cleaners are built.
fn intern(name: &str) -> &'static str {
    static NAMES: OnceLock<Mutex<HashSet<&'static str>>> = OnceLock::new();
    let mut names = NAMES
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    if let Some(existing) = names.get(name) {
        return *existing;
    }
    let leaked: &'static str = Box::leak(name.to_owned().into_boxed_str());
    names.insert(leaked);
    leaked
}

/// Re-adds the newline the parser drops after a `pre`-like start tag.
///
/// html5ever strips one newline right after `<pre>`, `<textarea>` and
/// `<listing>` but does not write it back, so text that begins with a
/// newline would lose one on every pass. Sanitized output holds a raw `<`
/// only at tag starts or inside double-quoted attribute values, so a quote
/// aware scan finds every tag.
fn restore_leading_newlines(html: &str) -> Cow<'_, str> {
    // Quick check: no element that needs it
    if !LEADING_NEWLINE_TAGS
        .iter()
        .any(|tag| html.contains(&format!("<{tag}")))
    {
        return Cow::Borrowed(html);
    }

    let mut result = String::with_capacity(html.len() + 8);
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        result.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tag_end(tail) else {
            rest = tail;
            break;
        };

        let (tag, after) = tail.split_at(end);
        result.push_str(tag);
        if after.starts_with('\n') && is_leading_newline_start_tag(tag) {
            result.push('\n');
        }
        rest = after;
    }
    result.push_str(rest);

    Cow::Owned(result)
}

/// Byte offset just past the `>` closing the tag at the start of `input`.
fn tag_end(input: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (i, c) in input.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '>' if !in_quotes => return Some(i + 1),
            _ => {}
        }
    }
    None
}

fn is_leading_newline_start_tag(tag: &str) -> bool {
    let name: String = tag
        .trim_start_matches('<')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    !tag.starts_with("</") && LEADING_NEWLINE_TAGS.contains(&name.to_ascii_lowercase().as_str())
}

/// Runs a cleaner, mapping any panic inside it to empty output.
///
/// This runs on every keystroke of an editor, so a parser failure must never
/// reach the caller.
pub fn clean_or_empty(cleaner: &dyn HtmlCleaner, html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    match panic::catch_unwind(AssertUnwindSafe(|| cleaner.clean(html))) {
        Ok(cleaned) => cleaned,
        Err(_) => {
            warn!(
                input_len = html.len(),
                "html cleaner panicked, falling back to empty output"
            );
            String::new()
        }
    }
}

/// Restricts markup to an allow-list policy, for display.
pub struct Sanitizer {
    cleaner: Box<dyn HtmlCleaner>,
}

impl Sanitizer {
    pub fn new(policy: AllowListPolicy) -> Self {
        Self::with_cleaner(AmmoniaCleaner::new(policy))
    }

    /// Creates a sanitizer with a custom cleaning backend (for testing).
    pub fn with_cleaner(cleaner: impl HtmlCleaner + 'static) -> Self {
        Self {
            cleaner: Box::new(cleaner),
        }
    }

    /// Sanitizes untrusted HTML.
    ///
    /// Disallowed elements are unwrapped, opaque ones (`script`, `style`, ...)
    /// are dropped with their content, and attributes not allowed on their
    /// tag are removed. The output is balanced even when the input is not.
    ///
    /// Unwrapping deeply nested disallowed block elements (thousands of
    /// `<div>`s) takes quadratic time in the parser. Callers running this on
    /// every keystroke should cap the input size first.
    ///
    /// # Examples
    /// ```
    /// use studybuddy_text::policy::AllowListPolicy;
    /// use studybuddy_text::sanitizer::Sanitizer;
    ///
    /// let sanitizer = Sanitizer::new(AllowListPolicy::rich_text());
    /// let html = r#"<p onclick="evil()">Hi <font>there</font></p>"#;
    /// assert_eq!(sanitizer.sanitize(html), "<p>Hi there</p>");
    ///
    /// let script = "<script>alert(1)</script><b>bold</b>";
    /// assert_eq!(sanitizer.sanitize(script), "<b>bold</b>");
    /// ```
    pub fn sanitize(&self, html: &str) -> String {
        clean_or_empty(self.cleaner.as_ref(), html)
    }
}

/// Derives plain text from HTML by re-sanitizing with no allowed tags.
///
/// Extraction never trusts that the input was sanitized first: it applies
/// its own text-only pass.
pub struct PlainTextExtractor {
    cleaner: Box<dyn HtmlCleaner>,
}

impl PlainTextExtractor {
    /// Builds an extractor from the text-only counterpart of `policy`.
    pub fn new(policy: &AllowListPolicy) -> Self {
        Self::with_cleaner(AmmoniaCleaner::new(policy.plain_text()))
    }

    /// Creates an extractor with a custom cleaning backend (for testing).
    pub fn with_cleaner(cleaner: impl HtmlCleaner + 'static) -> Self {
        Self {
            cleaner: Box::new(cleaner),
        }
    }

    /// Returns the text content of `html`, with character references decoded.
    ///
    /// No separator is inserted between elements, matching what a DOM's
    /// `textContent` gives.
    ///
    /// # Examples
    /// ```
    /// use studybuddy_text::policy::AllowListPolicy;
    /// use studybuddy_text::sanitizer::PlainTextExtractor;
    ///
    /// let extractor = PlainTextExtractor::new(&AllowListPolicy::rich_text());
    /// assert_eq!(extractor.extract("<p>Fish &amp; <em>chips</em></p>"), "Fish & chips");
    /// assert_eq!(extractor.extract("<style>p {}</style>text"), "text");
    /// ```
    pub fn extract<'a>(&self, html: &'a str) -> Cow<'a, str> {
        // Quick check: nothing a parser would change
        if !has_markup(html) {
            return Cow::Borrowed(html);
        }

        let cleaned = clean_or_empty(self.cleaner.as_ref(), html);
        Cow::Owned(html_escape::decode_html_entities(&cleaned).into_owned())
    }
}

/// Returns true if `input` contains anything an HTML parser would rewrite.
fn has_markup(input: &str) -> bool {
    input.contains(&['<', '&', '\0'][..])
}
