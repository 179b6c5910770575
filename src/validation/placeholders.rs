/*!
 * Placeholder preservation checks.
 *
 * A placeholder is any token that is substituted or interpreted at runtime
 * and therefore has to survive translation verbatim. The validator extracts
 * the tokens from source and translation with one grammar and compares them
 * as multisets: order may change, counts may not.
 */

use std::collections::BTreeMap;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Grammar for all placeholder kinds, tried left to right
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        // URLs
        r#"https?://[^\s<>"']+"#,
        // HTML tags with optional attributes
        r"|</?[A-Za-z][A-Za-z0-9:-]*(?:\s[^<>]*?)?/?>",
        // {{ template }}
        r"|\{\{\s*[^{}]*?\s*\}\}",
        // {name}, {0}, {}, {user.name}, {0:.2f}, {count!r}
        r"|\{[A-Za-z0-9_.]*(?:[:!][^{}]*)?\}",
        // printf: %%, %s, %1$s, %(name)s, %5.2f, %lld, %@
        r"|%%",
        r"|%(?:\d+\$|\([A-Za-z_][A-Za-z0-9_]*\))?[-+#0]*(?:\d+|\*)?(?:\.(?:\d+|\*))?(?:hh|h|ll|l|L|q|j|z|t)?[diouxXeEfFgGaAcs@]",
    ))
    .expect("Invalid placeholder regex")
});

/// Characters that end a sentence rather than a URL
const URL_TRAILING: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '\'', '"'];

/// Iterate over placeholder tokens in order of appearance
fn tokens(text: &str) -> impl Iterator<Item = &str> {
    PLACEHOLDER_REGEX.find_iter(text).map(|m| {
        let token = m.as_str();
        if token.starts_with("http") {
            token.trim_end_matches(URL_TRAILING)
        } else {
            token
        }
    })
}

/// Replace every placeholder with a space
///
/// Used before language scoring so that tags and format directives do not
/// count as words.
pub fn strip_placeholders(text: &str) -> String {
    PLACEHOLDER_REGEX.replace_all(text, " ").into_owned()
}

/// Multiset of placeholder tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderSet {
    counts: BTreeMap<String, usize>,
}

impl PlaceholderSet {
    /// Extract all placeholders from a text
    pub fn extract(text: &str) -> Self {
        let mut counts = BTreeMap::new();
        for token in tokens(text) {
            *counts.entry(token.to_string()).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Total number of tokens, repetitions included
    pub fn len(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Occurrences of one token
    pub fn count(&self, token: &str) -> usize {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Tokens in `self` not matched by `other`, one element per missing occurrence
    pub fn difference(&self, other: &PlaceholderSet) -> Vec<String> {
        let mut missing = Vec::new();
        for (token, &count) in &self.counts {
            let available = other.count(token);
            for _ in available..count {
                missing.push(token.clone());
            }
        }
        missing
    }
}

/// Outcome of comparing a source text with its translation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaceholderReport {
    /// Whether both multisets are equal
    pub passed: bool,
    /// Tokens present in the source but not in the translation
    pub missing: Vec<String>,
    /// Tokens present in the translation but not in the source
    pub added: Vec<String>,
}

/// Placeholder validator
pub struct PlaceholderValidator;

impl PlaceholderValidator {
    /// Compare the placeholders of a source text and its translation
    pub fn validate(source: &str, translation: &str) -> PlaceholderReport {
        let expected = PlaceholderSet::extract(source);
        let found = PlaceholderSet::extract(translation);

        let missing = expected.difference(&found);
        let added = found.difference(&expected);
        let passed = missing.is_empty() && added.is_empty();

        if !passed {
            debug!(
                "Placeholder mismatch: expected={}, found={}, missing={:?}, added={:?}",
                expected.len(),
                found.len(),
                missing,
                added
            );
        }

        PlaceholderReport { passed, missing, added }
    }
}
