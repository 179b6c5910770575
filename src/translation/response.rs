/*!
 * Lenient parsing of model answers.
 *
 * Models are asked for a single JSON object mapping item ids to translations,
 * but they do not always comply. Accepted shapes:
 * - `{"id": "translation", ...}`
 * - `[{"id": "...", "translation": "..."}, ...]`
 * - either of the above under a `"translations"` or `"items"` key
 * - any of the above inside a Markdown code fence or surrounded by prose
 *
 * Unknown ids, empty strings and non-string values are ignored, so the
 * result may be partial.
 */

use std::collections::HashMap;

use log::debug;
use serde_json::{Map, Value};

use super::selection::WorkItem;
use crate::catalog::EntryKey;
use crate::errors::TranslationError;

/// Translations of one request, keyed by entry key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationResult {
    translations: HashMap<EntryKey, String>,
}

impl TranslationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: EntryKey, translation: String) {
        self.translations.insert(key, translation);
    }

    pub fn get(&self, key: &EntryKey) -> Option<&str> {
        self.translations.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }

    /// Items of a request that have no translation in this result
    pub fn missing<'a>(&self, items: &'a [WorkItem]) -> Vec<&'a WorkItem> {
        items
            .iter()
            .filter(|item| !self.translations.contains_key(&item.key))
            .collect()
    }

    /// Merge another result into this one
    pub fn extend(&mut self, other: TranslationResult) {
        self.translations.extend(other.translations);
    }

    /// Synthetic result mapping every item to its unchanged text
    pub fn identity(items: &[WorkItem]) -> Self {
        Self {
            translations: items
                .iter()
                .map(|item| (item.key.clone(), item.text.clone()))
                .collect(),
        }
    }
}

/// Parse a model answer for the given request items
pub fn parse_response(text: &str, items: &[WorkItem]) -> Result<TranslationResult, TranslationError> {
    let body = strip_code_fence(text);
    let value = serde_json::from_str::<Value>(body.trim())
        .ok()
        .or_else(|| extract_embedded_json(body))
        .ok_or_else(|| TranslationError::UnparsableResponse("response contains no JSON document".to_string()))?;

    let pairs = collect_pairs(&value)?;
    let mut result = TranslationResult::new();

    for item in items {
        if let Some(translation) = pairs.get(item.key.as_str()) {
            if !translation.trim().is_empty() {
                result.insert(item.key.clone(), translation.clone());
            }
        }
    }

    // a single item may come back under any key
    if result.is_empty() && items.len() == 1 && pairs.len() == 1 {
        if let Some(translation) = pairs.values().next().filter(|t| !t.trim().is_empty()) {
            result.insert(items[0].key.clone(), translation.clone());
        }
    }

    debug!("Parsed {} of {} translations from response", result.len(), items.len());
    Ok(result)
}

/// Body of the first fenced code block, or the whole text
fn strip_code_fence(text: &str) -> &str {
    let Some(start) = text.find("```") else {
        return text;
    };
    let after = &text[start + 3..];
    // skip the info string (e.g. `json`)
    let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after[body_start..];
    match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    }
}

/// First balanced `{...}` or `[...]` that parses as JSON
fn extract_embedded_json(text: &str) -> Option<Value> {
    let starts = text
        .char_indices()
        .filter(|(_, c)| *c == '{' || *c == '[')
        .map(|(i, _)| i);

    for start in starts {
        if let Some(end) = balanced_end(&text[start..]) {
            if let Ok(value) = serde_json::from_str::<Value>(&text[start..start + end]) {
                return Some(value);
            }
        }
    }
    None
}

/// Byte length of the balanced bracket group at the start of `text`
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// Flatten any accepted shape into id → translation pairs
fn collect_pairs(value: &Value) -> Result<HashMap<String, String>, TranslationError> {
    match value {
        Value::Object(map) => {
            for wrapper in ["translations", "items"] {
                if let Some(inner) = map.get(wrapper).filter(|v| v.is_object() || v.is_array()) {
                    return collect_pairs(inner);
                }
            }
            Ok(object_pairs(map))
        }
        Value::Array(elements) => Ok(elements.iter().filter_map(array_pair).collect()),
        other => Err(TranslationError::UnparsableResponse(format!(
            "expected a JSON object or array, got {}",
            json_kind(other)
        ))),
    }
}

fn object_pairs(map: &Map<String, Value>) -> HashMap<String, String> {
    map.iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .collect()
}

fn array_pair(element: &Value) -> Option<(String, String)> {
    let object = element.as_object()?;
    let id = match object.get("id")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let translation = ["translation", "translated", "text"]
        .iter()
        .find_map(|field| object.get(*field).and_then(Value::as_str))?;
    Some((id, translation.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
