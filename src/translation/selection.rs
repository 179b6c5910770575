/*!
 * Selection of the entries that need translation.
 *
 * Without force mode an entry is picked when its existing translation is
 * detected as a non-target language, or when it has no translation and its
 * msgid needs translating. An existing translation that is ambiguous is left
 * alone so that re-runs over a translated catalog do not change it.
 *
 * In force mode every entry with human-readable text is picked and the
 * `ForceSource` option decides which field is used as the source text.
 */

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use super::classifier::{Detection, LanguageClassifier, detect};
use crate::catalog::{Catalog, CatalogEntry, EntryKey};

/// Source field used when force mode retranslates an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForceSource {
    /// The existing msgstr when non-empty, otherwise the msgid
    #[default]
    PreferMsgstr,
    /// Always the msgid
    Msgid,
}

impl fmt::Display for ForceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreferMsgstr => write!(f, "prefer-msgstr"),
            Self::Msgid => write!(f, "msgid"),
        }
    }
}

impl FromStr for ForceSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prefer-msgstr" | "msgstr" => Ok(Self::PreferMsgstr),
            "msgid" => Ok(Self::Msgid),
            other => Err(format!("Invalid force source: {} (expected prefer-msgstr or msgid)", other)),
        }
    }
}

/// Entry field a work item's text was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceField {
    Msgid,
    Msgstr,
}

/// One entry scheduled for translation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkItem {
    /// Position of the entry in the catalog
    pub index: usize,
    /// Entry key, used as the item id in requests
    pub key: EntryKey,
    /// Field the text was taken from
    pub field: SourceField,
    /// Text to translate
    pub text: String,
    /// Source language, inferred or from the hint
    pub language: Option<String>,
}

/// Force policy for selection
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionPolicy {
    /// Retranslate every entry with readable text
    pub force: bool,
    /// Field used as source in force mode
    pub force_source: ForceSource,
}

/// Selects work items from a catalog in catalog order
pub struct WorkItemSelector<'a> {
    classifier: &'a LanguageClassifier,
    policy: SelectionPolicy,
}

impl<'a> WorkItemSelector<'a> {
    pub fn new(classifier: &'a LanguageClassifier, policy: SelectionPolicy) -> Self {
        Self { classifier, policy }
    }

    /// All eligible entries of the catalog
    pub fn select(&self, catalog: &Catalog) -> Vec<WorkItem> {
        let mut items = Vec::new();
        let mut plural_skipped = 0;

        for (index, entry) in catalog.messages() {
            if entry.is_plural() {
                plural_skipped += 1;
                continue;
            }
            if let Some(item) = self.select_entry(index, entry) {
                items.push(item);
            }
        }

        debug!(
            "Selected {} work items (force={}, plural entries skipped={})",
            items.len(),
            self.policy.force,
            plural_skipped
        );
        items
    }

    /// Decide for a single singular entry
    pub fn select_entry(&self, index: usize, entry: &CatalogEntry) -> Option<WorkItem> {
        if self.policy.force {
            return self.select_forced(index, entry);
        }

        let (field, text) = if entry.msgstr.is_empty() {
            (SourceField::Msgid, &entry.msgid)
        } else {
            (SourceField::Msgstr, &entry.msgstr)
        };

        let classification = self.classifier.classify(text);
        let eligible = match field {
            SourceField::Msgid => classification.needs_translation,
            SourceField::Msgstr => {
                classification.needs_translation && classification.inferred_language().is_some()
            }
        };
        if !eligible {
            return None;
        }

        Some(self.work_item(index, entry, field, text, classification.inferred_language()))
    }

    fn select_forced(&self, index: usize, entry: &CatalogEntry) -> Option<WorkItem> {
        let (field, text) = match self.policy.force_source {
            ForceSource::PreferMsgstr if !entry.msgstr.is_empty() => (SourceField::Msgstr, &entry.msgstr),
            _ => (SourceField::Msgid, &entry.msgid),
        };

        let detection = detect(text);
        if !detection.is_translatable_text() {
            return None;
        }
        let inferred = match detection {
            Detection::Detected { language, .. } => Some(language),
            _ => None,
        };
        Some(self.work_item(index, entry, field, text, inferred))
    }

    fn work_item(
        &self,
        index: usize,
        entry: &CatalogEntry,
        field: SourceField,
        text: &str,
        inferred: Option<&'static str>,
    ) -> WorkItem {
        let language = inferred
            .map(str::to_string)
            .or_else(|| self.classifier.source_hint().map(str::to_string));
        WorkItem {
            index,
            key: entry.key(),
            field,
            text: text.to_string(),
            language,
        }
    }
}
