/*!
 * In-memory model of a gettext catalog.
 *
 * Every parsed entry keeps the exact source lines it was read from so that
 * untouched entries can be written back byte-for-byte. Only `msgstr` (and the
 * flag line, when `fuzzy` is added) is ever re-rendered.
 */

use std::fmt;
use std::ops::Range;
use std::path::Path;

use serde::{Serialize, Serializer};

use crate::errors::CatalogError;
use crate::file_utils::FileManager;

/// Separator placed between msgctxt and msgid in an entry key (gettext convention)
pub const CONTEXT_SEPARATOR: char = '\u{4}';

/// Unique identifier of an entry inside a catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey(String);

impl EntryKey {
    /// Build the key from an optional context and the msgid
    pub fn new(msgctxt: Option<&str>, msgid: &str) -> Self {
        match msgctxt {
            Some(ctx) => Self(format!("{}{}{}", ctx, CONTEXT_SEPARATOR, msgid)),
            None => Self(msgid.to_string()),
        }
    }

    /// Raw key, used as the item id in provider requests
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.split_once(CONTEXT_SEPARATOR) {
            Some((ctx, id)) => write!(f, "[{}] {}", ctx, id),
            None => f.write_str(&self.0),
        }
    }
}

impl Serialize for EntryKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl From<&str> for EntryKey {
    fn from(msgid: &str) -> Self {
        Self::new(None, msgid)
    }
}

/// Where an entry came from in the source text
#[derive(Debug, Clone, Default)]
pub(crate) struct EntrySource {
    /// Raw lines, each including its original line terminator
    pub(crate) lines: Vec<String>,
    /// Lines holding the singular msgstr and its continuations
    pub(crate) msgstr_span: Option<Range<usize>>,
    /// Index of the first `#,` line
    pub(crate) flags_line: Option<usize>,
    /// Index of the first msgctxt/msgid line
    pub(crate) first_keyword_line: Option<usize>,
    /// 1-based line number of the first keyword line in the file
    pub(crate) line_number: usize,
}

/// A single message entry
#[derive(Debug, Clone, Default)]
pub struct CatalogEntry {
    /// Translator comments (`# ...`)
    pub translator_comments: Vec<String>,
    /// Extracted comments (`#. ...`)
    pub extracted_comments: Vec<String>,
    /// Source references (`#: file:line`)
    pub references: Vec<String>,
    /// Flags (`#, fuzzy, c-format`)
    pub flags: Vec<String>,
    /// Previous msgid (`#| msgid "..."`)
    pub previous_msgid: Option<String>,
    /// Message context
    pub msgctxt: Option<String>,
    /// Source identifier text
    pub msgid: String,
    /// Plural source text
    pub msgid_plural: Option<String>,
    /// Singular translation
    pub msgstr: String,
    /// Plural translations indexed by plural form
    pub msgstr_plural: Vec<String>,
    /// Entry is commented out with `#~`
    pub obsolete: bool,

    pub(crate) source: EntrySource,
    pub(crate) msgstr_dirty: bool,
    pub(crate) flags_dirty: bool,
}

impl CatalogEntry {
    /// Create a new singular entry that has no source text yet
    pub fn new(msgid: impl Into<String>, msgstr: impl Into<String>) -> Self {
        Self {
            msgid: msgid.into(),
            msgstr: msgstr.into(),
            ..Default::default()
        }
    }

    /// Set the message context
    pub fn with_context(mut self, msgctxt: impl Into<String>) -> Self {
        self.msgctxt = Some(msgctxt.into());
        self
    }

    /// Add an extracted comment
    pub fn with_extracted_comment(mut self, comment: impl Into<String>) -> Self {
        self.extracted_comments.push(comment.into());
        self
    }

    /// Add a source reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.references.push(reference.into());
        self
    }

    /// Key identifying this entry
    pub fn key(&self) -> EntryKey {
        EntryKey::new(self.msgctxt.as_deref(), &self.msgid)
    }

    /// Header entry (empty msgid, no context)
    pub fn is_header(&self) -> bool {
        self.msgid.is_empty() && self.msgctxt.is_none() && !self.obsolete
    }

    /// Entry has plural forms
    pub fn is_plural(&self) -> bool {
        self.msgid_plural.is_some()
    }

    /// Entry is marked fuzzy
    pub fn is_fuzzy(&self) -> bool {
        self.flags.iter().any(|f| f == "fuzzy")
    }

    /// Entry was changed since it was parsed
    pub fn is_modified(&self) -> bool {
        self.msgstr_dirty || self.flags_dirty
    }

    /// 1-based line of the entry in the file it was parsed from (0 if built in memory)
    pub fn line_number(&self) -> usize {
        self.source.line_number
    }
}

/// An ordered gettext catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub(crate) entries: Vec<CatalogEntry>,
    /// Text after the last entry (blank lines, dangling comments)
    pub(crate) trailing: String,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from text
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        super::parser::CatalogParser::new(text).parse()
    }

    /// Load and parse a catalog from a UTF-8 file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    /// Serialize the catalog back to `.po` text
    pub fn to_po_string(&self) -> String {
        super::writer::write_catalog(self)
    }

    /// Write the catalog to a file, creating missing parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        FileManager::write_to_file(path, &self.to_po_string())
    }

    /// Append an entry built in memory
    pub fn push(&mut self, entry: CatalogEntry) {
        self.entries.push(entry);
    }

    /// All entries in file order, header and obsolete entries included
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entry at position `index`
    pub fn entry(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    /// Number of entries, header and obsolete entries included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Non-header, non-obsolete entries with their positions
    pub fn messages(&self) -> impl Iterator<Item = (usize, &CatalogEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.is_header() && !e.obsolete)
    }

    /// Find a live entry by key
    pub fn find(&self, key: &EntryKey) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|e| !e.obsolete && &e.key() == key)
    }

    /// The header entry, if any
    pub fn header(&self) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.is_header())
    }

    /// Header metadata as ordered (name, value) pairs
    pub fn header_fields(&self) -> Vec<(String, String)> {
        let Some(header) = self.header() else {
            return Vec::new();
        };
        header
            .msgstr
            .split('\n')
            .filter_map(|line| {
                let (name, value) = line.split_once(':')?;
                Some((name.trim().to_string(), value.trim().to_string()))
            })
            .collect()
    }

    /// Look up a header field by case-insensitive name
    pub fn header_field(&self, name: &str) -> Option<String> {
        self.header_fields()
            .into_iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// `Language` header
    pub fn language(&self) -> Option<String> {
        self.header_field("Language").filter(|l| !l.is_empty())
    }

    /// Charset declared in `Content-Type`
    pub fn charset(&self) -> Option<String> {
        let content_type = self.header_field("Content-Type")?;
        content_type
            .split(';')
            .filter_map(|part| part.trim().strip_prefix("charset="))
            .map(|c| c.trim().to_string())
            .next()
    }

    /// `Plural-Forms` header
    pub fn plural_forms(&self) -> Option<String> {
        self.header_field("Plural-Forms")
    }

    /// Replace the singular translation of the entry at `index`
    ///
    /// Returns false when the index does not point at a singular message.
    pub fn set_translation(&mut self, index: usize, msgstr: String, mark_fuzzy: bool) -> bool {
        let Some(entry) = self.entries.get_mut(index) else {
            return false;
        };
        if entry.is_header() || entry.obsolete || entry.is_plural() {
            return false;
        }

        entry.msgstr = msgstr;
        entry.msgstr_dirty = true;

        if mark_fuzzy && !entry.is_fuzzy() {
            entry.flags.push("fuzzy".to_string());
            entry.flags_dirty = true;
        }
        true
    }
}
