/*!
 * Parser for gettext `.po` catalogs.
 *
 * The parser walks the text line by line and keeps every raw line (with its
 * terminator) on the entry it belongs to. Structure recognised:
 * - `#`  translator comments, `#.` extracted comments, `#:` references,
 *   `#,` flags, `#|` previous msgid, `#~` obsolete entries
 * - `msgctxt`, `msgid`, `msgid_plural`, `msgstr`, `msgstr[N]`
 * - `"..."` continuation strings
 */

use std::collections::HashSet;

use log::trace;

use super::model::{Catalog, CatalogEntry, EntryKey};
use crate::errors::CatalogError;

/// Keyword at the start of a message line
#[derive(Debug, Clone, Copy, PartialEq)]
enum Keyword {
    Msgctxt,
    Msgid,
    MsgidPlural,
    Msgstr,
    MsgstrIndexed(usize),
}

/// Classified content of a single line
#[derive(Debug)]
enum Line<'a> {
    Blank,
    /// Text after the leading `#`
    Comment(&'a str),
    Keyword {
        keyword: Keyword,
        rest: &'a str,
        obsolete: bool,
    },
    Continuation(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Phase {
    #[default]
    Comments,
    Context,
    Id,
    Plural,
    Str,
}

/// Field that a continuation string extends
#[derive(Debug, Clone, Copy)]
enum Field {
    Context,
    Id,
    Plural,
    Str,
    StrIndexed(usize),
}

/// Entry being assembled
#[derive(Default)]
struct PendingEntry {
    entry: CatalogEntry,
    phase: Phase,
    field: Option<Field>,
}

impl PendingEntry {
    fn push_line(&mut self, raw: &str) {
        self.entry.source.lines.push(raw.to_string());
    }

    fn next_index(&self) -> usize {
        self.entry.source.lines.len()
    }

    fn apply_comment(&mut self, body: &str, line: usize) -> Result<(), CatalogError> {
        let entry = &mut self.entry;
        if let Some(text) = body.strip_prefix('.') {
            entry.extracted_comments.push(text.trim().to_string());
        } else if let Some(text) = body.strip_prefix(':') {
            entry
                .references
                .extend(text.split_whitespace().map(str::to_string));
        } else if let Some(text) = body.strip_prefix(',') {
            if entry.source.flags_line.is_none() {
                entry.source.flags_line = Some(entry.source.lines.len());
            }
            entry.flags.extend(
                text.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string),
            );
        } else if let Some(text) = body.strip_prefix('|') {
            let text = text.trim();
            if let Some(rest) = text.strip_prefix("msgid") {
                if !rest.starts_with('_') {
                    entry.previous_msgid = Some(parse_quoted(rest, line)?);
                }
            } else if text.starts_with('"') {
                if let Some(previous) = entry.previous_msgid.as_mut() {
                    previous.push_str(&parse_quoted(text, line)?);
                }
            }
        } else if body.starts_with('~') {
            // obsolete line that carries no message keyword
        } else {
            let text = body.strip_prefix(' ').unwrap_or(body);
            entry.translator_comments.push(text.trim_end().to_string());
        }
        Ok(())
    }

    fn apply_keyword(
        &mut self,
        keyword: Keyword,
        value: String,
        obsolete: bool,
        line: usize,
    ) -> Result<(), CatalogError> {
        let index = self.next_index();
        match keyword {
            Keyword::Msgctxt => {
                if self.phase != Phase::Comments {
                    return Err(parse_error(line, "unexpected msgctxt"));
                }
                self.entry.msgctxt = Some(value);
                self.phase = Phase::Context;
                self.field = Some(Field::Context);
            }
            Keyword::Msgid => {
                if !matches!(self.phase, Phase::Comments | Phase::Context) {
                    return Err(parse_error(line, "unexpected msgid"));
                }
                self.entry.msgid = value;
                self.phase = Phase::Id;
                self.field = Some(Field::Id);
            }
            Keyword::MsgidPlural => {
                if self.phase != Phase::Id {
                    return Err(parse_error(line, "msgid_plural must follow msgid"));
                }
                self.entry.msgid_plural = Some(value);
                self.phase = Phase::Plural;
                self.field = Some(Field::Plural);
            }
            Keyword::Msgstr => {
                match self.phase {
                    Phase::Id => {}
                    Phase::Plural => {
                        return Err(parse_error(line, "plural entry requires msgstr[N]"));
                    }
                    _ => return Err(parse_error(line, "unexpected msgstr")),
                }
                self.entry.msgstr = value;
                self.entry.source.msgstr_span = Some(index..index + 1);
                self.phase = Phase::Str;
                self.field = Some(Field::Str);
            }
            Keyword::MsgstrIndexed(n) => {
                let plural_ok = self.phase == Phase::Plural
                    || (self.phase == Phase::Str && self.entry.msgid_plural.is_some());
                if !plural_ok {
                    return Err(parse_error(line, "msgstr[N] requires msgid_plural"));
                }
                if self.entry.msgstr_plural.len() <= n {
                    self.entry.msgstr_plural.resize(n + 1, String::new());
                }
                self.entry.msgstr_plural[n] = value;
                self.phase = Phase::Str;
                self.field = Some(Field::StrIndexed(n));
            }
        }

        if self.entry.source.first_keyword_line.is_none() {
            self.entry.source.first_keyword_line = Some(index);
            self.entry.source.line_number = line;
        }
        if obsolete {
            self.entry.obsolete = true;
        }
        Ok(())
    }

    fn append_continuation(&mut self, value: &str, line: usize) -> Result<(), CatalogError> {
        let index = self.next_index();
        let entry = &mut self.entry;
        match self.field {
            Some(Field::Context) => {
                if let Some(ctx) = entry.msgctxt.as_mut() {
                    ctx.push_str(value);
                }
            }
            Some(Field::Id) => entry.msgid.push_str(value),
            Some(Field::Plural) => {
                if let Some(plural) = entry.msgid_plural.as_mut() {
                    plural.push_str(value);
                }
            }
            Some(Field::Str) => {
                entry.msgstr.push_str(value);
                if let Some(span) = entry.source.msgstr_span.as_mut() {
                    span.end = index + 1;
                }
            }
            Some(Field::StrIndexed(n)) => entry.msgstr_plural[n].push_str(value),
            None => return Err(parse_error(line, "string continuation without a keyword")),
        }
        Ok(())
    }
}

/// Line-oriented `.po` parser
pub struct CatalogParser<'a> {
    text: &'a str,
    catalog: Catalog,
    seen: HashSet<EntryKey>,
}

impl<'a> CatalogParser<'a> {
    /// Create a parser over the full catalog text
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            catalog: Catalog::new(),
            seen: HashSet::new(),
        }
    }

    /// Parse the whole text
    pub fn parse(mut self) -> Result<Catalog, CatalogError> {
        let mut pending = PendingEntry::default();
        let mut last_line = 0;

        for (idx, raw) in self.text.split_inclusive('\n').enumerate() {
            let line = idx + 1;
            last_line = line;

            let mut content = raw.trim_end_matches(['\n', '\r']);
            if idx == 0 {
                content = content.strip_prefix('\u{feff}').unwrap_or(content);
            }

            match classify(content, line)? {
                Line::Blank => match pending.phase {
                    Phase::Comments => pending.push_line(raw),
                    Phase::Str => {
                        self.finish(std::mem::take(&mut pending))?;
                        pending.push_line(raw);
                    }
                    _ => return Err(parse_error(line, "missing msgstr before blank line")),
                },
                Line::Comment(body) => {
                    match pending.phase {
                        Phase::Comments => {}
                        Phase::Str => self.finish(std::mem::take(&mut pending))?,
                        _ => return Err(parse_error(line, "comment inside message definition")),
                    }
                    pending.apply_comment(body, line)?;
                    pending.push_line(raw);
                }
                Line::Keyword { keyword, rest, obsolete } => {
                    let starts_entry = matches!(keyword, Keyword::Msgctxt | Keyword::Msgid);
                    if starts_entry && pending.phase == Phase::Str {
                        self.finish(std::mem::take(&mut pending))?;
                    }
                    let value = parse_quoted(rest, line)?;
                    pending.apply_keyword(keyword, value, obsolete, line)?;
                    pending.push_line(raw);
                }
                Line::Continuation(rest) => {
                    let value = parse_quoted(rest, line)?;
                    pending.append_continuation(&value, line)?;
                    pending.push_line(raw);
                }
            }
        }

        match pending.phase {
            Phase::Comments => {
                self.catalog.trailing = pending.entry.source.lines.concat();
            }
            Phase::Str => self.finish(pending)?,
            _ => {
                return Err(parse_error(last_line, "unexpected end of file, missing msgstr"));
            }
        }

        trace!("Parsed catalog with {} entries", self.catalog.len());
        Ok(self.catalog)
    }

    fn finish(&mut self, pending: PendingEntry) -> Result<(), CatalogError> {
        let entry = pending.entry;
        if !entry.obsolete {
            let key = entry.key();
            if !self.seen.insert(key.clone()) {
                return Err(CatalogError::DuplicateEntry {
                    line: entry.source.line_number,
                    key: key.to_string(),
                });
            }
        }
        self.catalog.entries.push(entry);
        Ok(())
    }
}

fn parse_error(line: usize, message: &str) -> CatalogError {
    CatalogError::Parse {
        line,
        message: message.to_string(),
    }
}

fn classify(content: &str, line: usize) -> Result<Line<'_>, CatalogError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(Line::Blank);
    }

    if let Some(rest) = trimmed.strip_prefix("#~") {
        let rest = rest.trim_start();
        if rest.starts_with('"') {
            return Ok(Line::Continuation(rest));
        }
        if let Some((keyword, value)) = split_keyword(rest, line)? {
            return Ok(Line::Keyword { keyword, rest: value, obsolete: true });
        }
        return Ok(Line::Comment(&trimmed[1..]));
    }

    if let Some(body) = trimmed.strip_prefix('#') {
        return Ok(Line::Comment(body));
    }
    if trimmed.starts_with('"') {
        return Ok(Line::Continuation(trimmed));
    }
    if let Some((keyword, value)) = split_keyword(trimmed, line)? {
        return Ok(Line::Keyword { keyword, rest: value, obsolete: false });
    }

    Err(parse_error(line, &format!("unexpected content: {}", trimmed)))
}

/// Split a keyword off the start of a line, if the line starts with one
fn split_keyword(text: &str, line: usize) -> Result<Option<(Keyword, &str)>, CatalogError> {
    let (keyword, rest) = if let Some(rest) = text.strip_prefix("msgctxt") {
        (Keyword::Msgctxt, rest)
    } else if let Some(rest) = text.strip_prefix("msgid_plural") {
        (Keyword::MsgidPlural, rest)
    } else if let Some(rest) = text.strip_prefix("msgid") {
        (Keyword::Msgid, rest)
    } else if let Some(rest) = text.strip_prefix("msgstr[") {
        let close = rest
            .find(']')
            .ok_or_else(|| parse_error(line, "unterminated msgstr index"))?;
        let index = rest[..close]
            .trim()
            .parse::<usize>()
            .map_err(|_| parse_error(line, "invalid msgstr index"))?;
        (Keyword::MsgstrIndexed(index), &rest[close + 1..])
    } else if let Some(rest) = text.strip_prefix("msgstr") {
        (Keyword::Msgstr, rest)
    } else {
        return Ok(None);
    };

    if rest.starts_with(|c: char| c.is_whitespace() || c == '"') {
        Ok(Some((keyword, rest)))
    } else {
        Ok(None)
    }
}

/// Decode one quoted C-style string; only whitespace may follow the closing quote
pub(crate) fn parse_quoted(text: &str, line: usize) -> Result<String, CatalogError> {
    let text = text.trim();
    let mut chars = text.chars();
    if chars.next() != Some('"') {
        return Err(parse_error(line, "expected quoted string"));
    }

    let mut value = String::new();
    loop {
        match chars.next() {
            None => return Err(CatalogError::UnterminatedString(line)),
            Some('"') => break,
            Some('\\') => {
                let decoded = match chars.next() {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some('"') => '"',
                    Some('\\') => '\\',
                    Some('\'') => '\'',
                    Some('?') => '?',
                    Some('a') => '\u{7}',
                    Some('b') => '\u{8}',
                    Some('f') => '\u{c}',
                    Some('v') => '\u{b}',
                    Some(other) => {
                        return Err(CatalogError::InvalidEscape { line, escape: other });
                    }
                    None => return Err(CatalogError::UnterminatedString(line)),
                };
                value.push(decoded);
            }
            Some(c) => value.push(c),
        }
    }

    if !chars.as_str().trim().is_empty() {
        return Err(parse_error(line, "unexpected characters after closing quote"));
    }
    Ok(value)
}
