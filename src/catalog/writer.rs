/*!
 * Serialization of catalogs back to `.po` text.
 *
 * Entries that were parsed and never modified are emitted from their raw
 * source lines. Modified entries only get their msgstr lines (and the flag
 * line, if flags changed) re-rendered; everything else stays as it was read.
 */

use super::model::{Catalog, CatalogEntry};

/// Render the whole catalog
pub(crate) fn write_catalog(catalog: &Catalog) -> String {
    let mut output = String::new();

    for entry in &catalog.entries {
        if entry.source.lines.is_empty() {
            if !output.is_empty() && !output.ends_with("\n\n") {
                output.push('\n');
            }
            output.push_str(&render_fresh(entry));
        } else if entry.is_modified() {
            for line in patch_entry(entry) {
                output.push_str(&line);
            }
        } else {
            for line in &entry.source.lines {
                output.push_str(line);
            }
        }
    }

    output.push_str(&catalog.trailing);
    output
}

/// Line terminator used by the entry's source text
fn entry_eol(entry: &CatalogEntry) -> &'static str {
    match entry.source.lines.first() {
        Some(line) if line.ends_with("\r\n") => "\r\n",
        _ => "\n",
    }
}

fn patch_entry(entry: &CatalogEntry) -> Vec<String> {
    let eol = entry_eol(entry);
    let mut lines = entry.source.lines.clone();

    if entry.msgstr_dirty {
        if let Some(span) = entry.source.msgstr_span.clone() {
            let mut rendered = render_field("msgstr", &entry.msgstr, eol);
            let ends_file_without_newline = span.end == lines.len()
                && lines.last().is_some_and(|l| !l.ends_with('\n'));
            if ends_file_without_newline {
                if let Some(last) = rendered.last_mut() {
                    let trimmed = last.trim_end_matches(['\r', '\n']).len();
                    last.truncate(trimmed);
                }
            }
            lines.splice(span, rendered);
        }
    }

    if entry.flags_dirty {
        let flags_line = format!("#, {}{}", entry.flags.join(", "), eol);
        match (entry.source.flags_line, entry.source.first_keyword_line) {
            (Some(index), keyword_line) => {
                // all flags now live on the first flag line
                let end = keyword_line.unwrap_or(lines.len()).min(lines.len());
                for extra in (index + 1..end).rev() {
                    if lines[extra].starts_with("#,") {
                        lines.remove(extra);
                    }
                }
                lines[index] = flags_line;
            }
            (None, Some(index)) => lines.insert(index, flags_line),
            (None, None) => lines.push(flags_line),
        }
    }

    lines
}

/// Render an entry that has no source lines
fn render_fresh(entry: &CatalogEntry) -> String {
    let eol = "\n";
    let prefix = if entry.obsolete { "#~ " } else { "" };
    let mut lines: Vec<String> = Vec::new();

    for comment in &entry.translator_comments {
        if comment.is_empty() {
            lines.push(format!("#{}", eol));
        } else {
            lines.push(format!("# {}{}", comment, eol));
        }
    }
    for comment in &entry.extracted_comments {
        lines.push(format!("#. {}{}", comment, eol));
    }
    if !entry.references.is_empty() {
        lines.push(format!("#: {}{}", entry.references.join(" "), eol));
    }
    if !entry.flags.is_empty() {
        lines.push(format!("#, {}{}", entry.flags.join(", "), eol));
    }
    if let Some(previous) = &entry.previous_msgid {
        lines.push(format!("#| msgid \"{}\"{}", escape(previous), eol));
    }

    let mut fields = Vec::new();
    if let Some(ctx) = &entry.msgctxt {
        fields.extend(render_field("msgctxt", ctx, eol));
    }
    fields.extend(render_field("msgid", &entry.msgid, eol));
    if let Some(plural) = &entry.msgid_plural {
        fields.extend(render_field("msgid_plural", plural, eol));
        for (n, form) in entry.msgstr_plural.iter().enumerate() {
            fields.extend(render_field(&format!("msgstr[{}]", n), form, eol));
        }
    } else {
        fields.extend(render_field("msgstr", &entry.msgstr, eol));
    }
    lines.extend(fields.into_iter().map(|l| format!("{}{}", prefix, l)));

    lines.concat()
}

/// Render `keyword "value"`, splitting multi-line values after each `\n`
pub(crate) fn render_field(keyword: &str, value: &str, eol: &str) -> Vec<String> {
    let segments: Vec<&str> = value.split_inclusive('\n').collect();
    if segments.len() <= 1 {
        return vec![format!("{} \"{}\"{}", keyword, escape(value), eol)];
    }

    let mut lines = Vec::with_capacity(segments.len() + 1);
    lines.push(format!("{} \"\"{}", keyword, eol));
    for segment in segments {
        lines.push(format!("\"{}\"{}", escape(segment), eol));
    }
    lines
}

/// Encode a value as the body of a C-style quoted string
pub(crate) fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            '\u{7}' => escaped.push_str("\\a"),
            '\u{8}' => escaped.push_str("\\b"),
            '\u{c}' => escaped.push_str("\\f"),
            '\u{b}' => escaped.push_str("\\v"),
            other => escaped.push(other),
        }
    }
    escaped
}
