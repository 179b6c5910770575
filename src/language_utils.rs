//! Language utilities for ISO language code handling
//!
//! Catalogs carry POSIX-style locale tags (`nb_NO`, `pt_BR.UTF-8`, `sr@latin`),
//! while prompts and the classifier work on ISO 639-1 codes. The helpers here
//! reduce a tag to its language part and validate it against ISO 639.

use anyhow::{Result, anyhow};
use isolang::Language;

/// Source-language hint that asks the classifier to infer the language
pub const AUTO: &str = "auto";

/// Whether a source-language hint requests detection
pub fn is_auto(code: &str) -> bool {
    code.trim().eq_ignore_ascii_case(AUTO)
}

/// Strip region, encoding and modifier from a locale tag
///
/// `nb_NO.UTF-8@euro` becomes `nb`, `pt-BR` becomes `pt`.
pub fn language_part(tag: &str) -> String {
    tag.trim()
        .split(['_', '-', '.', '@'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

fn lookup(code: &str) -> Option<Language> {
    let code = language_part(code);
    match code.len() {
        2 => Language::from_639_1(&code),
        3 => Language::from_639_3(&code).or_else(|| {
            // ISO 639-2/B codes that differ from 639-2/T
            let part2t = match code.as_str() {
                "fre" => "fra",
                "ger" => "deu",
                "dut" => "nld",
                "gre" => "ell",
                "chi" => "zho",
                "cze" => "ces",
                "ice" => "isl",
                "rum" => "ron",
                "slo" => "slk",
                _ => return None,
            };
            Language::from_639_3(part2t)
        }),
        _ => None,
    }
}

/// Validate a language code or locale tag
pub fn validate_language_code(code: &str) -> Result<()> {
    lookup(code)
        .map(|_| ())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Normalize a code or locale tag to ISO 639-1 if possible, else ISO 639-3
pub fn normalize_to_part1_or_part3(code: &str) -> Result<String> {
    let lang = lookup(code).ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;
    Ok(match lang.to_639_1() {
        Some(part1) => part1.to_string(),
        None => lang.to_639_3().to_string(),
    })
}

/// Check if two codes represent the same language
///
/// The Norwegian macrolanguage `no` is treated as Bokmål.
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    let canonical = |code: &str| {
        normalize_to_part1_or_part3(code).ok().map(|c| match c.as_str() {
            "no" | "nob" => "nb".to_string(),
            _ => c,
        })
    };
    match (canonical(code1), canonical(code2)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let lang = lookup(code).ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;
    Ok(lang.to_name().to_string())
}
