/*!
 * Common test utilities for the potwai test suite
 */

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tempfile::TempDir;

use potwai::app_config::{Config, LogConfig};
use potwai::app_controller::Controller;

/// A storefront catalog with one entry of every kind the parser knows
pub const STORE_CATALOG: &str = r#"# Storefront translations.
# Copyright (C) 2024 Example Shop
msgid ""
msgstr ""
"Project-Id-Version: shop 1.0\n"
"Language: nb_NO\n"
"Content-Type: text/plain; charset=UTF-8\n"
"Plural-Forms: nplurals=2; plural=(n != 1);\n"

#. Banner heading
#: templates/cookie_banner.html:3
msgid "Cookie Settings"
msgstr ""

#: templates/cookie_banner.html:9
#, fuzzy
msgid "Accept All"
msgstr ""

#, c-format
msgid "Hello %s, you have %d new messages"
msgstr ""

msgctxt "menu"
msgid "Open"
msgstr ""

msgid "Save"
msgstr "Lagre"

msgid "Terms"
msgstr ""
"Read our <a href=\"https://example.com/terms\">terms</a> "
"before you order."

msgid "%d item"
msgid_plural "%d items"
msgstr[0] ""
msgstr[1] ""

#~ msgid "Old banner"
#~ msgstr ""
"#;

/// Norwegian answers for the translatable entries of `STORE_CATALOG`
pub fn store_translations() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Cookie Settings", "Innstillinger for informasjonskapsler"),
        ("Accept All", "Godta alle"),
        ("Hello %s, you have %d new messages", "Hei %s, du har %d nye meldinger"),
        ("menu\u{4}Open", "Åpne"),
        (
            "Terms",
            "Les <a href=\"https://example.com/terms\">vilkårene</a> våre før du bestiller.",
        ),
    ]
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Catalog with `translated` Norwegian entries followed by `untranslated` English ones
pub fn generated_catalog(translated: usize, untranslated: usize) -> String {
    let mut content = String::from("msgid \"\"\nmsgstr \"\"\n\"Language: nb\\n\"\n");
    for n in 0..translated {
        content.push_str(&format!("\nmsgid \"Save product {n}\"\nmsgstr \"Lagre produkt {n}\"\n"));
    }
    for n in 0..untranslated {
        content.push_str(&format!("\nmsgid \"Show product {n}\"\nmsgstr \"\"\n"));
    }
    content
}

/// Default config writing its logs into `dir`, without retry waits
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.logs = LogConfig::in_directory(dir.join("logs"));
    config.translation.common.retry_count = 2;
    config.translation.common.retry_backoff_ms = 0;
    config.translation.common.max_backoff_ms = 0;
    config
}

/// Controller for `test_config(dir)`
pub fn test_controller(dir: &Path) -> Result<Controller> {
    Controller::with_config(test_config(dir))
}

/// A cancellation flag that is never set
pub fn no_cancel() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(false))
}

/// Install a test logger; repeated calls are ignored
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
