/*!
 * Tests for application configuration
 */

use std::fs;
use std::path::PathBuf;

use potwai::app_config::{Config, LogLevel, TranslationProvider};
use potwai::translation::ForceSource;

use crate::common;

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config.target_language, "nb");
    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["translation"]["common"]["batch_size"], 50);
    assert_eq!(written["translation"]["common"]["force_source"], "prefer-msgstr");
    assert_eq!(written["logs"]["failed_items"], "failed_items.log");
    assert_eq!(written["log_level"], "info");
}

#[test]
fn test_loadOrCreate_withExistingFile_shouldReadIt() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{
            "source_language": "en",
            "target_language": "sv",
            "translation": {
                "provider": "lmstudio",
                "available_providers": [
                    {"type": "lmstudio", "model": "qwen2.5-7b-instruct", "endpoint": "http://127.0.0.1:1234/v1"}
                ],
                "common": {"batch_size": 20, "mark_fuzzy": true, "force_source": "msgid"}
            },
            "logs": {"directory": "diagnostics"},
            "log_level": "debug"
        }"#,
    )
    .unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.translation.provider, TranslationProvider::LMStudio);
    assert_eq!(config.translation.get_model(), "qwen2.5-7b-instruct");
    assert_eq!(config.translation.get_endpoint(), "http://127.0.0.1:1234/v1");
    assert_eq!(config.translation.get_timeout_secs(), 120);
    assert_eq!(config.translation.common.batch_size, 20);
    assert!(config.translation.common.mark_fuzzy);
    assert_eq!(config.translation.common.force_source, ForceSource::Msgid);
    assert_eq!(config.logs.placeholder_warnings_path(), PathBuf::from("diagnostics/placeholder_warnings.log"));
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
    assert!(config.validate_credentials().is_ok());
}

#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json").unwrap();

    assert!(Config::load_or_create(&path).is_err());
}

#[test]
fn test_validate_withBadEndpoint_shouldFail() {
    let mut config = Config::default();
    config.translation.get_active_provider_config_mut().unwrap().endpoint = "not a url".to_string();

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withLocaleTags_shouldAcceptThem() {
    let mut config = Config::default();
    config.source_language = "en_US".to_string();
    config.target_language = "nb-NO".to_string();

    assert!(config.validate().is_ok());
}

#[test]
fn test_providerFromStr_shouldParseKnownNames() {
    assert_eq!("OpenAI".parse::<TranslationProvider>().unwrap(), TranslationProvider::OpenAI);
    assert_eq!("anthropic".parse::<TranslationProvider>().unwrap(), TranslationProvider::Anthropic);
    assert!("ollama".parse::<TranslationProvider>().is_err());
    assert_eq!(TranslationProvider::LMStudio.to_string(), "lmstudio");
}
