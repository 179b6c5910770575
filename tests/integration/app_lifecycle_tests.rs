/*!
 * End-to-end runs through the application controller
 */

use std::fs;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use potwai::app_controller::{Controller, create_provider};
use potwai::app_config::{Config, TranslationProvider};
use potwai::catalog::{Catalog, EntryKey};
use potwai::providers::Provider;
use potwai::providers::mock::{MockProvider, MockRequest};
use potwai::ProviderError;

use crate::common::{self, STORE_CATALOG};

#[test]
fn test_controller_withDefaultConfig_shouldBeInitialized() {
    let controller = Controller::new_for_test().unwrap();
    assert!(controller.is_initialized());
}

#[test]
fn test_controller_withInvalidBatchSize_shouldBeRejected() {
    let mut config = Config::default();
    config.translation.common.batch_size = 0;
    assert!(Controller::with_config(config).is_err());
}

#[test]
fn test_createProvider_shouldFollowConfiguredType() {
    let mut config = Config::default().translation;
    assert_eq!(create_provider(&config).name(), "openai");

    config.provider = TranslationProvider::LMStudio;
    assert_eq!(create_provider(&config).name(), "openai");

    config.provider = TranslationProvider::Anthropic;
    assert_eq!(create_provider(&config).name(), "anthropic");
}

#[tokio::test]
async fn test_runWithProvider_withStoreCatalog_shouldWriteOutput() {
    common::init_test_logging();
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "messages.po", STORE_CATALOG).unwrap();
    let output = dir.path().join("messages.nb.po");
    let controller = common::test_controller(dir.path()).unwrap();
    let provider = MockProvider::with_translations(common::store_translations());

    let summary = controller
        .run_with_provider(Arc::new(provider.clone()), input.clone(), Some(output.clone()), false, common::no_cancel())
        .await
        .unwrap();

    assert_eq!(summary.translated, 5);
    assert_eq!(provider.request_count(), 1);

    let written = Catalog::load(&output).unwrap();
    assert_eq!(
        written.find(&EntryKey::from("Accept All")).unwrap().msgstr,
        "Godta alle"
    );
    // the input is left alone
    assert_eq!(fs::read_to_string(&input).unwrap(), STORE_CATALOG);
    // nothing failed, so no log files
    assert!(!controller.config().logs.failed_items_path().exists());
    assert!(!controller.config().logs.placeholder_warnings_path().exists());
}

#[tokio::test]
async fn test_runWithProvider_withoutOutput_shouldUseTargetLanguageSuffix() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "shop.po", &common::generated_catalog(1, 2)).unwrap();
    let controller = common::test_controller(dir.path()).unwrap();

    controller
        .run_with_provider(Arc::new(MockProvider::working()), input, None, false, common::no_cancel())
        .await
        .unwrap();

    let written = Catalog::load(dir.path().join("shop.nb.po")).unwrap();
    assert_eq!(written.entries()[2].msgstr, "[nb] Show product 0");
}

#[tokio::test]
async fn test_runWithProvider_withFailingProvider_shouldLogFailedItems() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "shop.po", &common::generated_catalog(0, 2)).unwrap();
    let output = dir.path().join("out.po");
    let controller = common::test_controller(dir.path()).unwrap();

    let summary = controller
        .run_with_provider(Arc::new(MockProvider::failing()), input, Some(output.clone()), false, common::no_cancel())
        .await
        .unwrap();

    assert_eq!(summary.translated, 0);
    assert_eq!(summary.failed, 2);
    assert!(output.exists());

    let log = fs::read_to_string(controller.config().logs.failed_items_path()).unwrap();
    let records: Vec<serde_json::Value> = log
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["key"], "Show product 0");
    assert_eq!(records[1]["source"], "Show product 1");
}

#[tokio::test]
async fn test_runWithProvider_withDryRun_shouldNotWriteOutput() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "shop.po", &common::generated_catalog(3, 4)).unwrap();
    let output = dir.path().join("out.po");
    let controller = common::test_controller(dir.path()).unwrap();
    let provider = MockProvider::working();

    let summary = controller
        .run_with_provider(Arc::new(provider.clone()), input, Some(output.clone()), true, common::no_cancel())
        .await
        .unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.eligible, 4);
    assert_eq!(provider.request_count(), 0);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_runWithProvider_withMissingInput_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let controller = common::test_controller(dir.path()).unwrap();

    let result = controller
        .run_with_provider(
            Arc::new(MockProvider::working()),
            dir.path().join("missing.po"),
            None,
            false,
            common::no_cancel(),
        )
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_runWithProvider_withCancelFlagSet_shouldWriteUnchangedCatalog() {
    let dir = common::create_temp_dir().unwrap();
    let content = common::generated_catalog(1, 3);
    let input = common::create_test_file(dir.path(), "shop.po", &content).unwrap();
    let output = dir.path().join("out.po");
    let controller = common::test_controller(dir.path()).unwrap();
    let provider = MockProvider::working();

    let summary = controller
        .run_with_provider(
            Arc::new(provider.clone()),
            input,
            Some(output.clone()),
            false,
            Arc::new(AtomicBool::new(true)),
        )
        .await
        .unwrap();

    assert!(summary.cancelled);
    assert_eq!(provider.request_count(), 0);
    assert_eq!(fs::read_to_string(&output).unwrap(), content);
}

#[tokio::test]
async fn test_runWithProvider_withAuthenticationError_shouldAbort() {
    fn unauthorized(_: &MockRequest) -> Result<String, ProviderError> {
        Err(ProviderError::AuthenticationError("invalid api key".to_string()))
    }

    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "shop.po", &common::generated_catalog(0, 2)).unwrap();
    let output = dir.path().join("out.po");
    let controller = common::test_controller(dir.path()).unwrap();

    let result = controller
        .run_with_provider(
            Arc::new(MockProvider::with_custom_response(unauthorized)),
            input,
            Some(output.clone()),
            false,
            common::no_cancel(),
        )
        .await;

    assert!(result.is_err());
    assert!(!output.exists());
}
