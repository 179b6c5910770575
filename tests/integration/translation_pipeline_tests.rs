/*!
 * Pipeline runs against the mock provider
 */

use std::sync::Arc;

use potwai::catalog::{Catalog, EntryKey};
use potwai::errors::ProviderError;
use potwai::providers::mock::{MockProvider, MockRequest};
use potwai::translation::{
    ClientOptions, LanguageClassifier, PipelineContext, RetryPolicy, RunOptions, TranslationClient,
};

use crate::common::{self, STORE_CATALOG};

fn pipeline(provider: &MockProvider, options: RunOptions) -> PipelineContext {
    let client = TranslationClient::new(
        Arc::new(provider.clone()),
        ClientOptions {
            model: "mock-model".to_string(),
            dry_run: options.dry_run,
            ..ClientOptions::default()
        },
    );
    PipelineContext::new(options, client, LanguageClassifier::new("auto", "nb"))
}

fn run_options(batch_size: usize) -> RunOptions {
    RunOptions {
        batch_size,
        retry: RetryPolicy::new(2, 0, 0),
        ..RunOptions::default()
    }
}

/// Batches of several items get garbage, single items get JSON except "Cancel the order"
fn garbage_for_batches(request: &MockRequest) -> Result<String, ProviderError> {
    match request.items.as_slice() {
        [item] if item.text == "Cancel the order" => Ok("Sorry, I cannot help with that.".to_string()),
        [_] => Ok(MockProvider::generate_batch_response(&request.items, &request.target_language)),
        _ => Ok("Here are your translations: Lagre endringer, Avbryt".to_string()),
    }
}

#[tokio::test]
async fn test_run_withStoreCatalog_shouldTranslateOnlyEligibleEntries() {
    common::init_test_logging();
    let provider = MockProvider::with_translations(common::store_translations());
    let mut ctx = pipeline(&provider, run_options(50));
    let mut catalog = Catalog::parse(STORE_CATALOG).unwrap();

    let summary = ctx.run(&mut catalog).await.unwrap();

    assert_eq!(summary.total_entries, 7);
    assert_eq!(summary.eligible, 5);
    assert_eq!(summary.batches, 1);
    assert_eq!(summary.translated, 5);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.placeholder_warnings, 0);
    assert_eq!(provider.request_count(), 1);

    let cookie = catalog.find(&EntryKey::from("Cookie Settings")).unwrap();
    assert_eq!(cookie.msgstr, "Innstillinger for informasjonskapsler");
    assert_eq!(cookie.extracted_comments, vec!["Banner heading"]);
    assert_eq!(cookie.references, vec!["templates/cookie_banner.html:3"]);

    let open = catalog.find(&EntryKey::new(Some("menu"), "Open")).unwrap();
    assert_eq!(open.msgstr, "Åpne");
    assert_eq!(open.msgctxt.as_deref(), Some("menu"));

    assert_eq!(catalog.find(&EntryKey::from("Save")).unwrap().msgstr, "Lagre");
    let plural = catalog.find(&EntryKey::from("%d item")).unwrap();
    assert!(plural.msgstr_plural.iter().all(String::is_empty));
}

#[tokio::test]
async fn test_run_withStoreCatalog_shouldKeepUntouchedEntriesByteIdentical() {
    let provider = MockProvider::with_translations(common::store_translations());
    let mut ctx = pipeline(&provider, run_options(50));
    let mut catalog = Catalog::parse(STORE_CATALOG).unwrap();

    ctx.run(&mut catalog).await.unwrap();
    let output = catalog.to_po_string();

    for block in [
        "# Storefront translations.\n# Copyright (C) 2024 Example Shop\nmsgid \"\"\nmsgstr \"\"\n\"Project-Id-Version: shop 1.0\\n\"\n",
        "#. Banner heading\n#: templates/cookie_banner.html:3\nmsgid \"Cookie Settings\"\n",
        "#: templates/cookie_banner.html:9\n#, fuzzy\nmsgid \"Accept All\"\n",
        "msgid \"Save\"\nmsgstr \"Lagre\"\n",
        "msgid \"%d item\"\nmsgid_plural \"%d items\"\nmsgstr[0] \"\"\nmsgstr[1] \"\"\n",
        "#~ msgid \"Old banner\"\n#~ msgstr \"\"\n",
    ] {
        assert!(output.contains(block), "missing block:\n{}\nin output:\n{}", block, output);
    }
}

#[tokio::test]
async fn test_run_withMalformedBatchResponse_shouldFallBackPerItem() {
    let content = "msgid \"Save changes\"\nmsgstr \"\"\n\nmsgid \"Cancel the order\"\nmsgstr \"\"\n\nmsgid \"Delete your account\"\nmsgstr \"\"\n";
    let provider = MockProvider::with_custom_response(garbage_for_batches);
    let mut ctx = pipeline(&provider, run_options(3));
    let mut catalog = Catalog::parse(content).unwrap();

    let summary = ctx.run(&mut catalog).await.unwrap();

    assert_eq!(summary.eligible, 3);
    assert_eq!(summary.translated, 2);
    assert_eq!(summary.failed, 1);
    // 3 batch attempts, then 1 call for each good item and 3 for the bad one
    assert_eq!(provider.request_count(), 8);

    assert_eq!(catalog.entries()[0].msgstr, "[nb] Save changes");
    assert_eq!(catalog.entries()[1].msgstr, "");
    assert_eq!(catalog.entries()[2].msgstr, "[nb] Delete your account");

    let failures = ctx.diagnostics().failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].key, EntryKey::from("Cancel the order"));
    assert_eq!(failures[0].source, "Cancel the order");
    assert_eq!(ctx.diagnostics().unparsable_responses().len(), 6);
}

#[tokio::test]
async fn test_run_withDryRun_shouldCountWithoutCalling() {
    let content = common::generated_catalog(20, 30);
    let provider = MockProvider::working();
    let mut ctx = pipeline(
        &provider,
        RunOptions {
            dry_run: true,
            ..run_options(8)
        },
    );
    let mut catalog = Catalog::parse(&content).unwrap();

    let summary = ctx.run(&mut catalog).await.unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.total_entries, 50);
    assert_eq!(summary.eligible, 30);
    assert_eq!(summary.batches, 4);
    assert!(summary.estimated_prompt_tokens > 0);
    assert_eq!(summary.translated, 0);
    assert_eq!(provider.request_count(), 0);
    assert_eq!(catalog.to_po_string(), content);
}

#[tokio::test]
async fn test_run_onOwnOutput_shouldFindNothingToDo() {
    let provider = MockProvider::with_translations(common::store_translations());
    let mut catalog = Catalog::parse(STORE_CATALOG).unwrap();
    pipeline(&provider, run_options(50)).run(&mut catalog).await.unwrap();
    let first_output = catalog.to_po_string();

    let second_provider = MockProvider::working();
    let mut again = Catalog::parse(&first_output).unwrap();
    let summary = pipeline(&second_provider, run_options(50))
        .run(&mut again)
        .await
        .unwrap();

    assert_eq!(summary.eligible, 0);
    assert_eq!(second_provider.request_count(), 0);
    assert_eq!(again.to_po_string(), first_output);
}

#[tokio::test]
async fn test_run_withUnlistedNorwegianMsgstr_shouldLeaveItAlone() {
    let content = "msgid \"Shopping cart\"\nmsgstr \"Handlevogn\"\n\nmsgid \"Shipping\"\nmsgstr \"Frakt\"\n\nmsgid \"Payment\"\nmsgstr \"Betaling\"\n";
    let provider = MockProvider::working();
    let mut catalog = Catalog::parse(content).unwrap();

    let summary = pipeline(&provider, run_options(50)).run(&mut catalog).await.unwrap();

    assert_eq!(summary.eligible, 0);
    assert_eq!(provider.request_count(), 0);
    assert_eq!(catalog.to_po_string(), content);
}

#[tokio::test]
async fn test_run_withForce_shouldRetranslateExistingMsgstr() {
    let content = common::generated_catalog(2, 1);
    let provider = MockProvider::working();
    let mut ctx = pipeline(
        &provider,
        RunOptions {
            force: true,
            ..run_options(50)
        },
    );
    let mut catalog = Catalog::parse(&content).unwrap();

    let summary = ctx.run(&mut catalog).await.unwrap();

    assert_eq!(summary.eligible, 3);
    let sent: Vec<String> = provider.requests()[0].items.iter().map(|i| i.text.clone()).collect();
    assert_eq!(sent, vec!["Lagre produkt 0", "Lagre produkt 1", "Show product 0"]);
    assert_eq!(catalog.entries()[1].msgstr, "[nb] Lagre produkt 0");
}
