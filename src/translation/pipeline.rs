/*!
 * Translation pipeline.
 *
 * `PipelineContext` bundles everything one run needs. It is created by the
 * caller, used for a single catalog and then consumed for its diagnostics.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use log::{debug, info, warn};
use serde::Serialize;

use super::batch::Batcher;
use super::classifier::LanguageClassifier;
use super::client::TranslationClient;
use super::controller::{BatchOutcome, RetryController, RetryPolicy};
use super::diagnostics::Diagnostics;
use super::selection::{ForceSource, SelectionPolicy, WorkItem, WorkItemSelector};
use crate::catalog::Catalog;
use crate::validation::PlaceholderValidator;

/// Per-run behaviour switches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    pub batch_size: usize,
    pub force: bool,
    pub force_source: ForceSource,
    pub mark_fuzzy: bool,
    pub dry_run: bool,
    pub retry: RetryPolicy,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            batch_size: 50,
            force: false,
            force_source: ForceSource::default(),
            mark_fuzzy: false,
            dry_run: false,
            retry: RetryPolicy::default(),
        }
    }
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_entries: usize,
    pub eligible: usize,
    pub batches: usize,
    pub provider_calls: usize,
    pub translated: usize,
    pub failed: usize,
    pub placeholder_warnings: usize,
    pub dry_run: bool,
    pub cancelled: bool,
    pub estimated_prompt_tokens: usize,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Progress after a processed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub batch_id: usize,
    pub batches: usize,
    pub processed_items: usize,
    pub eligible: usize,
}

pub type ProgressCallback = Box<dyn FnMut(&Progress) + Send>;

/// State and collaborators of a single run
pub struct PipelineContext {
    options: RunOptions,
    client: TranslationClient,
    classifier: LanguageClassifier,
    diagnostics: Diagnostics,
    cancel: Arc<AtomicBool>,
    progress: Option<ProgressCallback>,
}

impl PipelineContext {
    pub fn new(options: RunOptions, client: TranslationClient, classifier: LanguageClassifier) -> Self {
        Self {
            options,
            client,
            classifier,
            diagnostics: Diagnostics::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            progress: None,
        }
    }

    /// Use an externally owned cancellation flag
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn client(&self) -> &TranslationClient {
        &self.client
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Work items the run would translate
    pub fn select(&self, catalog: &Catalog) -> Vec<WorkItem> {
        let policy = SelectionPolicy {
            force: self.options.force,
            force_source: self.options.force_source,
        };
        WorkItemSelector::new(&self.classifier, policy).select(catalog)
    }

    /// Translate the catalog in place
    ///
    /// Batches are processed one at a time in catalog order. The cancellation
    /// flag is checked before each batch; translations applied so far stay in
    /// the catalog.
    pub async fn run(&mut self, catalog: &mut Catalog) -> Result<RunSummary> {
        let batcher = Batcher::new(self.options.batch_size)?;
        let items = self.select(catalog);

        let mut summary = RunSummary {
            total_entries: catalog.messages().count(),
            eligible: items.len(),
            batches: batcher.batch_count(items.len()),
            dry_run: self.options.dry_run,
            ..RunSummary::default()
        };
        info!(
            "{} of {} entries need translation ({} batches of up to {})",
            summary.eligible,
            summary.total_entries,
            summary.batches,
            batcher.batch_size()
        );

        let batches = batcher.partition(items);

        if self.options.dry_run {
            summary.estimated_prompt_tokens = batches
                .iter()
                .map(|batch| self.client.estimate_prompt_tokens(&batch.items))
                .sum();
            info!(
                "Dry run: would send {} requests, about {} prompt tokens",
                summary.batches,
                summary.estimated_prompt_tokens
            );
            return Ok(summary);
        }

        let controller = RetryController::new(&self.client, self.options.retry);
        let mut processed_items = 0;

        for batch in &batches {
            if self.cancel.load(Ordering::SeqCst) {
                warn!("Cancelled before batch {} of {}", batch.id, summary.batches);
                summary.cancelled = true;
                break;
            }

            debug!("Processing batch {}/{} ({} items)", batch.id, summary.batches, batch.len());
            let outcome = controller.process(batch, &mut self.diagnostics).await?;
            apply_outcome(
                catalog,
                &batch.items,
                &outcome,
                self.options.mark_fuzzy,
                &mut self.diagnostics,
                &mut summary,
            );

            processed_items += batch.len();
            if let Some(callback) = self.progress.as_mut() {
                callback(&Progress {
                    batch_id: batch.id,
                    batches: summary.batches,
                    processed_items,
                    eligible: summary.eligible,
                });
            }
        }

        summary.provider_calls = self.client.call_count();
        (summary.prompt_tokens, summary.completion_tokens) = self.client.token_usage();
        info!(
            "Translated {} entries, {} failed, {} placeholder warnings, {} requests to {} ({} prompt / {} completion tokens)",
            summary.translated,
            summary.failed,
            summary.placeholder_warnings,
            summary.provider_calls,
            self.client.provider_name(),
            summary.prompt_tokens,
            summary.completion_tokens
        );
        Ok(summary)
    }
}

/// Write accepted translations into the catalog and count them
fn apply_outcome(
    catalog: &mut Catalog,
    items: &[WorkItem],
    outcome: &BatchOutcome,
    mark_fuzzy: bool,
    diagnostics: &mut Diagnostics,
    summary: &mut RunSummary,
) {
    for item in items {
        let Some(translation) = outcome.translations.get(&item.key) else {
            continue;
        };

        let report = PlaceholderValidator::validate(&item.text, translation);
        if !report.passed {
            diagnostics.record_placeholder_warning(&item.key, &report, &item.text, translation);
            summary.placeholder_warnings += 1;
        }

        if catalog.set_translation(item.index, translation.to_string(), mark_fuzzy) {
            summary.translated += 1;
        }
    }
    summary.failed += outcome.failed.len();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockProvider;
    use crate::translation::client::ClientOptions;
    use std::sync::Mutex;

    const CATALOG: &str = r#"msgid ""
msgstr ""
"Language: nb\n"

msgid "Save changes"
msgstr ""

msgid "Cancel the order"
msgstr ""

msgid "Hello %s, you have %d new messages"
msgstr ""
"#;

    fn context(provider: &MockProvider, options: RunOptions) -> PipelineContext {
        let client = TranslationClient::new(
            Arc::new(provider.clone()),
            ClientOptions {
                dry_run: options.dry_run,
                ..ClientOptions::default()
            },
        );
        PipelineContext::new(options, client, LanguageClassifier::new("auto", "nb"))
    }

    fn options(batch_size: usize) -> RunOptions {
        RunOptions {
            batch_size,
            retry: RetryPolicy::new(1, 0, 0),
            ..RunOptions::default()
        }
    }

    #[tokio::test]
    async fn test_run_shouldTranslateAndReportProgress() {
        let provider = MockProvider::working();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut ctx = context(&provider, options(2)).with_progress(Box::new(move |p| {
            sink.lock().unwrap().push(p.processed_items);
        }));
        let mut catalog = Catalog::parse(CATALOG).unwrap();

        let summary = ctx.run(&mut catalog).await.unwrap();

        assert_eq!(summary.eligible, 3);
        assert_eq!(summary.batches, 2);
        assert_eq!(summary.translated, 3);
        assert_eq!(summary.provider_calls, 2);
        assert_eq!(*seen.lock().unwrap(), vec![2, 3]);
        assert_eq!(catalog.entries()[1].msgstr, "[nb] Save changes");
        assert!(summary.prompt_tokens > 0);
        assert!(summary.completion_tokens > 0);
        assert_eq!(ctx.diagnostics().placeholder_warnings().len(), 0);
    }

    #[tokio::test]
    async fn test_run_withDroppedPlaceholder_shouldWarnButApply() {
        let provider = MockProvider::with_translations([
            ("Save changes", "Lagre endringer"),
            ("Cancel the order", "Avbryt bestillingen"),
            ("Hello %s, you have %d new messages", "Hei %s, du har nye meldinger"),
        ]);
        let mut ctx = context(&provider, options(10));
        let mut catalog = Catalog::parse(CATALOG).unwrap();

        let summary = ctx.run(&mut catalog).await.unwrap();

        assert_eq!(summary.placeholder_warnings, 1);
        assert_eq!(ctx.diagnostics().placeholder_warnings()[0].missing, vec!["%d"]);
        assert_eq!(catalog.entries()[3].msgstr, "Hei %s, du har nye meldinger");
    }

    #[tokio::test]
    async fn test_run_withCancelFlagSet_shouldStopBeforeFirstBatch() {
        let provider = MockProvider::working();
        let cancel = Arc::new(AtomicBool::new(true));
        let mut ctx = context(&provider, options(1)).with_cancel_flag(cancel);
        let mut catalog = Catalog::parse(CATALOG).unwrap();

        let summary = ctx.run(&mut catalog).await.unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.translated, 0);
        assert_eq!(provider.request_count(), 0);
    }

    #[tokio::test]
    async fn test_run_withMarkFuzzy_shouldFlagTranslatedEntries() {
        let provider = MockProvider::working();
        let mut ctx = context(
            &provider,
            RunOptions {
                mark_fuzzy: true,
                ..options(10)
            },
        );
        let mut catalog = Catalog::parse(CATALOG).unwrap();

        ctx.run(&mut catalog).await.unwrap();

        assert!(catalog.entries()[1].is_fuzzy());
        assert!(catalog.to_po_string().contains("#, fuzzy\nmsgid \"Save changes\""));
    }

    #[tokio::test]
    async fn test_run_withZeroBatchSize_shouldFail() {
        let provider = MockProvider::working();
        let mut ctx = context(&provider, options(0));
        let mut catalog = Catalog::parse(CATALOG).unwrap();

        assert!(ctx.run(&mut catalog).await.is_err());
    }
}
