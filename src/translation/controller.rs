/*!
 * Retry and fallback controller.
 *
 * Each batch is driven through an explicit state machine:
 *
 * ```text
 * Pending -> BatchSent -> BatchSuccess
 *                 |
 *                 v
 *            BatchFailed -> Retrying -> BatchSent ...
 *                 |
 *                 v  (retries exhausted or error not retryable)
 *          PerItemFallback -> (each item: Sent -> Failed -> Retrying ...) -> ItemFailed
 * ```
 *
 * Items missing from an otherwise readable batch answer go straight to the
 * per-item fallback. Authentication failures abort the run.
 */

use std::slice;
use std::time::Duration;

use log::{debug, warn};

use super::batch::TranslationBatch;
use super::client::TranslationClient;
use super::diagnostics::Diagnostics;
use super::response::TranslationResult;
use super::selection::WorkItem;
use crate::app_config::TranslationCommonConfig;
use crate::catalog::EntryKey;
use crate::errors::TranslationError;

/// Longest wait accepted from a provider's Retry-After
pub const MAX_RETRY_AFTER_SECS: u64 = 300;

/// Bounded retry policy with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub retry_count: u32,
    /// Wait before the first retry, doubled for each further retry
    pub backoff_ms: u64,
    /// Cap for the computed wait
    pub max_backoff_ms: u64,
}

impl RetryPolicy {
    pub fn new(retry_count: u32, backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            retry_count,
            backoff_ms,
            max_backoff_ms,
        }
    }

    pub fn from_config(common: &TranslationCommonConfig) -> Self {
        Self::new(common.retry_count, common.retry_backoff_ms, common.max_backoff_ms)
    }

    /// Total attempts per request group
    pub fn max_attempts(&self) -> u32 {
        self.retry_count + 1
    }

    /// Wait before retry number `retry` (1-based)
    ///
    /// `backoff_ms * 2^(retry-1)` capped at `max_backoff_ms`, then raised to
    /// the provider's Retry-After when it asks for longer. Retry-After is
    /// honoured up to `MAX_RETRY_AFTER_SECS`.
    pub fn backoff(&self, retry: u32, retry_after_secs: Option<u64>) -> Duration {
        let factor = 1u64.checked_shl(retry.saturating_sub(1)).unwrap_or(u64::MAX);
        let computed = self.backoff_ms.saturating_mul(factor).min(self.max_backoff_ms);
        let requested = retry_after_secs.map_or(0, |secs| secs.min(MAX_RETRY_AFTER_SECS) * 1000);
        Duration::from_millis(computed.max(requested))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&TranslationCommonConfig::default())
    }
}

/// States visited while processing a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    Pending,
    BatchSent { attempt: u32 },
    BatchSuccess,
    BatchFailed { attempt: u32 },
    Retrying { attempt: u32 },
    PerItemFallback,
    ItemFailed,
}

/// Result of processing one batch
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub batch_id: usize,
    /// Accepted translations, from the batch answer and the fallback
    pub translations: TranslationResult,
    /// Items left untranslated
    pub failed: Vec<EntryKey>,
    /// Every state the controller went through, in order
    pub trail: Vec<ControllerState>,
}

impl BatchOutcome {
    fn new(batch_id: usize) -> Self {
        Self {
            batch_id,
            ..Self::default()
        }
    }

    pub fn used_fallback(&self) -> bool {
        self.trail.contains(&ControllerState::PerItemFallback)
    }
}

/// Outcome of a single provider attempt
enum AttemptOutcome {
    Success(TranslationResult),
    /// Resending may help
    Transient(TranslationError),
    /// Resending the same request will not help
    Rejected(TranslationError),
    Fatal(TranslationError),
}

impl AttemptOutcome {
    fn classify(result: Result<TranslationResult, TranslationError>, items: &[WorkItem]) -> Self {
        match result {
            Ok(result) if result.is_empty() => Self::Transient(TranslationError::MissingTranslation(
                items.first().map(|i| i.key.to_string()).unwrap_or_default(),
            )),
            Ok(result) => Self::Success(result),
            Err(e) if e.is_fatal() => Self::Fatal(e),
            Err(e) if e.is_retryable() => Self::Transient(e),
            Err(e) => Self::Rejected(e),
        }
    }
}

/// Internal step of one request group; carries what the public state omits
enum Step {
    Sent { attempt: u32 },
    Failed { attempt: u32, error: TranslationError, retryable: bool },
    Retrying { attempt: u32, retry_after_secs: Option<u64> },
}

impl Step {
    fn state(&self) -> ControllerState {
        match self {
            Self::Sent { attempt } => ControllerState::BatchSent { attempt: *attempt },
            Self::Failed { attempt, .. } => ControllerState::BatchFailed { attempt: *attempt },
            Self::Retrying { attempt, .. } => ControllerState::Retrying { attempt: *attempt },
        }
    }
}

/// How a request group ended
enum GroupResult {
    Answered(TranslationResult),
    Exhausted(TranslationError),
}

/// Drives batches through retries and the per-item fallback
pub struct RetryController<'a> {
    client: &'a TranslationClient,
    policy: RetryPolicy,
}

impl<'a> RetryController<'a> {
    pub fn new(client: &'a TranslationClient, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Process one batch to its terminal states
    ///
    /// Returns an error only for fatal failures; everything else ends up in
    /// the outcome as translations or failed items.
    pub async fn process(
        &self,
        batch: &TranslationBatch,
        diagnostics: &mut Diagnostics,
    ) -> Result<BatchOutcome, TranslationError> {
        let mut outcome = BatchOutcome::new(batch.id);
        outcome.trail.push(ControllerState::Pending);

        let pending: Vec<&WorkItem> = match self.drive(batch.id, &batch.items, &mut outcome.trail, diagnostics).await? {
            GroupResult::Answered(result) => {
                let missing = result.missing(&batch.items);
                outcome.translations.extend(result);
                if !missing.is_empty() {
                    warn!(
                        "Batch {}: {} of {} items missing from the response",
                        batch.id,
                        missing.len(),
                        batch.len()
                    );
                }
                missing
            }
            GroupResult::Exhausted(error) if batch.len() == 1 => {
                // a lone item has already had its own retries
                outcome.trail.push(ControllerState::ItemFailed);
                let item = &batch.items[0];
                diagnostics.record_failure(&item.key, batch.id, &item.text, &error);
                outcome.failed.push(item.key.clone());
                return Ok(outcome);
            }
            GroupResult::Exhausted(error) => {
                warn!("Batch {} failed ({}), falling back to single items", batch.id, error);
                batch.items.iter().collect()
            }
        };

        if pending.is_empty() {
            outcome.trail.push(ControllerState::BatchSuccess);
            return Ok(outcome);
        }

        outcome.trail.push(ControllerState::PerItemFallback);
        for item in pending {
            let result = self
                .drive(batch.id, slice::from_ref(item), &mut outcome.trail, diagnostics)
                .await?;
            match result {
                GroupResult::Answered(result) => outcome.translations.extend(result),
                GroupResult::Exhausted(error) => {
                    outcome.trail.push(ControllerState::ItemFailed);
                    diagnostics.record_failure(&item.key, batch.id, &item.text, &error);
                    outcome.failed.push(item.key.clone());
                }
            }
        }

        debug!(
            "Batch {} finished: {} translated, {} failed",
            batch.id,
            outcome.translations.len(),
            outcome.failed.len()
        );
        Ok(outcome)
    }

    /// Send one request group until it is answered or out of attempts
    async fn drive(
        &self,
        batch_id: usize,
        items: &[WorkItem],
        trail: &mut Vec<ControllerState>,
        diagnostics: &mut Diagnostics,
    ) -> Result<GroupResult, TranslationError> {
        let mut step = Step::Sent { attempt: 1 };

        loop {
            trail.push(step.state());
            step = match step {
                Step::Sent { attempt } => {
                    let result = self.client.translate(batch_id, items, diagnostics).await;
                    match AttemptOutcome::classify(result, items) {
                        AttemptOutcome::Success(result) => return Ok(GroupResult::Answered(result)),
                        AttemptOutcome::Fatal(error) => return Err(error),
                        AttemptOutcome::Transient(error) => Step::Failed { attempt, error, retryable: true },
                        AttemptOutcome::Rejected(error) => Step::Failed { attempt, error, retryable: false },
                    }
                }
                Step::Failed { attempt, error, retryable } => {
                    if !retryable || attempt >= self.policy.max_attempts() {
                        return Ok(GroupResult::Exhausted(error));
                    }
                    warn!(
                        "Batch {} attempt {}/{} failed: {}",
                        batch_id,
                        attempt,
                        self.policy.max_attempts(),
                        error
                    );
                    Step::Retrying {
                        attempt: attempt + 1,
                        retry_after_secs: error.retry_after_secs(),
                    }
                }
                Step::Retrying { attempt, retry_after_secs } => {
                    let wait = self.policy.backoff(attempt - 1, retry_after_secs);
                    if !wait.is_zero() {
                        debug!("Waiting {:?} before attempt {}", wait, attempt);
                        tokio::time::sleep(wait).await;
                    }
                    Step::Sent { attempt }
                }
            };
        }
    }
}
