/*!
 * Catalog translation using AI providers.
 *
 * The submodules follow the order in which a run uses them:
 *
 * - `classifier`: per-entry source language detection
 * - `selection`: choosing the entries and fields to translate
 * - `batch`: fixed-size batching of work items
 * - `prompts`: request templates and few-shot examples
 * - `client`: provider requests and response parsing (`response`)
 * - `controller`: retries and per-item fallback
 * - `diagnostics`: failure, placeholder and raw-response logs
 * - `pipeline`: the run itself
 */

// Re-export main types for easier usage
pub use self::batch::{Batcher, TranslationBatch};
pub use self::classifier::{Classification, Detection, LanguageClassifier};
pub use self::client::{ClientOptions, TranslationClient};
pub use self::controller::{BatchOutcome, ControllerState, RetryController, RetryPolicy};
pub use self::diagnostics::{Diagnostics, FailureRecord, PlaceholderWarning, UnparsableResponse};
pub use self::pipeline::{PipelineContext, Progress, ProgressCallback, RunOptions, RunSummary};
pub use self::response::{TranslationResult, parse_response};
pub use self::selection::{ForceSource, SelectionPolicy, SourceField, WorkItem, WorkItemSelector};

// Re-export prompt types
pub use self::prompts::{PromptTemplate, TranslationPromptBuilder};

// Submodules
pub mod batch;
pub mod classifier;
pub mod client;
pub mod controller;
pub mod diagnostics;
pub mod pipeline;
pub mod prompts;
pub mod response;
pub mod selection;
