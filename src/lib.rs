/*!
 * # potwai - PO Translation with AI
 *
 * A Rust library for translating gettext `.po` catalogs with large language models.
 *
 * ## Features
 *
 * - Lossless `.po` parsing: untouched entries are written back byte for byte
 * - Per-entry source language detection, so already translated entries are skipped
 * - Batched JSON requests to different AI providers:
 *   - OpenAI API (and OpenAI-compatible servers such as LM Studio)
 *   - Anthropic API
 * - Placeholder validation for printf, brace, template, HTML and URL tokens
 * - Retries with exponential backoff and per-entry fallback
 * - Dry runs with request and token estimates
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `catalog`: `.po` model, parser and writer
 * - `translation`: selection, batching, requests, retries and the run pipeline
 * - `validation`: placeholder checks
 * - `providers`: Client implementations for the supported LLM providers
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod catalog;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use catalog::{Catalog, CatalogEntry, EntryKey};
pub use errors::{AppError, CatalogError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match};
pub use translation::{PipelineContext, RunOptions, RunSummary};
