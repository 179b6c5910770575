/*!
 * Diagnostic records collected during a run.
 *
 * Records are buffered in memory and appended as JSON lines to their log
 * files once the run is over. A log file is only touched when its buffer
 * holds at least one record.
 */

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use serde::Serialize;

use crate::app_config::LogConfig;
use crate::catalog::EntryKey;
use crate::file_utils::FileManager;
use crate::validation::PlaceholderReport;

/// An item that could not be translated
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FailureRecord {
    pub key: EntryKey,
    pub batch_id: usize,
    pub source: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

/// A translation whose placeholders differ from its source
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlaceholderWarning {
    pub key: EntryKey,
    pub missing: Vec<String>,
    pub added: Vec<String>,
    pub source: String,
    pub translation: String,
    pub timestamp: DateTime<Utc>,
}

/// A model answer that could not be read
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UnparsableResponse {
    pub batch_id: usize,
    pub error: String,
    pub raw: String,
    pub timestamp: DateTime<Utc>,
}

/// In-memory buffers for the three diagnostic logs
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    failures: Vec<FailureRecord>,
    placeholder_warnings: Vec<PlaceholderWarning>,
    unparsable_responses: Vec<UnparsableResponse>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failure(&mut self, key: &EntryKey, batch_id: usize, source: &str, error: impl ToString) {
        let record = FailureRecord {
            key: key.clone(),
            batch_id,
            source: source.to_string(),
            error: error.to_string(),
            timestamp: Utc::now(),
        };
        error!("Failed to translate {:?} (batch {}): {}", key.as_str(), batch_id, record.error);
        self.failures.push(record);
    }

    pub fn record_placeholder_warning(
        &mut self,
        key: &EntryKey,
        report: &PlaceholderReport,
        source: &str,
        translation: &str,
    ) {
        warn!(
            "Placeholder mismatch in {:?}: missing {:?}, added {:?}",
            key.as_str(),
            report.missing,
            report.added
        );
        self.placeholder_warnings.push(PlaceholderWarning {
            key: key.clone(),
            missing: report.missing.clone(),
            added: report.added.clone(),
            source: source.to_string(),
            translation: translation.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn record_unparsable(&mut self, batch_id: usize, error: impl ToString, raw: &str) {
        let record = UnparsableResponse {
            batch_id,
            error: error.to_string(),
            raw: raw.to_string(),
            timestamp: Utc::now(),
        };
        warn!("Unparsable response for batch {}: {}", batch_id, record.error);
        self.unparsable_responses.push(record);
    }

    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    pub fn placeholder_warnings(&self) -> &[PlaceholderWarning] {
        &self.placeholder_warnings
    }

    pub fn unparsable_responses(&self) -> &[UnparsableResponse] {
        &self.unparsable_responses
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty() && self.placeholder_warnings.is_empty() && self.unparsable_responses.is_empty()
    }

    /// Append every buffered record to its log file
    pub fn persist(&self, logs: &LogConfig) -> Result<()> {
        FileManager::append_json_lines(logs.unparsable_responses_path(), &to_json_lines(&self.unparsable_responses)?)?;
        FileManager::append_json_lines(logs.failed_items_path(), &to_json_lines(&self.failures)?)?;
        FileManager::append_json_lines(logs.placeholder_warnings_path(), &to_json_lines(&self.placeholder_warnings)?)?;
        debug!(
            "Persisted diagnostics: {} failures, {} placeholder warnings, {} unparsable responses",
            self.failures.len(),
            self.placeholder_warnings.len(),
            self.unparsable_responses.len()
        );
        Ok(())
    }
}

fn to_json_lines<T: Serialize>(records: &[T]) -> Result<Vec<String>> {
    records
        .iter()
        .map(|r| serde_json::to_string(r).map_err(Into::into))
        .collect()
}
