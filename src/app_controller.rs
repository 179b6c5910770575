use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::app_config::{Config, TranslationConfig, TranslationProvider};
use crate::catalog::Catalog;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::providers::Provider;
use crate::providers::anthropic::Anthropic;
use crate::providers::openai::OpenAI;
use crate::translation::{
    ClientOptions, LanguageClassifier, PipelineContext, RetryPolicy, RunOptions, RunSummary, TranslationClient,
};

// @module: Application controller for catalog translation

/// Main application controller for catalog translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.source_language.is_empty() && !self.config.target_language.is_empty()
    }

    /// Translate `input_file` into `output_file` with the configured provider
    ///
    /// In dry-run mode no request is sent and nothing is written.
    pub async fn run(
        &self,
        input_file: PathBuf,
        output_file: Option<PathBuf>,
        dry_run: bool,
        cancel: Arc<AtomicBool>,
    ) -> Result<RunSummary> {
        if !dry_run {
            self.config.validate_credentials()?;
        }
        let provider = create_provider(&self.config.translation);
        self.run_with_provider(provider, input_file, output_file, dry_run, cancel)
            .await
    }

    /// Same as `run` with an explicit provider
    pub async fn run_with_provider(
        &self,
        provider: Arc<dyn Provider>,
        input_file: PathBuf,
        output_file: Option<PathBuf>,
        dry_run: bool,
        cancel: Arc<AtomicBool>,
    ) -> Result<RunSummary> {
        // Start timing the process
        let start_time = std::time::Instant::now();

        // Check if the input file exists
        if !FileManager::file_exists(&input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        let output_file = output_file
            .unwrap_or_else(|| FileManager::generate_output_path(&input_file, &self.config.target_language));

        let mut catalog = Catalog::load(&input_file)
            .with_context(|| format!("Failed to load catalog: {:?}", input_file))?;
        self.check_catalog_language(&catalog);

        let context = match &self.config.translation.common.context_file {
            Some(path) => Some(FileManager::read_context_file(path)?),
            None => None,
        };

        info!(
            "🚀 potwai: {} - {} ({} → {})",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model(),
            self.config.source_language,
            language_utils::get_language_name(&self.config.target_language)
                .unwrap_or_else(|_| self.config.target_language.clone())
        );

        let client = TranslationClient::new(provider, self.client_options(context, dry_run));
        let classifier = LanguageClassifier::new(&self.config.source_language, &self.config.target_language);
        let mut pipeline = PipelineContext::new(self.run_options(dry_run), client, classifier)
            .with_cancel_flag(cancel);

        let progress_bar = if dry_run {
            ProgressBar::hidden()
        } else {
            Self::progress_bar(pipeline.select(&catalog).len() as u64)
        };
        let bar = progress_bar.clone();
        pipeline = pipeline.with_progress(Box::new(move |progress| {
            bar.set_position(progress.processed_items as u64);
            bar.set_message(format!("batch {}/{}", progress.batch_id, progress.batches));
        }));

        let result = pipeline.run(&mut catalog).await;
        progress_bar.finish_and_clear();

        // Logs are kept even when the run aborts
        let diagnostics = pipeline.into_diagnostics();
        if let Err(e) = diagnostics.persist(&self.config.logs) {
            error!("Failed to write diagnostic logs: {}", e);
        }

        let summary = result?;

        if dry_run {
            info!(
                "Dry run: {} entries would be translated in {} requests (~{} prompt tokens)",
                summary.eligible, summary.batches, summary.estimated_prompt_tokens
            );
            return Ok(summary);
        }

        catalog
            .save(&output_file)
            .with_context(|| format!("Failed to write catalog: {:?}", output_file))?;

        if summary.cancelled {
            warn!("Run cancelled, partial result written to {:?}", output_file);
        }
        info!(
            "Translated {}/{} entries ({} failed, {} placeholder warnings) in {}. Output: {:?}",
            summary.translated,
            summary.eligible,
            summary.failed,
            summary.placeholder_warnings,
            Self::format_duration(start_time.elapsed()),
            output_file
        );

        Ok(summary)
    }

    fn client_options(&self, context: Option<String>, dry_run: bool) -> ClientOptions {
        let translation = &self.config.translation;
        ClientOptions {
            target_language: self.config.target_language.clone(),
            model: translation.get_model(),
            temperature: translation.common.temperature,
            max_tokens: translation.get_max_tokens(),
            context,
            dry_run,
        }
    }

    fn run_options(&self, dry_run: bool) -> RunOptions {
        let common = &self.config.translation.common;
        RunOptions {
            batch_size: common.batch_size,
            force: common.force,
            force_source: common.force_source,
            mark_fuzzy: common.mark_fuzzy,
            dry_run,
            retry: RetryPolicy::from_config(common),
        }
    }

    /// Warn when the catalog header names a different language than the target
    fn check_catalog_language(&self, catalog: &Catalog) {
        match catalog.language() {
            Some(language) if !language_utils::language_codes_match(&language, &self.config.target_language) => {
                warn!(
                    "Catalog header declares language {:?}, translating into {:?}",
                    language, self.config.target_language
                );
            }
            Some(language) => debug!("Catalog language: {}", language),
            None => debug!("Catalog has no Language header"),
        }
    }

    fn progress_bar(len: u64) -> ProgressBar {
        let progress_bar = ProgressBar::new(len);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} entries ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar
    }

    /// Format a duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

/// Build the provider client selected in the configuration
pub fn create_provider(config: &TranslationConfig) -> Arc<dyn Provider> {
    let timeout_secs = config.get_timeout_secs();
    match config.provider {
        TranslationProvider::OpenAI | TranslationProvider::LMStudio => Arc::new(OpenAI::new(
            config.get_api_key(),
            config.get_endpoint(),
            timeout_secs,
        )),
        TranslationProvider::Anthropic => Arc::new(Anthropic::new(
            config.get_api_key(),
            config.get_endpoint(),
            timeout_secs,
        )),
    }
}
