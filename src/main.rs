// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use potwai::app_config::{self, Config, TranslationProvider};
use potwai::app_controller::Controller;
use potwai::translation::ForceSource;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    #[value(name = "lmstudio")]
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for ForceSource to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliForceSource {
    PreferMsgstr,
    Msgid,
}

impl From<CliForceSource> for ForceSource {
    fn from(cli_source: CliForceSource) -> Self {
        match cli_source {
            CliForceSource::PreferMsgstr => ForceSource::PreferMsgstr,
            CliForceSource::Msgid => ForceSource::Msgid,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a .po catalog using AI providers
    Translate(TranslateArgs),

    /// Generate shell completions for potwai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Catalog to translate
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Where to write the translated catalog (default: INPUT with the target language before .po)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// API key for the provider (falls back to OPENAI_API_KEY / ANTHROPIC_API_KEY)
    #[arg(long, env = "POTWAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Maximum number of entries per request
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Source language code, or 'auto' to detect per entry
    #[arg(short, long = "source-lang")]
    source_language: Option<String>,

    /// Target language code (e.g. 'nb', 'sv', 'de')
    #[arg(short, long = "target-lang")]
    target_language: Option<String>,

    /// Retranslate every entry, not only untranslated or foreign ones
    #[arg(short, long)]
    force: bool,

    /// Source field used with --force
    #[arg(long, value_enum)]
    force_source: Option<CliForceSource>,

    /// Plan batches and estimate tokens without calling the provider or writing output
    #[arg(long)]
    dry_run: bool,

    /// Plain-text or JSON file describing the product, injected into every request
    #[arg(long)]
    context_file: Option<PathBuf>,

    /// Add the fuzzy flag to translated entries
    #[arg(long)]
    mark_fuzzy: bool,

    /// Directory for the diagnostic logs
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// potwai - PO Translation with AI
///
/// Translates gettext .po catalogs with LLM providers while keeping
/// placeholders, comments, contexts and flags intact.
#[derive(Parser, Debug)]
#[command(name = "potwai")]
#[command(version)]
#[command(about = "AI-powered gettext catalog translation tool")]
#[command(long_about = "potwai translates the untranslated or foreign-language entries of a gettext .po catalog using AI providers.

EXAMPLES:
    potwai translate messages.po                          # Writes messages.nb.po using conf.json
    potwai translate messages.po out.po -t sv             # Translate into Swedish
    potwai translate messages.po -p anthropic --dry-run   # Estimate requests and tokens only
    potwai translate nb.po --force --force-source msgid   # Retranslate everything from msgid
    potwai translate messages.po --context-file shop.txt  # Add domain context to every request
    potwai completions bash > potwai.bash                 # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌",
            Level::Warn => "🚧",
            Level::Info => "",
            Level::Debug => "🔍",
            Level::Trace => "📋",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // the max level set later may be lower than the initial one
        metadata.level() <= self.level.max(log::max_level())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "potwai", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
    }
}

/// Apply command line overrides on top of the file configuration
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.translation.set_model(model);
    }
    if let Some(api_key) = &options.api_key {
        if let Some(provider_config) = config.translation.get_active_provider_config_mut() {
            provider_config.api_key = api_key.clone();
        }
    }
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    let common = &mut config.translation.common;
    if let Some(batch_size) = options.batch_size {
        common.batch_size = batch_size;
    }
    if options.force {
        common.force = true;
    }
    if let Some(force_source) = &options.force_source {
        common.force_source = force_source.clone().into();
    }
    if options.mark_fuzzy {
        common.mark_fuzzy = true;
    }
    if let Some(context_file) = &options.context_file {
        common.context_file = Some(context_file.clone());
    }

    if let Some(log_dir) = &options.log_dir {
        config.logs.directory = log_dir.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.apply_env_api_key();
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    // Load or create configuration
    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options);

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    // Ctrl-C stops the run between batches
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing the current batch");
            cancel_flag.store(true, Ordering::SeqCst);
        }
    });

    let controller = Controller::with_config(config)?;
    let summary = controller
        .run(options.input, options.output, options.dry_run, cancel)
        .await?;

    if summary.failed > 0 {
        info!(
            "{} entries could not be translated, see {:?}",
            summary.failed,
            controller.config().logs.failed_items_path()
        );
    }

    Ok(())
}
