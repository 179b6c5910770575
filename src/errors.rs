/*!
 * Error types for the potwai application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * The taxonomy follows how failures are handled during a run:
 * - `CatalogError` and configuration problems are fatal
 * - `ProviderError` is usually transient and absorbed by the retry controller
 * - `TranslationError` is what a single translation attempt produces
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response envelope fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Error message from the API
        message: String,
        /// Value of the Retry-After header, if the API sent one
        retry_after_secs: Option<u64>,
    },

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether resending the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(_)
            | Self::ConnectionError(_)
            | Self::ParseError(_)
            | Self::RateLimitExceeded { .. } => true,
            Self::ApiError { status_code, .. } => {
                *status_code >= 500 || *status_code == 408 || *status_code == 429
            }
            Self::AuthenticationError(_) => false,
        }
    }

    /// Whether this error must abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AuthenticationError(_))
    }

    /// Minimum wait requested by the provider before the next attempt
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimitExceeded { retry_after_secs, .. } => *retry_after_secs,
            _ => None,
        }
    }
}

/// Errors that can occur while reading or writing a catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Structural parse error with 1-based line number
    #[error("line {line}: {message}")]
    Parse {
        /// Line where the problem was found
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// Invalid escape sequence inside a quoted string
    #[error("line {line}: invalid escape sequence \\{escape}")]
    InvalidEscape {
        /// Line of the string
        line: usize,
        /// The character after the backslash
        escape: char,
    },

    /// Quoted string without closing quote
    #[error("line {0}: unterminated string")]
    UnterminatedString(usize),

    /// Two entries share the same msgctxt + msgid
    #[error("line {line}: duplicate message definition for {key:?}")]
    DuplicateEntry {
        /// Line of the second definition
        line: usize,
        /// The duplicated entry key
        key: String,
    },
}

/// Errors that can occur during a translation attempt
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The model answered but its text could not be read as the expected JSON
    #[error("Unparsable model response: {0}")]
    UnparsableResponse(String),

    /// The response was valid but did not contain a usable translation
    #[error("Missing translation for {0:?}")]
    MissingTranslation(String),
}

impl TranslationError {
    /// Whether the controller should retry after this error
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_retryable(),
            Self::UnparsableResponse(_) | Self::MissingTranslation(_) => true,
        }
    }

    /// Whether this error must abort the whole run
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_fatal(),
            _ => false,
        }
    }

    /// Minimum wait requested by the provider before the next attempt
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::Provider(e) => e.retry_after_secs(),
            _ => None,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from catalog loading or writing
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation that could not be recovered
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
