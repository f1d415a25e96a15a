use std::fmt;
use thiserror::Error;

/// Error types for the listing scraper
#[derive(Error, Debug)]
pub enum ScraperError {
    // Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // Browser errors
    #[error("Browser session error: {message}")]
    Session { message: String },

    #[error("Navigation failed: {url} - {message}")]
    Navigation { url: String, message: String },

    #[error("Script evaluation failed: {message}")]
    Script { message: String },

    #[error("Timed out after {seconds}s waiting for: {selector}")]
    Timeout { selector: String, seconds: u64 },

    // Extraction errors
    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("Extraction error: {message}")]
    Extraction { message: String },

    // Network errors
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Export errors
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ScraperError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a browser session error
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session { message: message.into() }
    }

    pub fn navigation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation { url: url.into(), message: message.into() }
    }

    pub fn script(message: impl Into<String>) -> Self {
        Self::Script { message: message.into() }
    }

    pub fn element_not_found(selector: impl Into<String>) -> Self {
        Self::ElementNotFound { selector: selector.into() }
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction { message: message.into() }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Session { .. } | Self::Navigation { .. } | Self::Script { .. } | Self::Timeout { .. } => "browser",
            Self::ElementNotFound { .. } | Self::Extraction { .. } => "extraction",
            Self::Network { .. } => "network",
            Self::Serialization(_) | Self::Csv(_) => "export",
            Self::Io(_) => "system",
        }
    }
}

/// Result type alias for the scraper
pub type ScraperResult<T> = std::result::Result<T, ScraperError>;

/// Why a single listing was dropped from the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipReason {
    pub category: &'static str,
    pub message: String,
}

impl From<&ScraperError> for SkipReason {
    fn from(err: &ScraperError) -> Self {
        Self {
            category: err.category(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

impl From<reqwest::Error> for ScraperError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network { message: err.to_string() }
    }
}
