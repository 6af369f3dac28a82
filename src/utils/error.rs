use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("HTTP {status} returned by {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Unexpected page structure at {url}: {message}")]
    HtmlStructure { url: String, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Parsing,
    Storage,
    Configuration,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn html(url: impl Into<String>, message: impl Into<String>) -> Self {
        EtlError::HtmlStructure {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::HttpStatus { .. } => ErrorCategory::Network,
            EtlError::HtmlStructure { .. } => ErrorCategory::Parsing,
            EtlError::CsvError(_) | EtlError::IoError(_) | EtlError::SerializationError(_) => {
                ErrorCategory::Storage
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::ApiError(_) | EtlError::HttpStatus { .. } => ErrorSeverity::Medium,
            EtlError::HtmlStructure { .. }
            | EtlError::CsvError(_)
            | EtlError::ProcessingError { .. } => ErrorSeverity::High,
            EtlError::IoError(_)
            | EtlError::SerializationError(_)
            | EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Per-stat failures in this category are skipped instead of aborting the run.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Parsing
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check the network connection and that the stats site is reachable, then rerun"
            }
            ErrorCategory::Parsing => {
                "The site layout may have changed; inspect the page and update the selectors"
            }
            ErrorCategory::Storage => {
                "Check that the output path exists, is writable and that existing CSV files are not corrupted"
            }
            ErrorCategory::Configuration => {
                "Review the command line flags or the TOML configuration file"
            }
            ErrorCategory::Processing => "Rerun with --verbose to see which records failed",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not download stats: {}", self),
            ErrorCategory::Parsing => format!("Could not read the stats page: {}", self),
            ErrorCategory::Storage => format!("Could not read or write output files: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Processing => format!("Could not process stats: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
