use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Extraction request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required setting: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Missing required input: {field}")]
    InputIncomplete { field: String },

    #[error("Extraction failed: {message}")]
    Extraction { message: String },

    #[error("An extraction is already in progress")]
    ExtractionInFlight,

    #[error("Invalid workflow state: {message}")]
    InvalidState { message: String },
}

/// 錯誤嚴重程度，決定 CLI 的退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl LedgerError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LedgerError::ExtractionInFlight => ErrorSeverity::Low,
            LedgerError::InputIncomplete { .. }
            | LedgerError::HttpError(_)
            | LedgerError::Extraction { .. } => ErrorSeverity::Medium,
            LedgerError::CsvError(_)
            | LedgerError::SerializationError(_)
            | LedgerError::ValidationError { .. }
            | LedgerError::InvalidState { .. } => ErrorSeverity::High,
            LedgerError::IoError(_)
            | LedgerError::ConfigError { .. }
            | LedgerError::InvalidConfigValueError { .. }
            | LedgerError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LedgerError::HttpError(_) => {
                "Could not reach the extraction service.".to_string()
            }
            LedgerError::Extraction { message } => {
                format!("The photos could not be read: {}", message)
            }
            LedgerError::ExtractionInFlight => {
                "Please wait for the current order to finish processing.".to_string()
            }
            LedgerError::InputIncomplete { field } => {
                format!("Please provide {} before submitting.", field)
            }
            LedgerError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            LedgerError::MissingConfigError { field } => {
                format!("Setting '{}' is required.", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LedgerError::HttpError(_) | LedgerError::Extraction { .. } => {
                "Check the extraction endpoint and resubmit the order."
            }
            LedgerError::ExtractionInFlight => "Retry once the pending order has completed.",
            LedgerError::InputIncomplete { .. } => {
                "Supply the service name and both photos."
            }
            LedgerError::ConfigError { .. }
            | LedgerError::InvalidConfigValueError { .. }
            | LedgerError::MissingConfigError { .. } => {
                "Review the configuration file and command line flags."
            }
            LedgerError::IoError(_) => "Check that the data directory exists and is writable.",
            LedgerError::CsvError(_) | LedgerError::SerializationError(_) => {
                "The ledger data could not be encoded; run with --verbose for details."
            }
            LedgerError::ValidationError { .. } | LedgerError::InvalidState { .. } => {
                "Correct the input and try again."
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
