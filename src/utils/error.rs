use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Invalid argument `{field}` = {value:?}: {reason}")]
    InvalidArgument {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Listing not found: {key}")]
    NotFound { key: String },

    #[error("Query cancelled before completion")]
    Cancelled,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Snapshot error: {message}")]
    SnapshotError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Request,
    NotFound,
    Cancellation,
    Configuration,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DirectoryError {
    pub fn invalid_argument(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidArgument { .. } => ErrorCategory::Request,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Cancelled => ErrorCategory::Cancellation,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::IoError(_)
            | Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::SnapshotError { .. } => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::NotFound | ErrorCategory::Cancellation => ErrorSeverity::Low,
            ErrorCategory::Request => ErrorSeverity::Medium,
            ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// HTTP 對應狀態碼，由外層傳輸層使用
    pub fn status_code(&self) -> u16 {
        match self.category() {
            ErrorCategory::Request => 400,
            ErrorCategory::NotFound => 404,
            ErrorCategory::Cancellation => 499,
            ErrorCategory::Configuration | ErrorCategory::Storage => 500,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::InvalidArgument { field, .. } if field == "limit" => {
                "Pass `limit` as a positive integer, or omit it to use the default".to_string()
            }
            Self::InvalidArgument { field, .. } => {
                format!("Correct the `{}` parameter and re-issue the request", field)
            }
            Self::NotFound { .. } => {
                "Check the slug or id; use a list query to browse available listings".to_string()
            }
            Self::Cancelled => "Re-issue the query if the result is still needed".to_string(),
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration file and restart".to_string()
            }
            Self::IoError(_) => "Make sure the snapshot file exists and is readable".to_string(),
            Self::CsvError(_) => {
                "Check the CSV header and that every row has the expected columns".to_string()
            }
            Self::SerializationError(_) => {
                "Check that the snapshot file is a JSON array of listings".to_string()
            }
            Self::SnapshotError { .. } => {
                "Remove duplicate ids or slugs from the snapshot".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InvalidArgument { field, reason, .. } => {
                format!("Invalid value for `{}`: {}", field, reason)
            }
            Self::NotFound { .. } => "Listing not found".to_string(),
            Self::Cancelled => "The query was cancelled".to_string(),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value `{}` is invalid: {}", field, reason)
            }
            Self::SnapshotError { message } => format!("Listing snapshot is invalid: {}", message),
            Self::IoError(_) | Self::CsvError(_) | Self::SerializationError(_) => {
                format!("Could not load listings: {}", self)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DirectoryError>;
