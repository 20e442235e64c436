use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Appointment request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to fetch appointments: {message}")]
    FetchFailure { message: String },

    #[error("Appointment {id} has an invalid interval: {start} -> {end}")]
    InvalidInterval {
        id: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Invalid timestamp: {value}")]
    InvalidTimestamp { value: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

/// 錯誤分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    System,
}

/// 錯誤嚴重程度，決定 CLI 的退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CalendarError {
    pub fn fetch_failure(message: impl Into<String>) -> Self {
        Self::FetchFailure {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http(_) | Self::FetchFailure { .. } => ErrorCategory::Network,
            Self::Serialization(_)
            | Self::Csv(_)
            | Self::InvalidInterval { .. }
            | Self::InvalidTimestamp { .. } => ErrorCategory::Data,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::Io(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 被丟棄的單筆預約只是警告
            Self::InvalidInterval { .. } => ErrorSeverity::Low,
            Self::Http(_) | Self::FetchFailure { .. } | Self::InvalidTimestamp { .. } => {
                ErrorSeverity::Medium
            }
            Self::Serialization(_)
            | Self::Csv(_)
            | Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
            Self::Io(_) => ErrorSeverity::Critical,
        }
    }

    /// 可在畫面上以提示呈現、不需中斷程式的錯誤
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Data
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Http(_) | Self::FetchFailure { .. } => {
                "Could not load appointments; showing an empty calendar".to_string()
            }
            Self::InvalidInterval { id, .. } => {
                format!("Appointment {} ends before it starts and was skipped", id)
            }
            Self::InvalidTimestamp { value } => {
                format!("The backend returned an unreadable time: {}", value)
            }
            Self::Serialization(_) => "The appointment data could not be read".to_string(),
            Self::Csv(_) => "The calendar could not be exported as CSV".to_string(),
            Self::Io(e) => format!("File system error: {}", e),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::ConfigValidationError { field, message } => {
                format!("Setting '{}' is not valid: {}", field, message)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is not valid: {}", field, reason)
            }
            Self::MissingConfigError { field } => format!("Setting '{}' is required", field),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check the endpoint URL and API key, then refresh the calendar"
            }
            ErrorCategory::Data => "Fix the offending appointment record in the backend",
            ErrorCategory::Configuration => {
                "Review the command line flags or the TOML configuration file"
            }
            ErrorCategory::System => "Check file paths and permissions",
        }
    }
}

pub type Result<T> = std::result::Result<T, CalendarError>;
