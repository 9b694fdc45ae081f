use crate::core::geo::CoordinateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TourError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Tour API rejected the request ({code}): {message}")]
    ApiError { code: String, message: String },

    #[error("HTTP {status} from {operation}: {body}")]
    HttpError {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Malformed response from {operation}: {message}")]
    ParseError { operation: String, message: String },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("Attraction {content_id} is already bookmarked by {user_id}")]
    AlreadyBookmarked { user_id: String, content_id: String },

    #[error("No bookmark for attraction {content_id} owned by {user_id}")]
    BookmarkNotFound { user_id: String, content_id: String },

    #[error("Coordinate conversion failed: {0}")]
    CoordinateError(#[from] CoordinateError),

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Client,
    Transient,
    Parse,
    Conflict,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TourError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn parse(operation: &str, message: impl Into<String>) -> Self {
        Self::ParseError {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } | Self::CoordinateError(_) => ErrorCategory::Validation,
            Self::ApiError { .. } | Self::NotFound { .. } | Self::BookmarkNotFound { .. } => {
                ErrorCategory::Client
            }
            Self::HttpError { status, .. } if *status >= 500 => ErrorCategory::Transient,
            Self::HttpError { .. } => ErrorCategory::Client,
            Self::NetworkError(e) if e.is_builder() => ErrorCategory::Configuration,
            Self::NetworkError(e) if e.is_decode() => ErrorCategory::Parse,
            Self::NetworkError(_) => ErrorCategory::Transient,
            Self::ParseError { .. } | Self::SerializationError(_) => ErrorCategory::Parse,
            Self::AlreadyBookmarked { .. } => ErrorCategory::Conflict,
            Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::CsvError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Conflict => ErrorSeverity::Low,
            ErrorCategory::Transient => ErrorSeverity::Medium,
            ErrorCategory::Validation
            | ErrorCategory::Client
            | ErrorCategory::Parse
            | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// CLI 退出碼；衝突用獨立的 4，讓腳本能分辨「沒有變更」與成功
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    /// 只有 5xx 與傳輸層失敗會重試
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ValidationError { message } => format!("Invalid input: {}", message),
            Self::ApiError { message, .. } => {
                format!("The tourism service refused the request: {}", message)
            }
            Self::HttpError { status, .. } if *status >= 500 => {
                "The tourism service is temporarily unavailable".to_string()
            }
            Self::HttpError { status, .. } => format!("The request was rejected (HTTP {})", status),
            Self::NetworkError(_) => "Could not reach the tourism service".to_string(),
            Self::ParseError { .. } => {
                "The tourism service returned an unexpected response".to_string()
            }
            Self::NotFound { what } => format!("{} could not be found", what),
            Self::AlreadyBookmarked { .. } => {
                "This attraction is already in your bookmarks".to_string()
            }
            Self::BookmarkNotFound { .. } => {
                "This attraction is not in your bookmarks".to_string()
            }
            Self::CoordinateError(e) => format!("Location unavailable: {}", e),
            Self::MissingConfigError { field } => {
                format!("Required setting {} is not configured", field)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting {} is invalid: {}", field, reason)
            }
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::IoError(e) => format!("File system error: {}", e),
            Self::SerializationError(e) => format!("Could not read stored data: {}", e),
            Self::CsvError(e) => format!("Could not write CSV output: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => "Check the command arguments and try again",
            ErrorCategory::Client => "Verify the service key and request parameters",
            ErrorCategory::Transient => "Wait a moment and retry the command",
            ErrorCategory::Parse => {
                "The upstream API may have changed; retry later or report the response"
            }
            ErrorCategory::Conflict => "Nothing to do, the bookmark already exists",
            ErrorCategory::Configuration => {
                "Set TOUR_API_KEY or provide a config file with --config"
            }
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, TourError>;
