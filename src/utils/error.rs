use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("API returned status {status} for {endpoint}")]
    ApiStatusError { status: u16, endpoint: String },

    #[error("Rate for currency '{currency}' not found in response")]
    RateNotFoundError { currency: String },

    #[error("Invalid exchange rate: {value}")]
    InvalidRateError { value: f64 },

    #[error("Rate request timed out after {seconds}s")]
    TimeoutError { seconds: u64 },

    #[error("No exchange rate available: {reason}")]
    RateUnavailableError { reason: String },

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

    #[error("Unknown button label: '{label}'")]
    UnknownButtonError { label: String },
}

/// 表達式求值失敗的原因，對外一律顯示為 "Error"
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Parse error at position {position}: {message}")]
    ParseError { position: usize, message: String },

    #[error("Evaluation failure: {message}")]
    EvaluationFailure { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Configuration,
    Data,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CalcError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CalcError::ApiError(_)
            | CalcError::ApiStatusError { .. }
            | CalcError::TimeoutError { .. } => ErrorCategory::Network,
            CalcError::IoError(_) | CalcError::SerializationError(_) => ErrorCategory::Storage,
            CalcError::RateNotFoundError { .. }
            | CalcError::InvalidRateError { .. }
            | CalcError::RateUnavailableError { .. } => ErrorCategory::Data,
            CalcError::ConfigError { .. }
            | CalcError::ConfigValidationError { .. }
            | CalcError::InvalidConfigValueError { .. }
            | CalcError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CalcError::UnknownButtonError { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CalcError::ApiError(_) | CalcError::ApiStatusError { .. } => {
                "Could not reach the exchange rate service".to_string()
            }
            CalcError::TimeoutError { seconds } => {
                format!("The exchange rate service did not answer within {}s", seconds)
            }
            CalcError::IoError(_) | CalcError::SerializationError(_) => {
                "Could not read or write the saved exchange rate".to_string()
            }
            CalcError::RateNotFoundError { currency } => {
                format!("The exchange rate service has no rate for {}", currency)
            }
            CalcError::InvalidRateError { value } => {
                format!("Received an unusable exchange rate ({})", value)
            }
            CalcError::RateUnavailableError { .. } => {
                "No exchange rate is available yet".to_string()
            }
            CalcError::ConfigError { .. }
            | CalcError::ConfigValidationError { .. }
            | CalcError::InvalidConfigValueError { .. }
            | CalcError::MissingConfigError { .. } => format!("Invalid configuration: {}", self),
            CalcError::UnknownButtonError { label } => format!("'{}' is not a calculator key", label),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your network connection or the API endpoint",
            ErrorCategory::Storage => "Check that the cache path is writable",
            ErrorCategory::Data => "Try again later; the last saved rate will be used when available",
            ErrorCategory::Configuration => "Fix the configuration file or command line flags",
            ErrorCategory::Input => "Type 'keys' to list the available keys",
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;
