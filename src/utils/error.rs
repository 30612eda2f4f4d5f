use thiserror::Error;

#[derive(Error, Debug)]
pub enum TsError {
    #[error("Cannot convert {value} to {target}: {reason}")]
    Conversion {
        value: String,
        target: &'static str,
        reason: String,
    },

    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    #[error("Slice step must be a positive integer, got {step}")]
    InvalidStep { step: i64 },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An element could not be brought into the comparison domain.
    Conversion,
    /// A malformed argument: timestamp, duration or stride.
    Value,
    Config,
    Io,
}

impl TsError {
    pub fn conversion(
        value: impl std::fmt::Debug,
        target: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        TsError::Conversion {
            value: format!("{:?}", value),
            target,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TsError::Conversion { .. } => ErrorKind::Conversion,
            TsError::InvalidTimestamp { .. }
            | TsError::InvalidDuration { .. }
            | TsError::InvalidStep { .. } => ErrorKind::Value,
            TsError::Config { .. } | TsError::InvalidConfigValue { .. } => ErrorKind::Config,
            TsError::Io(_) | TsError::Serialization(_) => ErrorKind::Io,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            TsError::Conversion { value, target, .. } => {
                format!("Element {} cannot be compared as {}", value, target)
            }
            TsError::InvalidTimestamp { value, .. } => {
                format!("'{}' is not a valid date or date-time", value)
            }
            TsError::InvalidDuration { value, .. } => {
                format!("'{}' is not a valid duration", value)
            }
            TsError::InvalidStep { step } => format!("Step {} is not allowed", step),
            TsError::Config { message } => format!("Configuration problem: {}", message),
            TsError::InvalidConfigValue { field, value, .. } => {
                format!("Setting '{}' has an invalid value '{}'", field, value)
            }
            TsError::Io(e) => format!("Could not read or write data: {}", e),
            TsError::Serialization(e) => format!("Input is not valid JSON: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Conversion => {
                "Check that every element can be read in the chosen domain (number or timestamp)"
            }
            ErrorKind::Value => {
                "Use YYYYMMDD or ISO dates, durations like '3d' or '2w', and a step of at least 1"
            }
            ErrorKind::Config => "Fix the configuration file or command line flags and retry",
            ErrorKind::Io => "Make sure the input exists and contains a JSON array or object",
        }
    }
}

pub type Result<T> = std::result::Result<T, TsError>;
