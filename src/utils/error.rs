use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Failed to open serial device {device}: {message}")]
    ConnectionError { device: String, message: String },

    #[error("{message}")]
    WriteError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

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

    #[error("HTTP server error: {message}")]
    ServerError { message: String },

    #[error("Background task failed: {message}")]
    TaskError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Connection,
    Transport,
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

impl BridgeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BridgeError::ConnectionError { .. } => ErrorCategory::Connection,
            BridgeError::WriteError { .. } => ErrorCategory::Transport,
            BridgeError::ConfigError { .. }
            | BridgeError::ConfigValidationError { .. }
            | BridgeError::InvalidConfigValueError { .. }
            | BridgeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            BridgeError::IoError(_) | BridgeError::ServerError { .. } | BridgeError::TaskError { .. } => {
                ErrorCategory::System
            }
        }
    }

    /// 寫入失敗只影響單一指令；連線失敗讓整個行程失去作用但不結束
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BridgeError::WriteError { .. } => ErrorSeverity::Low,
            BridgeError::ConnectionError { .. } => ErrorSeverity::Medium,
            BridgeError::ConfigError { .. }
            | BridgeError::ConfigValidationError { .. }
            | BridgeError::InvalidConfigValueError { .. }
            | BridgeError::MissingConfigError { .. } => ErrorSeverity::High,
            BridgeError::IoError(_) | BridgeError::ServerError { .. } | BridgeError::TaskError { .. } => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Connection => {
                "Check that the board is plugged in, the device path is correct and no other program holds the port"
            }
            ErrorCategory::Transport => "Reconnect the board and send the command again",
            ErrorCategory::Configuration => "Fix the configuration file or command-line flags and restart",
            ErrorCategory::System => "Check that the port is free and the process has the required permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            BridgeError::ConnectionError { device, .. } => {
                format!("Could not connect to the robot on {}", device)
            }
            BridgeError::WriteError { message } => format!("Could not send the command: {}", message),
            BridgeError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            BridgeError::MissingConfigError { field } => format!("Missing setting '{}'", field),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
