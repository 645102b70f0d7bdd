//! Core error types

use thiserror::Error;

/// Result type alias for automate operations
pub type AutomateResult<T> = Result<T, AutomateError>;

/// Coarse classification used by the runner to pick a run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed run context, parameters, token or configuration
    Input,
    /// Authentication, transport or missing remote resources
    Connectivity,
    /// Raised by the function logic itself
    Transformation,
}

impl ErrorCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Input => "Input validation",
            Self::Connectivity => "Connectivity",
            Self::Transformation => "Function",
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Wrap any displayable error as a function error with context
    fn context<C: std::fmt::Display>(self, context: C) -> AutomateResult<T>;

    /// Add context lazily (only evaluated on error)
    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> AutomateResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context<C: std::fmt::Display>(self, context: C) -> AutomateResult<T> {
        self.map_err(|e| AutomateError::function(format!("{}: {}", context, e)))
    }

    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> AutomateResult<T> {
        self.map_err(|e| AutomateError::function(format!("{}: {}", f(), e)))
    }
}

/// Main error type
#[derive(Error, Debug, Clone)]
pub enum AutomateError {
    /// Invalid run context, function inputs or token
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        context: Option<String>,
    },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Transport-level HTTP failures
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        url: Option<String>,
        status_code: Option<u16>,
    },

    /// The server rejected the credential
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// The server answered with a GraphQL or protocol level error
    #[error("Server error: {message}")]
    Server { message: String },

    /// A remote resource (version, object) does not exist
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        resource_type: Option<String>,
    },

    /// A request exceeded its time budget
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// The function logic failed
    #[error("Function error: {message}")]
    Function { message: String },

    /// A rule could not be evaluated
    #[error("Rule error: {rule}: {message}")]
    Rule { rule: String, message: String },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },
}

impl AutomateError {
    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "AUTOMATE_INVALID_INPUT",
            Self::Json { .. } => "AUTOMATE_JSON",
            Self::Config { .. } => "AUTOMATE_CONFIG",
            Self::Http { .. } => "AUTOMATE_HTTP",
            Self::Auth { .. } => "AUTOMATE_AUTH",
            Self::Server { .. } => "AUTOMATE_SERVER",
            Self::NotFound { .. } => "AUTOMATE_NOT_FOUND",
            Self::Timeout { .. } => "AUTOMATE_TIMEOUT",
            Self::Function { .. } => "AUTOMATE_FUNCTION",
            Self::Rule { .. } => "AUTOMATE_RULE",
            Self::Io { .. } => "AUTOMATE_IO",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } | Self::Json { .. } | Self::Config { .. } => {
                ErrorCategory::Input
            }
            Self::Http { .. }
            | Self::Auth { .. }
            | Self::Server { .. }
            | Self::NotFound { .. }
            | Self::Timeout { .. } => ErrorCategory::Connectivity,
            Self::Function { .. } | Self::Rule { .. } | Self::Io { .. } => {
                ErrorCategory::Transformation
            }
        }
    }
}
