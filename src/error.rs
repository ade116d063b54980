//! Error types for outr8.
//!
//! Policy violations carry stable machine-parseable codes so the API layer
//! can map them to its own error contract without string matching.

use thiserror::Error;

/// Result type alias for outr8 operations.
pub type Result<T> = std::result::Result<T, Error>;

/// outr8 error types.
///
/// `ExecutionCapExceeded` and `UnsupportedAction` are the two policy errors:
/// they terminate the current run immediately and are never retried inside
/// the engine. Everything else is plumbing.
#[derive(Error, Debug)]
pub enum Error {
    #[error("workflow error: {0}")]
    Workflow(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("action error: {0}")]
    Action(String),

    #[error("channel error: {0}")]
    Channel(String),

    #[error("observer error: {0}")]
    Observer(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unsupported_action: '{action}' is not on the action allow-list")]
    UnsupportedAction { action: String },

    #[error("execution_cap_exceeded: {requested} actions requested, cap is {max}")]
    ExecutionCapExceeded { requested: u32, max: u32 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Workflow(_) => "workflow_error",
            Error::Validation(_) => "validation_error",
            Error::Action(_) => "action_error",
            Error::Channel(_) => "channel_error",
            Error::Observer(_) => "observer_error",
            Error::Config(_) => "config_error",
            Error::Parse(_) => "parse_error",
            Error::UnsupportedAction { .. } => "unsupported_action",
            Error::ExecutionCapExceeded { .. } => "execution_cap_exceeded",
            Error::Json(_) => "json_error",
            Error::Yaml(_) => "yaml_error",
            Error::Io(_) => "io_error",
        }
    }

    /// Whether this error is a policy violation (cap or allow-list).
    ///
    /// Policy violations are fatal to the run and must surface to the caller
    /// as distinct error codes; they are never retried by the engine.
    pub fn is_policy(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedAction { .. } | Error::ExecutionCapExceeded { .. }
        )
    }
}
