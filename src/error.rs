use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

pub type PlannerResult<T> = Result<T, PlannerError>;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        details: Option<JsonValue>,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("date arithmetic out of range: {0}")]
    DateArithmetic(String),

    #[error("timeline rejected block: {0}")]
    Timeline(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl PlannerError {
    pub fn validation_with_details(message: impl Into<String>, details: JsonValue) -> Self {
        let message = message.into();
        warn!(target: "planner::validation", %message, details = %details, "validation error with details");
        PlannerError::Validation {
            message,
            details: Some(details),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "planner::config", %message, "configuration error");
        PlannerError::Config(message)
    }

    /// Built inside planning stages, which report it through the plan observer
    /// instead of logging here.
    pub fn date_arithmetic(message: impl Into<String>) -> Self {
        PlannerError::DateArithmetic(message.into())
    }

    /// Silent like [`PlannerError::date_arithmetic`].
    pub fn timeline(message: impl Into<String>) -> Self {
        PlannerError::Timeline(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "planner::other", %message, "other error");
        PlannerError::Other(message)
    }
}
