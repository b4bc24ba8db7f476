use crate::domain::chart::{ChartKind, ColumnRequirement};
use crate::domain::locale::Language;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppError {
    Internal(String),
    NotFound(String),
    ValidationError(String),
    LoadError(String),
    UnsupportedVisualization {
        kind: ChartKind,
        requirement: ColumnRequirement,
    },
    LLMError(String),
    ConfigError(String),
    IoError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::LoadError(msg) => write!(f, "Load error: {}", msg),
            AppError::UnsupportedVisualization { kind, requirement } => write!(
                f,
                "Unsupported visualization: {} chart requires {}",
                kind, requirement
            ),
            AppError::LLMError(msg) => write!(f, "LLM error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl AppError {
    /// Stable machine-readable code used by the HTTP layer.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Internal(_) => "internal",
            AppError::NotFound(_) => "not_found",
            AppError::ValidationError(_) => "validation",
            AppError::LoadError(_) => "load",
            AppError::UnsupportedVisualization { .. } => "unsupported_visualization",
            AppError::LLMError(_) => "external_service",
            AppError::ConfigError(_) => "config",
            AppError::IoError(_) => "io",
        }
    }

    /// User-facing message in the given language. The underlying detail is kept
    /// for load and external service failures so the user sees the cause.
    pub fn localized(&self, lang: Language) -> String {
        let texts = lang.messages();
        match self {
            AppError::UnsupportedVisualization { kind, requirement } => {
                lang.unsupported_chart_message(*kind, *requirement)
            }
            AppError::LoadError(msg) => format!("{}: {}", texts.invalid_file, msg),
            AppError::LLMError(msg) => format!("{}: {}", texts.error_occurred, msg),
            AppError::ValidationError(msg) => msg.clone(),
            AppError::NotFound(msg) => format!("{}: {}", texts.not_found, msg),
            AppError::Internal(_) | AppError::ConfigError(_) | AppError::IoError(_) => {
                texts.processing_error.to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
