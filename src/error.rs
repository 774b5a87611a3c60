use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("File '{}' not found", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Error loading data: {message}")]
    Load { message: String },

    #[error("Missing columns: {missing:?}")]
    Schema { missing: Vec<String> },

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("No records to analyze")]
    EmptyDataset,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Chart rendering error: {0}")]
    Visualization(String),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalysisError {
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load {
            message: message.into(),
        }
    }

    /// Wrap a plotters drawing error, which is generic over the backend.
    pub fn visualization<E: std::fmt::Display>(err: E) -> Self {
        Self::Visualization(err.to_string())
    }
}
