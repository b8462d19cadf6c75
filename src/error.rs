use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("No date range found in request: {0:?}")]
    DateNotFound(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Text generation failed: {0}")]
    Generation(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "ollama")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
