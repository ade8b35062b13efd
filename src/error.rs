//! Error types for the analysis pipeline

use thiserror::Error;

/// Errors that can occur while loading, analysing or rendering a dataset
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Render error: {0}")]
    Render(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// A specialized Result type for analysis operations
pub type Result<T> = std::result::Result<T, Error>;
