// src/utils/error.rs
use std::path::PathBuf;
use thiserror::Error;

// Failures while turning a PDF file into Document Text.
// All variants surface identically as `{"error": "<message>"}`.
#[derive(Error, Debug)]
pub enum ExtractionFailure {
    #[error("Failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse PDF {}: {message}", path.display())]
    Pdf { path: PathBuf, message: String },

    #[error("Failed to extract text from page {page}: {message}")]
    PageText { page: u32, message: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// Failures writing the report itself. Extraction failures become an error report,
// storage failures are only logged.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
