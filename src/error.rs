use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkbookError {
    /// The parse ran to completion but produced zero usable records.
    /// For revenue files the diagnostic carries the raw classification of the
    /// first rows so the caller can see what the file actually contained.
    #[error("No valid data found. {diagnostic}")]
    EmptyResult { diagnostic: String },

    #[error("Error parsing file: {0}")]
    MalformedInput(String),

    #[error("Unsupported file type '{0}': expected .xlsx or .xls")]
    UnrecognizedFileType(String),

    #[error("Invalid label table: {0}")]
    InvalidLabelTable(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WorkbookError>;
