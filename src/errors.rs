use serde::Serialize;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Path traversal detected: {0}")]
    PathTraversal(String),
    #[error("Symbolic link not allowed: {0}")]
    SymlinkNotAllowed(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Is a directory: {0}")]
    IsADirectory(String),
    #[error("{0} appears to be binary. Use checksum command instead")]
    BinaryFile(String),
    #[error("Invalid JSON: {message} at line {line}, column {column}")]
    InvalidJson { message: String, line: usize, column: usize },
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("IO error: {0}")]
    Io(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub code: &'a str,
    pub message: &'a str,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::PathTraversal(_) => "PathTraversal",
            AppError::SymlinkNotAllowed(_) => "SymlinkNotAllowed",
            AppError::NotFound(_) => "NotFound",
            AppError::IsADirectory(_) => "IsADirectory",
            AppError::BinaryFile(_) => "BinaryFile",
            AppError::InvalidJson { .. } => "InvalidJSON",
            AppError::UnsupportedAlgorithm(_) => "UnsupportedAlgorithm",
            AppError::InvalidArgument(_) => "InvalidArgument",
            AppError::Io(_) => "IOError",
        }
    }

    /// Maps an OS error on `path` onto the taxonomy.
    pub fn from_io(err: io::Error, path: &str) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => AppError::NotFound(path.to_string()),
            _ => AppError::Io(format!("{path}: {err}")),
        }
    }

    /// Taxonomy errors are reported plainly; only `Io` counts as unexpected.
    pub fn is_expected(&self) -> bool {
        !matches!(self, AppError::Io(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;

pub fn into_json(err: &AppError) -> serde_json::Value {
    let message = err.to_string();
    serde_json::json!({ "error": ErrorBody { code: err.code(), message: &message } })
}
