// src/error.rs
//! Error types for the import pipeline

use crate::import::types::TargetField;
use serde::Serialize;

/// A file refused by the client-side gates before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRejection {
    pub file_name: String,
    pub reason: String,
}

impl std::fmt::Display for FileRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.file_name, self.reason)
    }
}

/// Coarse classification of an [`ImportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong file type, oversized file, incomplete mapping. Nothing was sent.
    Validation,
    /// Non-2xx response or network failure. Never retried.
    Transport,
    /// The server answered 2xx but the body was unusable or refused the import.
    Server,
    /// Local I/O or parsing failure.
    Local,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("{}", describe_rejections(.0))]
    Validation(Vec<FileRejection>),

    #[error("No files selected")]
    EmptyBatch,

    #[error("Required fields are not mapped: {}", join_fields(.0))]
    IncompleteMapping(Vec<TargetField>),

    #[error("{body}")]
    Transport {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{0}")]
    Rejected(String),

    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid workspace: {0}")]
    InvalidWorkspace(String),
}

impl ImportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::Validation(_)
            | ImportError::EmptyBatch
            | ImportError::IncompleteMapping(_)
            | ImportError::InvalidWorkspace(_) => ErrorKind::Validation,
            ImportError::Transport { .. } | ImportError::Http(_) => ErrorKind::Transport,
            ImportError::Rejected(_) | ImportError::MalformedResponse { .. } => ErrorKind::Server,
            ImportError::Csv(_) | ImportError::Encode(_) | ImportError::Io { .. } => {
                ErrorKind::Local
            }
        }
    }

    /// Stable code used in gateway error responses.
    pub fn code(&self) -> &'static str {
        match self {
            ImportError::Validation(_) => "INVALID_FILE",
            ImportError::EmptyBatch => "NO_FILES",
            ImportError::IncompleteMapping(_) => "INCOMPLETE_MAPPING",
            ImportError::Transport { .. } => "UPSTREAM_ERROR",
            ImportError::Rejected(_) => "IMPORT_REJECTED",
            ImportError::MalformedResponse { .. } => "MALFORMED_RESPONSE",
            ImportError::Http(_) => "SERVICE_UNAVAILABLE",
            ImportError::Csv(_) => "CSV_PARSE_ERROR",
            ImportError::Encode(_) => "REQUEST_ENCODING_ERROR",
            ImportError::Io { .. } => "FILE_READ_ERROR",
            ImportError::InvalidWorkspace(_) => "INVALID_WORKSPACE",
        }
    }

    pub fn suggestions(&self) -> Vec<String> {
        let hints: &[&str] = match self {
            ImportError::Validation(_) => &[
                "Only PDF files up to 10MB are accepted for PDF import",
                "CSV import accepts .csv files",
            ],
            ImportError::EmptyBatch => &["Select at least one file"],
            ImportError::IncompleteMapping(_) => &[
                "Map a column to every required field",
                "Download the CSV template to see the expected columns",
            ],
            ImportError::Transport { .. } | ImportError::Http(_) => &[
                "Try the upload again",
                "Contact support if the problem persists",
            ],
            ImportError::Rejected(_) | ImportError::MalformedResponse { .. } => {
                &["Try again in a few moments"]
            }
            ImportError::Csv(_) => &["Check that the file is valid comma-separated text"],
            ImportError::Encode(_) => &["Contact support if the problem persists"],
            ImportError::Io { .. } => &["Try uploading the file again"],
            ImportError::InvalidWorkspace(_) => &["Open the import page from a workspace"],
        };
        hints.iter().map(|h| h.to_string()).collect()
    }

    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        ImportError::Io {
            path: path.into(),
            source,
        }
    }
}

fn describe_rejections(rejections: &[FileRejection]) -> String {
    rejections
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_fields(fields: &[TargetField]) -> String {
    fields
        .iter()
        .map(|f| f.key())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, ImportError>;
