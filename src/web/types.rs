// src/web/types.rs

use rocket::form::FromForm;
use rocket::fs::TempFile;
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::{Request, Response};

use crate::core::ServiceConfig;
use crate::error::ImportError;
use crate::import::{
    BatchOutcome, ConfidenceSummary, ExtractedContact, FieldMapping, ImportResult, ImportRow,
    TargetField,
};

pub struct ServerConfig {
    pub service: ServiceConfig,
}

/// CSV body served as a download.
pub struct CsvResponse {
    pub data: String,
    pub filename: Option<String>,
}

impl CsvResponse {
    pub fn with_filename(data: String, filename: String) -> Self {
        Self {
            data,
            filename: Some(filename),
        }
    }
}

impl<'r> Responder<'r, 'static> for CsvResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let mut binding = Response::build();
        let mut response = binding
            .header(ContentType::CSV)
            .sized_body(self.data.len(), std::io::Cursor::new(self.data));

        if let Some(filename) = self.filename {
            response = response.raw_header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", filename),
            );
        }

        response.ok()
    }
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Data,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

/// Error half of every handler result.
pub type ApiError = (Status, Json<StandardErrorResponse>);

impl TextResponse {
    pub fn success(message: String) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message,
        }
    }
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
        }
    }
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
        }
    }
}

impl From<&ImportError> for StandardErrorResponse {
    fn from(err: &ImportError) -> Self {
        Self::new(err.to_string(), err.code().to_string(), err.suggestions())
    }
}

/// HTTP status for a pipeline error.
pub fn status_for(err: &ImportError) -> Status {
    match err {
        ImportError::Validation(_)
        | ImportError::EmptyBatch
        | ImportError::InvalidWorkspace(_)
        | ImportError::Csv(_) => Status::BadRequest,
        ImportError::IncompleteMapping(_) | ImportError::Rejected(_) => Status::UnprocessableEntity,
        ImportError::Transport { .. } | ImportError::MalformedResponse { .. } => Status::BadGateway,
        ImportError::Http(_) => Status::ServiceUnavailable,
        ImportError::Encode(_) | ImportError::Io { .. } => Status::InternalServerError,
    }
}

pub fn api_error(err: ImportError) -> ApiError {
    (status_for(&err), Json(StandardErrorResponse::from(&err)))
}

// ===== Forms =====

#[derive(FromForm)]
pub struct CsvPreviewForm<'f> {
    pub file: TempFile<'f>,
}

#[derive(FromForm)]
pub struct CsvImportForm<'f> {
    pub file: TempFile<'f>,
    /// JSON `[{sourceColumn, targetField}]`. Auto-mapped from the headers when absent.
    pub mapping: Option<String>,
}

#[derive(FromForm)]
pub struct PdfBatchForm<'f> {
    pub files: Vec<TempFile<'f>>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct PdfSubmitRequest {
    pub contacts: Vec<ExtractedContact>,
}

// ===== Response payloads =====

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct CsvPreviewData {
    pub headers: Vec<String>,
    pub rows: Vec<ImportRow>,
    pub total_rows: usize,
    pub mappings: Vec<FieldMapping>,
    pub mapped_required: Vec<TargetField>,
    pub missing_required: Vec<TargetField>,
    pub complete: bool,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct PdfBatchData {
    #[serde(flatten)]
    pub outcome: BatchOutcome,
    pub confidence: ConfidenceSummary,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct ImportResultData {
    #[serde(flatten)]
    pub result: ImportResult,
    pub invalidates_directory: bool,
}

impl From<ImportResult> for ImportResultData {
    fn from(result: ImportResult) -> Self {
        Self {
            invalidates_directory: result.invalidates_directory(),
            result,
        }
    }
}
