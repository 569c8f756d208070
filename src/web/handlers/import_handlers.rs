// src/web/handlers/import_handlers.rs
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info, warn};

use crate::core::ServiceClient;
use crate::error::ImportError;
use crate::import::presenter::{render_import_result, render_processing_results};
use crate::import::validation::validate_csv_upload;
use crate::import::{
    generate_template, parse_csv, BatchImporter, ConfidenceSummary, FieldMapping,
    FieldMappingSet, UploadFile, TEMPLATE_FILE_NAME,
};
use crate::web::types::*;
use crate::workspace::WorkspaceContext;

pub async fn template_handler(workspace: &str) -> Result<CsvResponse, ApiError> {
    let workspace = workspace_context(workspace)?;
    info!("Serving CSV template for workspace {}", workspace);

    let template = generate_template().map_err(api_error)?;
    Ok(CsvResponse::with_filename(
        template,
        TEMPLATE_FILE_NAME.to_string(),
    ))
}

pub async fn csv_preview_handler(
    workspace: &str,
    mut upload: Form<CsvPreviewForm<'_>>,
) -> Result<Json<DataResponse<CsvPreviewData>>, ApiError> {
    let workspace = workspace_context(workspace)?;

    let file = read_temp_file(&mut upload.file, "upload.csv")
        .await
        .map_err(api_error)?;
    validate_csv_upload(&file).map_err(api_error)?;

    let parsed = parse_csv(&String::from_utf8_lossy(&file.bytes)).map_err(api_error)?;
    let mappings = FieldMappingSet::auto_map(&parsed.headers);
    info!(
        "Previewed {} for workspace {}: {} columns, {} rows",
        file.name,
        workspace,
        parsed.headers.len(),
        parsed.row_count()
    );

    let data = CsvPreviewData {
        mapped_required: mappings.mapped_required_fields().into_iter().collect(),
        missing_required: mappings.missing_required_fields(),
        complete: mappings.is_complete(),
        rows: parsed.preview().to_vec(),
        total_rows: parsed.row_count(),
        headers: parsed.headers,
        mappings: mappings.into_mappings(),
    };

    Ok(Json(DataResponse::success(
        format!("Found {} row(s) in {}", data.total_rows, file.name),
        data,
    )))
}

pub async fn csv_import_handler(
    workspace: &str,
    mut upload: Form<CsvImportForm<'_>>,
    config: &State<ServerConfig>,
) -> Result<Json<DataResponse<ImportResultData>>, ApiError> {
    let workspace = workspace_context(workspace)?;

    let file = read_temp_file(&mut upload.file, "upload.csv")
        .await
        .map_err(api_error)?;
    validate_csv_upload(&file).map_err(api_error)?;

    let parsed = parse_csv(&String::from_utf8_lossy(&file.bytes)).map_err(api_error)?;
    let mappings = match upload.mapping.as_deref() {
        Some(raw) => {
            let mut mappings = parse_mapping(raw)?;
            for column in mappings.retain_columns(&parsed.headers) {
                warn!("Ignoring mapping for unknown column '{}' in {}", column, file.name);
            }
            mappings
        }
        None => FieldMappingSet::auto_map(&parsed.headers),
    };

    let client = service_client(config, workspace)?;
    let result = BatchImporter::new(&client)
        .submit_csv(&file, &mappings)
        .await
        .map_err(|e| {
            error!("CSV import of {} failed: {}", file.name, e);
            api_error(e)
        })?;

    let message = render_import_result(&result).trim_end().to_string();
    Ok(Json(DataResponse::success(message, result.into())))
}

pub async fn pdf_process_handler(
    workspace: &str,
    mut upload: Form<PdfBatchForm<'_>>,
    config: &State<ServerConfig>,
) -> Result<Json<DataResponse<PdfBatchData>>, ApiError> {
    let workspace = workspace_context(workspace)?;
    info!(
        "Received {} PDF(s) for workspace {}",
        upload.files.len(),
        workspace
    );

    let mut files = Vec::with_capacity(upload.files.len());
    for (index, temp) in upload.files.iter_mut().enumerate() {
        let fallback = format!("upload_{}.pdf", index + 1);
        files.push(read_temp_file(temp, &fallback).await.map_err(api_error)?);
    }

    let client = service_client(config, workspace)?;
    let outcome = BatchImporter::new(&client)
        .process_files(&files, |progress| {
            info!(
                "Processed {} ({}/{}, {}%)",
                progress.current_file,
                progress.completed,
                progress.total,
                progress.percent()
            );
        })
        .await
        .map_err(api_error)?;

    let message = render_processing_results(&outcome.results)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string();
    let confidence = ConfidenceSummary::from_contacts(&outcome.contacts);

    Ok(Json(DataResponse::success(
        message,
        PdfBatchData {
            outcome,
            confidence,
        },
    )))
}

pub async fn pdf_submit_handler(
    workspace: &str,
    request: Json<PdfSubmitRequest>,
    config: &State<ServerConfig>,
) -> Result<Json<DataResponse<ImportResultData>>, ApiError> {
    let workspace = workspace_context(workspace)?;
    let contacts = request.into_inner().contacts;

    if contacts.is_empty() {
        warn!("Rejected empty contact submission for workspace {}", workspace);
        return Err((
            Status::BadRequest,
            Json(StandardErrorResponse::new(
                "No contacts to import".to_string(),
                "NO_CONTACTS".to_string(),
                vec!["Process at least one PDF before importing".to_string()],
            )),
        ));
    }

    if let Some(reason) = contacts.iter().find_map(|c| c.validate().err()) {
        return Err((
            Status::BadRequest,
            Json(StandardErrorResponse::new(
                format!("Invalid contact: {}", reason),
                "INVALID_CONTACT".to_string(),
                vec!["Re-process the PDF and review the extracted contacts".to_string()],
            )),
        ));
    }

    let client = service_client(config, workspace)?;
    let result = BatchImporter::new(&client)
        .submit_contacts(&contacts)
        .await
        .map_err(|e| {
            error!("Bulk import of {} contacts failed: {}", contacts.len(), e);
            api_error(e)
        })?;

    let message = render_import_result(&result).trim_end().to_string();
    Ok(Json(DataResponse::success(message, result.into())))
}

fn workspace_context(slug: &str) -> Result<WorkspaceContext, ApiError> {
    WorkspaceContext::new(slug).map_err(|e| {
        warn!("Rejected request for workspace '{}': {}", slug, e);
        api_error(e)
    })
}

fn service_client(
    config: &State<ServerConfig>,
    workspace: WorkspaceContext,
) -> Result<ServiceClient, ApiError> {
    ServiceClient::new(
        &config.service.api_base_url,
        config.service.timeout,
        workspace,
    )
    .map_err(|e| {
        error!("Failed to initialize service client: {}", e);
        api_error(e)
    })
}

fn parse_mapping(raw: &str) -> Result<FieldMappingSet, ApiError> {
    serde_json::from_str::<Vec<FieldMapping>>(raw)
        .map(FieldMappingSet::from)
        .map_err(|e| {
            warn!("Rejected malformed mapping: {}", e);
            (
                Status::BadRequest,
                Json(StandardErrorResponse::new(
                    format!("Invalid column mapping: {}", e),
                    "INVALID_MAPPING".to_string(),
                    vec![
                        "Send mapping as [{\"sourceColumn\": ..., \"targetField\": ...}]"
                            .to_string(),
                    ],
                )),
            )
        })
}

/// Copy an uploaded form file into memory.
async fn read_temp_file(
    file: &mut TempFile<'_>,
    fallback_name: &str,
) -> std::result::Result<UploadFile, ImportError> {
    let name = file
        .raw_name()
        .map(|n| n.dangerous_unsafe_unsanitized_raw().as_str())
        .and_then(|raw| raw.rsplit(['/', '\\']).next())
        .filter(|n| !n.is_empty())
        .unwrap_or(fallback_name)
        .to_string();
    let mime = file.content_type().map(|ct| ct.to_string());

    let temp_path = std::env::temp_dir().join(format!("tapestry_upload_{}", uuid::Uuid::new_v4()));
    file.copy_to(&temp_path)
        .await
        .map_err(|e| ImportError::io(&name, e))?;
    let bytes = tokio::fs::read(&temp_path).await;
    let _ = tokio::fs::remove_file(&temp_path).await;
    let bytes = bytes.map_err(|e| ImportError::io(&name, e))?;

    Ok(UploadFile::new(name, mime, bytes))
}
