// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use types::*;

use crate::core::ConfigManager;
use anyhow::Result;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::Form;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use tracing::info;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// Import routes, all scoped to a workspace segment: /api/<workspace>/import/...

#[get("/<workspace>/import/template")]
pub async fn download_template(workspace: &str) -> Result<CsvResponse, ApiError> {
    handlers::template_handler(workspace).await
}

#[post("/<workspace>/import/csv/preview", data = "<upload>")]
pub async fn preview_csv(
    workspace: &str,
    upload: Form<CsvPreviewForm<'_>>,
) -> Result<Json<DataResponse<CsvPreviewData>>, ApiError> {
    handlers::csv_preview_handler(workspace, upload).await
}

#[post("/<workspace>/import/csv", data = "<upload>")]
pub async fn import_csv(
    workspace: &str,
    upload: Form<CsvImportForm<'_>>,
    config: &State<ServerConfig>,
) -> Result<Json<DataResponse<ImportResultData>>, ApiError> {
    handlers::csv_import_handler(workspace, upload, config).await
}

#[post("/<workspace>/import/pdf/process", data = "<upload>")]
pub async fn process_pdfs(
    workspace: &str,
    upload: Form<PdfBatchForm<'_>>,
    config: &State<ServerConfig>,
) -> Result<Json<DataResponse<PdfBatchData>>, ApiError> {
    handlers::pdf_process_handler(workspace, upload, config).await
}

#[post("/<workspace>/import/pdf/submit", format = "json", data = "<request>")]
pub async fn submit_contacts(
    workspace: &str,
    request: Json<PdfSubmitRequest>,
    config: &State<ServerConfig>,
) -> Result<Json<DataResponse<ImportResultData>>, ApiError> {
    handlers::pdf_submit_handler(workspace, request, config).await
}

#[get("/health")]
pub async fn health() -> Json<TextResponse> {
    handlers::health_handler().await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Send files as multipart/form-data".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Endpoint not found".to_string(),
        "NOT_FOUND".to_string(),
        vec!["Import endpoints live under /api/<workspace>/import".to_string()],
    ))
}

#[rocket::catch(413)]
pub fn payload_too_large() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Upload is too large".to_string(),
        "PAYLOAD_TOO_LARGE".to_string(),
        vec![
            "PDF files must be 10MB or smaller".to_string(),
            "Split large batches into several uploads".to_string(),
        ],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body could not be understood".to_string(),
        "UNPROCESSABLE".to_string(),
        vec!["Check your request JSON format".to_string()],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

/// Assemble the gateway. Upload limits sit above the 10MB PDF cap so oversized
/// files reach the import validation and get a proper error.
pub fn build_rocket(server_config: ServerConfig, port: u16) -> Rocket<Build> {
    let limits = Limits::default()
        .limit("file", 32.mebibytes())
        .limit("data-form", 128.mebibytes())
        .limit("json", 8.mebibytes());

    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("address", "0.0.0.0"))
        .merge(("limits", limits));

    rocket::custom(figment)
        .attach(Cors)
        .manage(server_config)
        .register(
            "/api",
            catchers![
                bad_request,
                not_found,
                payload_too_large,
                unprocessable,
                internal_error
            ],
        )
        .mount(
            "/api",
            routes![
                download_template,
                preview_csv,
                import_csv,
                process_pdfs,
                submit_contacts,
                health,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: &ConfigManager) -> Result<()> {
    let server_config = ServerConfig {
        service: config.service.clone(),
    };

    info!("Starting Tapestry import gateway");
    info!("Directory API: {}", server_config.service.api_base_url);
    info!("Server: http://0.0.0.0:{}", config.port());

    let _rocket = build_rocket(server_config, config.port())
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Import gateway failed: {}", e))?;

    Ok(())
}
