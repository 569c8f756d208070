// src/web/handlers/system_handlers.rs
use crate::web::types::*;

use rocket::serde::json::Json;
use tracing::info;

pub async fn health_handler() -> Json<TextResponse> {
    info!("Health check");
    Json(TextResponse::success(format!(
        "{} {} is running",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )))
}
