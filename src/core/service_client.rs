// src/core/service_client.rs
//! HTTP client for the Tapestry import endpoints

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::{error, info, trace};

use crate::error::{ImportError, Result};
use crate::import::orchestrator::ImportBackend;
use crate::import::types::{
    CsvImportResponse, ExtractedContact, FieldMapping, ImportResult, PdfExtraction,
    PdfImportRequest, PdfImportResponse, PdfProcessResponse, UploadFile,
};
use crate::workspace::{WorkspaceContext, WORKSPACE_HEADER};

const IMPORT_DESIGNERS_ENDPOINT: &str = "/api/admin/import-designers";
const PDF_PROCESS_ENDPOINT: &str = "/api/import/pdf/process";
const PDF_IMPORT_ENDPOINT: &str = "/api/import/pdf/import";

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
    workspace: WorkspaceContext,
}

impl ServiceClient {
    /// Create a client bound to one workspace. Without a timeout the reqwest defaults apply.
    pub fn new(
        base_url: &str,
        timeout: Option<Duration>,
        workspace: WorkspaceContext,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            workspace,
        })
    }

    pub fn workspace(&self) -> &WorkspaceContext {
        &self.workspace
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// 1. CSV import - sends file + mapping, receives per-row results
    pub async fn import_designers_csv(
        &self,
        file: &UploadFile,
        mappings: &[FieldMapping],
    ) -> Result<ImportResult> {
        let mapping_json = serde_json::to_string(mappings)?;

        let form = Form::new()
            .part("file", file_part(file, "text/csv")?)
            .text("mapping", mapping_json);

        info!(
            "Importing designers CSV {} ({} bytes) into workspace {}",
            file.name,
            file.size(),
            self.workspace
        );

        let request = self
            .client
            .post(self.url(IMPORT_DESIGNERS_ENDPOINT))
            .header(WORKSPACE_HEADER, self.workspace.slug())
            .multipart(form);

        let response: CsvImportResponse = self.send(IMPORT_DESIGNERS_ENDPOINT, request).await?;
        response.into_result()
    }

    /// 2. PDF extraction - sends one PDF, receives extracted contacts
    pub async fn process_pdf(&self, file: &UploadFile) -> Result<PdfExtraction> {
        let form = Form::new().part("file", file_part(file, "application/pdf")?);

        info!(
            "Extracting contacts from {} ({} bytes) for workspace {}",
            file.name,
            file.size(),
            self.workspace
        );

        let request = self
            .client
            .post(self.url(PDF_PROCESS_ENDPOINT))
            .header(WORKSPACE_HEADER, self.workspace.slug())
            .multipart(form);

        let response: PdfProcessResponse = self.send(PDF_PROCESS_ENDPOINT, request).await?;
        response.into_extraction(PDF_PROCESS_ENDPOINT)
    }

    /// 3. Bulk contact import - sends the accumulated contacts once
    pub async fn import_contacts(&self, contacts: &[ExtractedContact]) -> Result<ImportResult> {
        info!(
            "Submitting {} extracted contacts to workspace {}",
            contacts.len(),
            self.workspace
        );

        let request = self
            .client
            .post(self.url(PDF_IMPORT_ENDPOINT))
            .header(WORKSPACE_HEADER, self.workspace.slug())
            .json(&PdfImportRequest { contacts });

        let response: PdfImportResponse = self.send(PDF_IMPORT_ENDPOINT, request).await?;
        response.into_result()
    }

    /// Send a request and decode the body into a typed response.
    ///
    /// Non-2xx statuses surface the raw body text. 2xx bodies that do not match
    /// the expected shape are reported as malformed.
    async fn send<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<R> {
        let response = request.send().await?;
        let status = response.status();
        trace!("{} responded with status {}", endpoint, status);

        let body = response.text().await?;

        if !status.is_success() {
            error!("{} returned error status {}: {}", endpoint, status, body);
            return Err(ImportError::Transport { status, body });
        }

        serde_json::from_str(&body).map_err(|e| {
            error!("Unexpected response from {}: {}", endpoint, body);
            ImportError::MalformedResponse {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

fn file_part(file: &UploadFile, fallback_mime: &str) -> Result<Part> {
    let mime = file.mime().unwrap_or(fallback_mime);
    Ok(Part::bytes(file.bytes.clone())
        .file_name(file.name.clone())
        .mime_str(mime)?)
}

#[async_trait::async_trait]
impl ImportBackend for ServiceClient {
    async fn process_pdf(&self, file: &UploadFile) -> Result<PdfExtraction> {
        ServiceClient::process_pdf(self, file).await
    }

    async fn import_contacts(&self, contacts: &[ExtractedContact]) -> Result<ImportResult> {
        ServiceClient::import_contacts(self, contacts).await
    }

    async fn import_designers_csv(
        &self,
        file: &UploadFile,
        mappings: &[FieldMapping],
    ) -> Result<ImportResult> {
        ServiceClient::import_designers_csv(self, file, mappings).await
    }
}
