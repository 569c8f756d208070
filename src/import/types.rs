// src/import/types.rs
//! Import pipeline data model and backend wire types

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{ImportError, Result};

// ===== Target fields =====

/// Designer profile attributes an import column can be mapped onto.
///
/// Declaration order is the template column order: required fields first,
/// then optional fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetField {
    Name,
    Title,
    Email,
    Level,
    Location,
    Company,
    LinkedinUrl,
    PortfolioUrl,
    Skills,
    Bio,
    Phone,
    YearsExperience,
}

impl TargetField {
    pub const ALL: [TargetField; 12] = [
        TargetField::Name,
        TargetField::Title,
        TargetField::Email,
        TargetField::Level,
        TargetField::Location,
        TargetField::Company,
        TargetField::LinkedinUrl,
        TargetField::PortfolioUrl,
        TargetField::Skills,
        TargetField::Bio,
        TargetField::Phone,
        TargetField::YearsExperience,
    ];

    pub const REQUIRED: [TargetField; 4] = [
        TargetField::Name,
        TargetField::Title,
        TargetField::Email,
        TargetField::Level,
    ];

    /// Column key used on the wire and in the CSV template.
    pub fn key(self) -> &'static str {
        match self {
            TargetField::Name => "name",
            TargetField::Title => "title",
            TargetField::Email => "email",
            TargetField::Level => "level",
            TargetField::Location => "location",
            TargetField::Company => "company",
            TargetField::LinkedinUrl => "linkedin_url",
            TargetField::PortfolioUrl => "portfolio_url",
            TargetField::Skills => "skills",
            TargetField::Bio => "bio",
            TargetField::Phone => "phone",
            TargetField::YearsExperience => "years_experience",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TargetField::Name => "Full Name",
            TargetField::Title => "Job Title",
            TargetField::Email => "Email",
            TargetField::Level => "Level",
            TargetField::Location => "Location",
            TargetField::Company => "Company",
            TargetField::LinkedinUrl => "LinkedIn URL",
            TargetField::PortfolioUrl => "Portfolio URL",
            TargetField::Skills => "Skills",
            TargetField::Bio => "Bio",
            TargetField::Phone => "Phone",
            TargetField::YearsExperience => "Years of Experience",
        }
    }

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }

    pub fn from_key(key: &str) -> Option<TargetField> {
        let key = key.trim().to_lowercase();
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Literal values of the example row in the downloadable template.
    pub fn example_value(self) -> &'static str {
        match self {
            TargetField::Name => "Jane Doe",
            TargetField::Title => "Senior Product Designer",
            TargetField::Email => "jane.doe@example.com",
            TargetField::Level => "senior",
            TargetField::Location => "San Francisco, CA",
            TargetField::Company => "Acme Design Co",
            TargetField::LinkedinUrl => "https://linkedin.com/in/janedoe",
            TargetField::PortfolioUrl => "https://janedoe.design",
            TargetField::Skills => "UI Design; Prototyping; Figma",
            TargetField::Bio => "Designer focused on \"human\" interfaces",
            TargetField::Phone => "+1 555 0100",
            TargetField::YearsExperience => "8",
        }
    }
}

impl std::fmt::Display for TargetField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

// ===== CSV side =====

/// One source record: column name to raw value, in source column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow {
    fields: Vec<(String, String)>,
}

impl ImportRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. A repeated column keeps its first position and takes the new value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for ImportRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Association between a source column and a designer attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub source_column: String,
    pub target_field: Option<TargetField>,
}

impl FieldMapping {
    pub fn new(source_column: impl Into<String>, target_field: Option<TargetField>) -> Self {
        Self {
            source_column: source_column.into(),
            target_field,
        }
    }
}

// ===== Uploads =====

/// A file selected for import, fully read into memory.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime,
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("size", &self.bytes.len())
            .finish()
    }
}

// ===== PDF side =====

/// A contact returned by the remote extraction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContact {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        default,
        alias = "linkedinUrl",
        alias = "profileLink",
        skip_serializing_if = "Option::is_none"
    )]
    pub profile_url: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    pub confidence: f64,
}

impl ExtractedContact {
    pub fn new(name: impl Into<String>, confidence: f64) -> Self {
        Self {
            name: name.into(),
            title: None,
            company: None,
            location: None,
            email: None,
            profile_url: None,
            skills: Vec::new(),
            experience: None,
            confidence,
        }
    }

    /// Reject records the extractor should never have produced.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("contact without a name".to_string());
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!(
                "confidence {} for '{}' is outside [0, 1]",
                self.confidence, self.name
            ));
        }
        Ok(())
    }
}

/// Outcome of one file in a PDF batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub file_name: String,
    pub success: bool,
    pub contacts: Vec<ExtractedContact>,
    pub total_pages: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingResult {
    pub fn succeeded(file_name: &str, extraction: PdfExtraction) -> Self {
        Self {
            file_name: file_name.to_string(),
            success: true,
            contacts: extraction.contacts,
            total_pages: extraction.total_pages,
            warnings: extraction.warnings,
            error: None,
        }
    }

    pub fn failed(file_name: &str, error: String) -> Self {
        Self {
            file_name: file_name.to_string(),
            success: false,
            contacts: Vec::new(),
            total_pages: 0,
            warnings: Vec::new(),
            error: Some(error),
        }
    }
}

/// Validated content of a successful `/api/import/pdf/process` call.
#[derive(Debug, Clone, Default)]
pub struct PdfExtraction {
    pub contacts: Vec<ExtractedContact>,
    pub total_pages: u32,
    pub warnings: Vec<String>,
}

// ===== Results =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: String,
    pub error: String,
}

/// Outcome of one submission. Built once from the backend response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    imported: u32,
    skipped: u32,
    errors: Vec<RowError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    completed_at: DateTime<Utc>,
}

impl ImportResult {
    pub fn new(imported: u32, skipped: u32, errors: Vec<RowError>, message: Option<String>) -> Self {
        Self {
            imported,
            skipped,
            errors,
            message,
            completed_at: Utc::now(),
        }
    }

    pub fn imported(&self) -> u32 {
        self.imported
    }

    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    pub fn errors(&self) -> &[RowError] {
        &self.errors
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Some rows failed while the submission as a whole went through.
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Cached designer directory queries are stale after this submission.
    pub fn invalidates_directory(&self) -> bool {
        self.imported > 0
    }
}

// ===== Backend wire types =====

#[derive(Debug, Deserialize)]
pub struct CsvImportResponse {
    pub success: bool,
    #[serde(default)]
    pub imported: u32,
    #[serde(default)]
    pub errors: Vec<CsvRowErrorWire>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CsvRowErrorWire {
    pub row: serde_json::Value,
    pub error: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfProcessResponse {
    pub success: bool,
    #[serde(default)]
    pub contacts: Vec<ExtractedContact>,
    #[serde(default)]
    pub total_pages: u32,
    pub errors: Option<Vec<String>>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PdfImportResponse {
    pub success: bool,
    #[serde(default)]
    pub imported: u32,
    #[serde(default)]
    pub skipped: u32,
    #[serde(default)]
    pub errors: Vec<ContactErrorWire>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContactErrorWire {
    pub contact: serde_json::Value,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct PdfImportRequest<'a> {
    pub contacts: &'a [ExtractedContact],
}

/// Human identifier for a row or contact reference in an error list.
pub fn identify_row(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Number(n) => format!("Row {}", n),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("email"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| value.to_string()),
        serde_json::Value::Null => "Unknown".to_string(),
        other => other.to_string(),
    }
}

impl CsvImportResponse {
    pub fn into_result(self) -> Result<ImportResult> {
        if !self.success {
            return Err(ImportError::Rejected(
                self.message.unwrap_or_else(|| "Import failed".to_string()),
            ));
        }
        let errors: Vec<RowError> = self
            .errors
            .into_iter()
            .map(|e| RowError {
                row: identify_row(&e.row),
                error: e.error,
            })
            .collect();
        // The CSV endpoint reports failures only as errors; each failed row was skipped.
        let skipped = errors.len() as u32;
        Ok(ImportResult::new(self.imported, skipped, errors, self.message))
    }
}

impl PdfImportResponse {
    pub fn into_result(self) -> Result<ImportResult> {
        if !self.success {
            return Err(ImportError::Rejected(
                self.message.unwrap_or_else(|| "Import failed".to_string()),
            ));
        }
        let errors = self
            .errors
            .into_iter()
            .map(|e| RowError {
                row: identify_row(&e.contact),
                error: e.error,
            })
            .collect();
        Ok(ImportResult::new(
            self.imported,
            self.skipped,
            errors,
            self.message,
        ))
    }
}

impl PdfProcessResponse {
    pub fn into_extraction(self, endpoint: &str) -> Result<PdfExtraction> {
        if !self.success {
            return Err(ImportError::Rejected(
                self.message
                    .unwrap_or_else(|| "Failed to process PDF".to_string()),
            ));
        }
        for contact in &self.contacts {
            contact
                .validate()
                .map_err(|reason| ImportError::MalformedResponse {
                    endpoint: endpoint.to_string(),
                    reason,
                })?;
        }
        Ok(PdfExtraction {
            contacts: self.contacts,
            total_pages: self.total_pages,
            warnings: self.errors.unwrap_or_default(),
        })
    }
}
