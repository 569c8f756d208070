// src/import/mod.rs
//! Contact import pipeline: parse, map, validate, extract, submit, present

pub mod csv_parser;
pub mod field_mapper;
pub mod orchestrator;
pub mod presenter;
pub mod session;
pub mod template;
pub mod types;
pub mod validation;

pub use csv_parser::{parse_csv, ParsedCsv, PREVIEW_ROW_COUNT};
pub use field_mapper::{suggest_target, FieldMappingSet};
pub use orchestrator::{BatchImporter, BatchOutcome, BatchProgress, ImportBackend};
pub use presenter::{ConfidenceSummary, ConfidenceTier};
pub use session::ImportSession;
pub use template::{generate_template, TEMPLATE_FILE_NAME};
pub use types::{
    ExtractedContact, FieldMapping, ImportResult, ImportRow, ProcessingResult, RowError,
    TargetField, UploadFile,
};
