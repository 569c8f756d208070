// src/import/template.rs
//! Downloadable CSV template for designer imports

use super::types::TargetField;
use crate::error::{ImportError, Result};

pub const TEMPLATE_FILE_NAME: &str = "designers_template.csv";

/// Header row of the template: required fields, then optional fields.
pub fn template_headers() -> Vec<&'static str> {
    TargetField::ALL.iter().map(|f| f.key()).collect()
}

/// Build the template: one header row and one example data row.
pub fn generate_template() -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(template_headers())?;
    writer.write_record(TargetField::ALL.iter().map(|f| f.example_value()))?;

    let bytes = writer
        .into_inner()
        .map_err(|e| ImportError::io(TEMPLATE_FILE_NAME, e.into_error()))?;

    // The writer only ever receives &str input.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
