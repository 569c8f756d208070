// src/import/presenter.rs
//! Text rendering of import outcomes and confidence tiers

use std::fmt::Write;
use std::str::FromStr;

use serde::Serialize;

use super::types::{ExtractedContact, ImportResult, ProcessingResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    pub const HIGH_THRESHOLD: f64 = 0.8;
    pub const MEDIUM_THRESHOLD: f64 = 0.6;

    /// Lower edges are inclusive: 0.8 is High, 0.6 is Medium.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= Self::HIGH_THRESHOLD {
            ConfidenceTier::High
        } else if confidence >= Self::MEDIUM_THRESHOLD {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfidenceTier::High => "High",
            ConfidenceTier::Medium => "Medium",
            ConfidenceTier::Low => "Low",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ConfidenceTier::High => "green",
            ConfidenceTier::Medium => "yellow",
            ConfidenceTier::Low => "red",
        }
    }
}

impl FromStr for ConfidenceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(ConfidenceTier::High),
            "medium" => Ok(ConfidenceTier::Medium),
            "low" => Ok(ConfidenceTier::Low),
            other => Err(format!("unknown confidence tier '{}' (use high, medium or low)", other)),
        }
    }
}

/// Contact counts per confidence tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfidenceSummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl ConfidenceSummary {
    pub fn from_contacts(contacts: &[ExtractedContact]) -> Self {
        contacts.iter().fold(Self::default(), |mut summary, contact| {
            match ConfidenceTier::from_confidence(contact.confidence) {
                ConfidenceTier::High => summary.high += 1,
                ConfidenceTier::Medium => summary.medium += 1,
                ConfidenceTier::Low => summary.low += 1,
            }
            summary
        })
    }
}

pub fn render_contact(contact: &ExtractedContact) -> String {
    let tier = ConfidenceTier::from_confidence(contact.confidence);
    let mut line = contact.name.clone();
    if let Some(title) = &contact.title {
        let _ = write!(line, ", {}", title);
    }
    if let Some(company) = &contact.company {
        let _ = write!(line, " at {}", company);
    }
    if let Some(email) = &contact.email {
        let _ = write!(line, " <{}>", email);
    }
    let _ = write!(
        line,
        " [{} {:.0}%]",
        tier.label(),
        contact.confidence * 100.0
    );
    line
}

pub fn render_processing_results(results: &[ProcessingResult]) -> String {
    let mut out = String::new();
    let succeeded = results.iter().filter(|r| r.success).count();
    let contacts: usize = results.iter().map(|r| r.contacts.len()).sum();
    let _ = writeln!(
        out,
        "Processed {} file(s): {} succeeded, {} failed, {} contact(s) found",
        results.len(),
        succeeded,
        results.len() - succeeded,
        contacts
    );

    for result in results {
        if result.success {
            let _ = writeln!(
                out,
                "  ✓ {} - {} contact(s), {} page(s)",
                result.file_name,
                result.contacts.len(),
                result.total_pages
            );
            for warning in &result.warnings {
                let _ = writeln!(out, "      warning: {}", warning);
            }
        } else {
            let _ = writeln!(
                out,
                "  ✗ {} - {}",
                result.file_name,
                result.error.as_deref().unwrap_or("Unknown error")
            );
        }
    }
    out
}

pub fn render_confidence_summary(summary: &ConfidenceSummary) -> String {
    format!(
        "Confidence: {} High, {} Medium, {} Low",
        summary.high, summary.medium, summary.low
    )
}

pub fn render_import_result(result: &ImportResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Imported {} record(s), skipped {}",
        result.imported(),
        result.skipped()
    );
    if let Some(message) = result.message() {
        let _ = writeln!(out, "{}", message);
    }
    if result.is_partial() {
        let _ = writeln!(out, "{} error(s):", result.errors().len());
        for row_error in result.errors() {
            let _ = writeln!(out, "  {}: {}", row_error.row, row_error.error);
        }
    }
    out
}
