// src/import/session.rs
//! Review state for extracted contacts between extraction and submission

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::orchestrator::BatchOutcome;
use super::presenter::ConfidenceTier;
use super::types::{ExtractedContact, ProcessingResult};

/// Contacts gathered by one import. Contacts are never edited, only discarded.
#[derive(Debug, Clone)]
pub struct ImportSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    results: Vec<ProcessingResult>,
    contacts: Vec<ExtractedContact>,
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            results: Vec::new(),
            contacts: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Append the output of a batch.
    pub fn absorb(&mut self, outcome: BatchOutcome) {
        self.results.extend(outcome.results);
        self.contacts.extend(outcome.contacts);
    }

    pub fn contacts(&self) -> &[ExtractedContact] {
        &self.contacts
    }

    pub fn results(&self) -> &[ProcessingResult] {
        &self.results
    }

    /// Drop one contact from the review list.
    pub fn discard(&mut self, index: usize) -> Option<ExtractedContact> {
        if index < self.contacts.len() {
            Some(self.contacts.remove(index))
        } else {
            None
        }
    }

    /// Keep only contacts at or above `tier`. Returns how many were discarded.
    pub fn retain_min_tier(&mut self, tier: ConfidenceTier) -> usize {
        let before = self.contacts.len();
        self.contacts
            .retain(|c| ConfidenceTier::from_confidence(c.confidence) >= tier);
        before - self.contacts.len()
    }

    pub fn clear(&mut self) {
        self.results.clear();
        self.contacts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}
