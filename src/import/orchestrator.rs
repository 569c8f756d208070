// src/import/orchestrator.rs
//! Drives file uploads, extraction and bulk submission for one import session

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info, info_span, warn, Instrument};

use super::field_mapper::FieldMappingSet;
use super::types::{
    ExtractedContact, FieldMapping, ImportResult, PdfExtraction, ProcessingResult, UploadFile,
};
use super::validation::{validate_csv_upload, validate_pdf_batch};
use crate::error::{ImportError, Result};

/// The remote collaborator the orchestrator talks to.
#[async_trait]
pub trait ImportBackend: Send + Sync {
    async fn process_pdf(&self, file: &UploadFile) -> Result<PdfExtraction>;

    async fn import_contacts(&self, contacts: &[ExtractedContact]) -> Result<ImportResult>;

    async fn import_designers_csv(
        &self,
        file: &UploadFile,
        mappings: &[FieldMapping],
    ) -> Result<ImportResult>;
}

/// Progress after a file finished, successfully or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub current_file: String,
}

impl BatchProgress {
    /// `completed / total * 100`, rounded.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u8
    }
}

/// Everything a PDF batch produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub results: Vec<ProcessingResult>,
    pub contacts: Vec<ExtractedContact>,
    pub progress: u8,
}

impl BatchOutcome {
    pub fn succeeded_files(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed_files(&self) -> usize {
        self.results.len() - self.succeeded_files()
    }
}

pub struct BatchImporter<'a, B: ImportBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: ImportBackend + ?Sized> BatchImporter<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Extract contacts from one or many PDFs.
    ///
    /// The whole batch is validated first; a rejected file aborts it before any
    /// request. Files are then sent one at a time, and a failing file is
    /// recorded without stopping the rest.
    pub async fn process_files<F>(
        &self,
        files: &[UploadFile],
        mut on_progress: F,
    ) -> Result<BatchOutcome>
    where
        F: FnMut(&BatchProgress) + Send,
    {
        validate_pdf_batch(files)?;

        let span = info_span!("pdf_batch", files = files.len());
        async {
            let total = files.len();
            let mut results = Vec::with_capacity(total);
            let mut contacts = Vec::new();
            let mut progress = BatchProgress {
                completed: 0,
                total,
                current_file: String::new(),
            };

            for file in files {
                let result = match self.backend.process_pdf(file).await {
                    Ok(extraction) => {
                        info!(
                            "Extracted {} contacts from {} ({} pages)",
                            extraction.contacts.len(),
                            file.name,
                            extraction.total_pages
                        );
                        ProcessingResult::succeeded(&file.name, extraction)
                    }
                    Err(e) => {
                        error!("Failed to process {}: {}", file.name, e);
                        ProcessingResult::failed(&file.name, e.to_string())
                    }
                };

                contacts.extend(result.contacts.iter().cloned());
                results.push(result);

                progress.completed += 1;
                progress.current_file = file.name.clone();
                on_progress(&progress);
            }

            let outcome = BatchOutcome {
                progress: progress.percent(),
                results,
                contacts,
            };
            info!(
                "Batch finished: {} succeeded, {} failed, {} contacts",
                outcome.succeeded_files(),
                outcome.failed_files(),
                outcome.contacts.len()
            );
            Ok::<_, ImportError>(outcome)
        }
        .instrument(span)
        .await
    }

    /// Submit accumulated contacts in a single bulk call.
    pub async fn submit_contacts(&self, contacts: &[ExtractedContact]) -> Result<ImportResult> {
        if contacts.is_empty() {
            warn!("Submitting an empty contact list");
        }
        let result = self.backend.import_contacts(contacts).await?;
        info!(
            "Bulk import finished: {} imported, {} skipped, {} errors",
            result.imported(),
            result.skipped(),
            result.errors().len()
        );
        Ok(result)
    }

    /// Gate and submit a CSV upload with its column mapping.
    pub async fn submit_csv(
        &self,
        file: &UploadFile,
        mappings: &FieldMappingSet,
    ) -> Result<ImportResult> {
        validate_csv_upload(file)?;
        mappings.ensure_complete()?;

        let result = self
            .backend
            .import_designers_csv(file, mappings.mappings())
            .await?;
        info!(
            "CSV import of {} finished: {} imported, {} errors",
            file.name,
            result.imported(),
            result.errors().len()
        );
        Ok(result)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::import::types::{RowError, TargetField};
    use crate::import::validation::{MAX_PDF_BYTES, PDF_MIME};
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Records every call; files named in `failing` are answered with a transport error.
    #[derive(Default)]
    pub(crate) struct FakeBackend {
        pub failing: HashSet<String>,
        pub calls: Mutex<Vec<String>>,
        pub submitted: Mutex<Vec<ExtractedContact>>,
    }

    impl FakeBackend {
        pub fn failing(names: &[&str]) -> Self {
            Self {
                failing: names.iter().map(|n| n.to_string()).collect(),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImportBackend for FakeBackend {
        async fn process_pdf(&self, file: &UploadFile) -> Result<PdfExtraction> {
            self.calls.lock().unwrap().push(file.name.clone());
            if self.failing.contains(&file.name) {
                return Err(ImportError::Transport {
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                    body: format!("could not parse {}", file.name),
                });
            }
            Ok(PdfExtraction {
                contacts: vec![ExtractedContact::new(format!("Contact from {}", file.name), 0.9)],
                total_pages: 1,
                warnings: Vec::new(),
            })
        }

        async fn import_contacts(&self, contacts: &[ExtractedContact]) -> Result<ImportResult> {
            self.calls.lock().unwrap().push("import_contacts".to_string());
            self.submitted.lock().unwrap().extend_from_slice(contacts);
            Ok(ImportResult::new(contacts.len() as u32, 0, Vec::new(), None))
        }

        async fn import_designers_csv(
            &self,
            file: &UploadFile,
            _mappings: &[FieldMapping],
        ) -> Result<ImportResult> {
            self.calls.lock().unwrap().push(format!("csv:{}", file.name));
            Ok(ImportResult::new(
                2,
                1,
                vec![RowError {
                    row: "Row 3".to_string(),
                    error: "Invalid email".to_string(),
                }],
                None,
            ))
        }
    }

    pub(crate) fn pdf(name: &str) -> UploadFile {
        UploadFile::new(name, Some(PDF_MIME.to_string()), b"%PDF-1.7".to_vec())
    }

    #[tokio::test]
    async fn test_failure_in_middle_file_is_isolated() {
        let backend = FakeBackend::failing(&["two.pdf"]);
        let importer = BatchImporter::new(&backend);
        let files = vec![pdf("one.pdf"), pdf("two.pdf"), pdf("three.pdf")];

        let mut seen = Vec::new();
        let outcome = importer
            .process_files(&files, |p| seen.push(p.percent()))
            .await
            .unwrap();

        assert_eq!(outcome.results.len(), 3);
        assert!(outcome.results[0].success);
        assert!(!outcome.results[1].success);
        assert!(outcome.results[1].contacts.is_empty());
        assert_eq!(
            outcome.results[1].error.as_deref(),
            Some("could not parse two.pdf")
        );
        assert!(outcome.results[2].success);

        assert_eq!(outcome.contacts.len(), 2);
        assert_eq!(outcome.progress, 100);
        assert_eq!(seen, vec![33, 67, 100]);
        assert_eq!(backend.calls(), vec!["one.pdf", "two.pdf", "three.pdf"]);
    }

    #[tokio::test]
    async fn test_oversized_file_blocks_whole_batch() {
        let backend = FakeBackend::default();
        let importer = BatchImporter::new(&backend);
        let big = UploadFile::new(
            "portfolio.pdf",
            Some(PDF_MIME.to_string()),
            vec![0u8; MAX_PDF_BYTES as usize + 1],
        );
        let files = vec![pdf("one.pdf"), big, pdf("three.pdf")];

        let err = importer.process_files(&files, |_| {}).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("portfolio.pdf"));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_single_file_is_a_batch_of_one() {
        let backend = FakeBackend::default();
        let importer = BatchImporter::new(&backend);

        let outcome = importer
            .process_files(&[pdf("cv.pdf")], |_| {})
            .await
            .unwrap();

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.progress, 100);
        assert_eq!(outcome.contacts[0].name, "Contact from cv.pdf");
    }

    #[tokio::test]
    async fn test_all_files_failing_still_completes() {
        let backend = FakeBackend::failing(&["a.pdf", "b.pdf"]);
        let importer = BatchImporter::new(&backend);

        let outcome = importer
            .process_files(&[pdf("a.pdf"), pdf("b.pdf")], |_| {})
            .await
            .unwrap();

        assert_eq!(outcome.failed_files(), 2);
        assert!(outcome.contacts.is_empty());
        assert_eq!(outcome.progress, 100);
    }

    #[tokio::test]
    async fn test_submit_sends_flat_list_once() {
        let backend = FakeBackend::default();
        let importer = BatchImporter::new(&backend);
        let outcome = importer
            .process_files(&[pdf("a.pdf"), pdf("b.pdf")], |_| {})
            .await
            .unwrap();

        let result = importer.submit_contacts(&outcome.contacts).await.unwrap();

        assert_eq!(result.imported(), 2);
        assert_eq!(
            backend
                .calls()
                .iter()
                .filter(|c| c.as_str() == "import_contacts")
                .count(),
            1
        );
        assert_eq!(backend.submitted.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_csv_submit_requires_complete_mapping() {
        let backend = FakeBackend::default();
        let importer = BatchImporter::new(&backend);
        let file = UploadFile::new("people.csv", None, b"Name,Email\n".to_vec());

        let incomplete = FieldMappingSet::auto_map(&["Name", "Email"]);
        let err = importer.submit_csv(&file, &incomplete).await.unwrap_err();
        assert!(matches!(
            err,
            ImportError::IncompleteMapping(ref missing)
                if missing == &vec![TargetField::Title, TargetField::Level]
        ));
        assert!(backend.calls().is_empty());

        let complete = FieldMappingSet::auto_map(&["Name", "Title", "Email", "Level"]);
        let result = importer.submit_csv(&file, &complete).await.unwrap();
        assert!(result.is_partial());
        assert_eq!(backend.calls(), vec!["csv:people.csv"]);
    }

    #[tokio::test]
    async fn test_csv_submit_rejects_non_csv() {
        let backend = FakeBackend::default();
        let importer = BatchImporter::new(&backend);
        let file = UploadFile::new("people.xlsx", Some("application/vnd.ms-excel".into()), vec![]);
        let mappings = FieldMappingSet::auto_map(&["Name", "Title", "Email", "Level"]);

        let err = importer.submit_csv(&file, &mappings).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_progress_percent() {
        let progress = BatchProgress {
            completed: 1,
            total: 4,
            current_file: "a.pdf".to_string(),
        };
        assert_eq!(progress.percent(), 25);
    }
}
