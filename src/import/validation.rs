// src/import/validation.rs
//! Client-side file gates, checked before any request is sent

use super::types::UploadFile;
use crate::error::{FileRejection, ImportError, Result};

pub const PDF_MIME: &str = "application/pdf";
pub const CSV_MIME: &str = "text/csv";

/// Upper bound for a single PDF upload (10 MiB).
pub const MAX_PDF_BYTES: u64 = 10 * 1024 * 1024;

/// Get file extension in lowercase
pub fn file_extension(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Strip MIME parameters (`text/csv; charset=utf-8` -> `text/csv`).
fn essence(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or(mime)
        .trim()
        .to_lowercase()
}

/// CSV uploads are accepted by extension or by MIME type.
pub fn check_csv(file: &UploadFile) -> std::result::Result<(), FileRejection> {
    let by_extension = file_extension(&file.name).as_deref() == Some("csv");
    let by_mime = file.mime().map(essence).as_deref() == Some(CSV_MIME);

    if by_extension || by_mime {
        Ok(())
    } else {
        Err(FileRejection {
            file_name: file.name.clone(),
            reason: "Please select a CSV file".to_string(),
        })
    }
}

/// PDF uploads need the PDF MIME type and must fit under [`MAX_PDF_BYTES`].
pub fn check_pdf(file: &UploadFile) -> std::result::Result<(), FileRejection> {
    if file.mime().map(essence).as_deref() != Some(PDF_MIME) {
        return Err(FileRejection {
            file_name: file.name.clone(),
            reason: format!(
                "Only PDF files are supported (received {})",
                file.mime().unwrap_or("unknown type")
            ),
        });
    }

    if file.size() > MAX_PDF_BYTES {
        return Err(FileRejection {
            file_name: file.name.clone(),
            reason: format!(
                "File is {:.1}MB, which exceeds the 10MB limit",
                file.size() as f64 / (1024.0 * 1024.0)
            ),
        });
    }

    Ok(())
}

pub fn validate_csv_upload(file: &UploadFile) -> Result<()> {
    check_csv(file).map_err(|rejection| ImportError::Validation(vec![rejection]))
}

/// Validate a whole PDF batch. Any rejected file fails the batch.
pub fn validate_pdf_batch(files: &[UploadFile]) -> Result<()> {
    if files.is_empty() {
        return Err(ImportError::EmptyBatch);
    }

    let rejections: Vec<FileRejection> = files.iter().filter_map(|f| check_pdf(f).err()).collect();

    if rejections.is_empty() {
        Ok(())
    } else {
        Err(ImportError::Validation(rejections))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, mime: Option<&str>, size: usize) -> UploadFile {
        UploadFile::new(name, mime.map(|m| m.to_string()), vec![0u8; size])
    }

    #[test]
    fn test_get_file_extension() {
        assert_eq!(file_extension("people.CSV"), Some("csv".to_string()));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(file_extension("noext"), None);
    }

    #[test]
    fn test_csv_accepted_by_extension_or_mime() {
        assert!(check_csv(&file("people.csv", None, 10)).is_ok());
        assert!(check_csv(&file("people.CSV", Some("application/octet-stream"), 10)).is_ok());
        assert!(check_csv(&file("export", Some("text/csv; charset=utf-8"), 10)).is_ok());
        assert!(check_csv(&file("people.xlsx", Some("application/vnd.ms-excel"), 10)).is_err());
    }

    #[test]
    fn test_pdf_requires_mime() {
        // Extension alone is not enough for PDFs
        let err = check_pdf(&file("resume.pdf", Some("application/octet-stream"), 10)).unwrap_err();
        assert_eq!(err.file_name, "resume.pdf");
        assert!(check_pdf(&file("resume", Some("application/pdf"), 10)).is_ok());
        assert!(check_pdf(&file("resume.pdf", None, 10)).is_err());
    }

    #[test]
    fn test_pdf_size_ceiling() {
        let at_limit = file("a.pdf", Some(PDF_MIME), MAX_PDF_BYTES as usize);
        let over = file("b.pdf", Some(PDF_MIME), MAX_PDF_BYTES as usize + 1);
        assert!(check_pdf(&at_limit).is_ok());
        let rejection = check_pdf(&over).unwrap_err();
        assert!(rejection.reason.contains("10MB"));
    }

    #[test]
    fn test_batch_reports_each_offending_file() {
        let files = vec![
            file("ok.pdf", Some(PDF_MIME), 100),
            file("huge.pdf", Some(PDF_MIME), MAX_PDF_BYTES as usize + 1),
            file("notes.txt", Some("text/plain"), 100),
        ];
        match validate_pdf_batch(&files) {
            Err(ImportError::Validation(rejections)) => {
                let names: Vec<_> = rejections.iter().map(|r| r.file_name.as_str()).collect();
                assert_eq!(names, vec!["huge.pdf", "notes.txt"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_batch() {
        assert!(matches!(validate_pdf_batch(&[]), Err(ImportError::EmptyBatch)));
    }
}
