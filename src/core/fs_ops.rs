// src/core/fs_ops.rs
//! File system operations for local uploads and exports

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::import::types::UploadFile;
use crate::import::validation::{file_extension, CSV_MIME, PDF_MIME};

pub struct FsOps;

impl FsOps {
    /// Ensure directory exists
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            info!("Created directory: {}", path.display());
        }
        Ok(())
    }

    /// Write file, creating the parent directory first
    pub async fn write_file_safe(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent).await?;
        }

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        info!("Written file: {}", path.display());
        Ok(())
    }

    /// Read a local file as an upload, guessing its MIME type from the extension
    pub async fn read_upload(path: &Path) -> Result<UploadFile> {
        let bytes = fs::read(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_string())
            .unwrap_or_else(|| path.display().to_string());

        let mime = Self::guess_mime(&name).map(|m| m.to_string());
        Ok(UploadFile::new(name, mime, bytes))
    }

    /// Read several uploads, keeping their order
    pub async fn read_uploads(paths: &[PathBuf]) -> Result<Vec<UploadFile>> {
        let mut uploads = Vec::with_capacity(paths.len());
        for path in paths {
            uploads.push(Self::read_upload(path).await?);
        }
        Ok(uploads)
    }

    pub fn guess_mime(file_name: &str) -> Option<&'static str> {
        match file_extension(file_name).as_deref() {
            Some("pdf") => Some(PDF_MIME),
            Some("csv") => Some(CSV_MIME),
            Some("txt") => Some("text/plain"),
            Some("docx") => {
                Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime() {
        assert_eq!(FsOps::guess_mime("cv.PDF"), Some("application/pdf"));
        assert_eq!(FsOps::guess_mime("people.csv"), Some("text/csv"));
        assert_eq!(FsOps::guess_mime("photo.heic"), None);
    }

    #[tokio::test]
    async fn test_read_upload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.csv");
        tokio::fs::write(&path, "Name\nAda\n").await.unwrap();

        let upload = FsOps::read_upload(&path).await.unwrap();
        assert_eq!(upload.name, "people.csv");
        assert_eq!(upload.mime(), Some("text/csv"));
        assert_eq!(upload.bytes, b"Name\nAda\n");
    }

    #[tokio::test]
    async fn test_write_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports").join("template.csv");

        FsOps::write_file_safe(&path, "name\n").await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "name\n");
    }

    #[tokio::test]
    async fn test_missing_file_has_context() {
        let err = FsOps::read_upload(Path::new("/definitely/missing.pdf"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
