// src/workspace.rs
//! Workspace identity shared by every backend call

use serde::Serialize;

use crate::error::{ImportError, Result};

/// Header carrying the workspace slug on backend requests.
pub const WORKSPACE_HEADER: &str = "X-Workspace-Slug";

/// Leading path segments that are routing prefixes rather than the workspace.
const ROUTE_PREFIXES: &[&str] = &["api", "w", "workspace", "workspaces"];

/// The tenant an import runs in. Derived once, then passed to every client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct WorkspaceContext {
    slug: String,
}

impl WorkspaceContext {
    pub fn new(slug: &str) -> Result<Self> {
        let slug = slug.trim().to_lowercase();
        if slug.is_empty() {
            return Err(ImportError::InvalidWorkspace("empty workspace slug".to_string()));
        }
        if !slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ImportError::InvalidWorkspace(format!(
                "'{}' is not a valid workspace slug",
                slug
            )));
        }
        Ok(Self { slug })
    }

    /// Derive the workspace from a URL path such as `/acme/designers/import`
    /// or `/api/acme/import/pdf`. Only the first segment can be a prefix, so a
    /// workspace named `w` or `api` still resolves.
    pub fn from_path(path: &str) -> Result<Self> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let mut segments = path.split('/').filter(|s| !s.is_empty()).peekable();
        if segments
            .peek()
            .is_some_and(|s| ROUTE_PREFIXES.contains(&s.to_lowercase().as_str()))
        {
            segments.next();
        }
        let segment = segments.next().ok_or_else(|| {
            ImportError::InvalidWorkspace(format!("no workspace in path '{}'", path))
        })?;
        Self::new(segment)
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }
}

impl std::fmt::Display for WorkspaceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ui_path() {
        let ws = WorkspaceContext::from_path("/acme-studio/designers/import").unwrap();
        assert_eq!(ws.slug(), "acme-studio");
    }

    #[test]
    fn test_from_api_path() {
        let ws = WorkspaceContext::from_path("/api/acme/import/pdf/process").unwrap();
        assert_eq!(ws.slug(), "acme");
        let ws = WorkspaceContext::from_path("/w/Acme?tab=import").unwrap();
        assert_eq!(ws.slug(), "acme");
    }

    #[test]
    fn test_prefix_named_workspace() {
        let ws = WorkspaceContext::from_path("/api/w/import/template").unwrap();
        assert_eq!(ws.slug(), "w");
        let ws = WorkspaceContext::from_path("/api/api/import/csv").unwrap();
        assert_eq!(ws.slug(), "api");
        let ws = WorkspaceContext::from_path("/workspace/workspaces").unwrap();
        assert_eq!(ws.slug(), "workspaces");
    }

    #[test]
    fn test_invalid_paths() {
        assert!(WorkspaceContext::from_path("/").is_err());
        assert!(WorkspaceContext::from_path("/api/").is_err());
        assert!(WorkspaceContext::from_path("/bad slug!/import").is_err());
    }

    #[test]
    fn test_new_normalizes() {
        assert_eq!(WorkspaceContext::new(" Design_Team ").unwrap().slug(), "design_team");
        assert!(matches!(
            WorkspaceContext::new(""),
            Err(ImportError::InvalidWorkspace(_))
        ));
    }
}
