// src/lib.rs
//! Designer contact import for Tapestry workspaces: CSV mapping, PDF
//! extraction batches and bulk submission, from the CLI or an HTTP gateway.

pub mod cli;
pub mod core;
pub mod environment;
pub mod error;
pub mod import;
pub mod utils;
pub mod web;
pub mod workspace;

pub use error::{ErrorKind, FileRejection, ImportError, Result};
pub use web::{build_rocket, start_web_server};
pub use workspace::WorkspaceContext;
