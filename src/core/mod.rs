// src/core/mod.rs
//! Core services shared by the CLI and the web gateway

pub mod config_manager;
pub mod fs_ops;
pub mod service_client;

pub use config_manager::{ConfigManager, ServiceConfig};
pub use fs_ops::FsOps;
pub use service_client::ServiceClient;
