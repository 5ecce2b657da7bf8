// ASV Export - command line exporter for ARK save game content
//
// This is the library crate containing the export pipeline and data structures.
// The binary crate (main.rs) provides the command line entry point.

pub mod cli;
pub mod config;
pub mod content;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use config::{AppPaths, ConfigLoader};
pub use content::{ContentPack, SaveGameBackend, SnapshotBackend};
pub use models::{BatchConfig, BatchReport, PackConfig};
pub use services::ExportService;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
