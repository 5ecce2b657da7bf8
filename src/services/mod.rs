//! Services module - export orchestration on top of the content model.
//!
//! The services never touch the command line or the process; they take routed
//! commands and configuration paths and report through `Result` values and
//! `tracing` records.
//!
//! # Components
//!
//! - [`ExportService`]: pack, batch and single-target exports. Batch targets are
//!   isolated from each other and their outcomes collected in a
//!   [`BatchReport`](crate::models::BatchReport).
//! - [`extraction`]: raw tribe and profile record extraction.
//! - [`dispatch`]: routes an invocation to the right export and maps the
//!   outcome to the process exit code.
//!
//! # Usage Example
//!
//! ```ignore
//! use asv_export::config::AppPaths;
//! use asv_export::content::SnapshotBackend;
//! use asv_export::services::ExportService;
//!
//! let service = ExportService::new(SnapshotBackend::new(), AppPaths::discover());
//! let report = service.export_batch("export.json")?;
//! if report.has_failures() {
//!     // one or more targets failed, the others were still written
//! }
//! ```

pub mod dispatch;
pub mod export;
pub mod extraction;

pub use dispatch::{EXIT_FAILURE, EXIT_SUCCESS, exit_code, run, run_guarded};
pub use export::{ExportError, ExportService};
pub use extraction::{RecordKind, extract_profiles, extract_tribes};
