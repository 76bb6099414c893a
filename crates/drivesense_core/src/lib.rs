//! Core collection pipeline for Drivesense.
//!
//! Drives the bundled storage-diagnostic tool, turns its free-form textual
//! report into per-device health records, and keeps a file-backed history
//! of results: elevated invocation, bounded-wait completion detection, raw
//! artifact validation, the report grammar, and the artifact catalog.

pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod grammar;
pub mod invoker;
pub mod record;
pub mod store;
pub mod watcher;

pub use catalog::ReportCatalog;
pub use config::CollectorConfig;
pub use error::CollectionError;
pub use events::{DiagnosticEvent, EventSink, MemorySink, TracingSink};
pub use invoker::{DiagnosticInvoker, ReportArtifact, ShellLauncher, ToolLauncher};
pub use record::{DeviceHealthRecord, Report, NOT_AVAILABLE};
pub use store::ArtifactStore;
pub use watcher::CompletionWatcher;
