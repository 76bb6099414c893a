//! Error types for the collection pipeline.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Fatal failure of one collection run.
///
/// Each variant maps to one abort point in the invoker. Non-fatal findings
/// (defaulted fields, cleanup failures) travel through the event sink
/// instead and never abort a run. Nothing here is retried automatically;
/// the operator re-triggers collection after addressing the cause.
#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("diagnostic tool not found: {}", .0.display())]
    ToolNotFound(PathBuf),

    #[error("failed to launch diagnostic tool: {0}")]
    LaunchFailed(String),

    #[error("timed out after {timeout:?} waiting for {process} to exit")]
    CollectionTimedOut { process: String, timeout: Duration },

    #[error("raw report not found: {}", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("raw report is empty: {}", .0.display())]
    ArtifactEmpty(PathBuf),

    #[error("failed to persist report: {0}")]
    PersistFailed(#[source] std::io::Error),
}
