//! Diagnostic side channel for non-fatal collection findings.
//!
//! The pipeline reports partial-extraction and cleanup problems here instead
//! of through the error path: a defaulted field or a leftover raw file must
//! not fail a run. The sink is passed in explicitly so the core carries no
//! global logger dependency and tests can capture what was emitted.

use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};

/// A non-fatal finding from one collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    /// An expected section marker was absent from the tool's report.
    SectionMissing { section: &'static str },
    /// The device-list section parsed but contained zero entries.
    NoDevicesListed,
    /// Some fields of one device block could not be extracted and were
    /// defaulted to the sentinel.
    FieldsDefaulted {
        device_index: usize,
        fields: Vec<&'static str>,
    },
    /// The run produced zero records; an empty report was persisted anyway.
    EmptyReportPersisted,
    /// Best-effort deletion of the raw report buffer failed.
    RawCleanupFailed { path: PathBuf, cause: String },
}

/// Receiver for diagnostic events.
pub trait EventSink {
    fn emit(&self, event: DiagnosticEvent);
}

/// Production sink: forwards events to the tracing subscriber.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::SectionMissing { section } => {
                warn!("report section not found: {}", section);
            }
            DiagnosticEvent::NoDevicesListed => {
                warn!("no device entries found in report");
            }
            DiagnosticEvent::FieldsDefaulted {
                device_index,
                fields,
            } => {
                warn!(
                    "device {}: fields not found: {}",
                    device_index,
                    fields.join(", ")
                );
            }
            DiagnosticEvent::EmptyReportPersisted => {
                info!("no device records extracted; persisting empty report");
            }
            DiagnosticEvent::RawCleanupFailed { path, cause } => {
                warn!("failed to delete raw report {}: {}", path.display(), cause);
            }
        }
    }
}

/// Capturing sink for tests and embedders that inspect events afterwards.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().expect("event sink poisoned").clone()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: DiagnosticEvent) {
        self.events.lock().expect("event sink poisoned").push(event);
    }
}
