//! One collection run end to end: launch the diagnostic tool elevated,
//! wait for it to exit, validate and archive its raw report, parse, persist.
//!
//! The run is deliberately not transactional across the archive/parse/
//! persist steps: artifacts are immutable and idempotently re-listable, so
//! a crash after persisting simply leaves a valid artifact behind. The tool
//! writes to a single well-known raw path, so callers must not run two
//! collections concurrently; the invoker does not lock.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Local;
use tracing::{debug, info};

use crate::config::{CollectorConfig, TOOL_FLAG};
use crate::error::CollectionError;
use crate::events::{DiagnosticEvent, EventSink};
use crate::grammar;
use crate::record::{Report, TIMESTAMP_FORMAT};
use crate::store::ArtifactStore;
use crate::watcher::CompletionWatcher;

/// Launches the diagnostic tool with elevated privilege, fire-and-forget.
///
/// A seam rather than a direct call so runs can be driven end to end in
/// tests without a bundled tool. `Err` carries the OS-level cause; a
/// non-zero exit of the tool itself is not observable through this launch.
pub trait ToolLauncher {
    fn launch_elevated(&self, exe: &Path, flag: &str) -> Result<(), String>;
}

/// Production launcher.
///
/// On Windows the launch goes through PowerShell `Start-Process -Verb
/// RunAs`, which routes the elevation request to UAC and returns without
/// waiting; completion is observed via the process table. Elsewhere the
/// tool is spawned directly, which keeps the pipeline exercisable on
/// development hosts.
pub struct ShellLauncher;

#[cfg(windows)]
impl ToolLauncher for ShellLauncher {
    fn launch_elevated(&self, exe: &Path, flag: &str) -> Result<(), String> {
        let work_dir = exe.parent().unwrap_or_else(|| Path::new("."));
        let script = format!(
            "Start-Process -FilePath '{}' -ArgumentList '{}' -WorkingDirectory '{}' -Verb RunAs -WindowStyle Hidden",
            exe.display(),
            flag,
            work_dir.display(),
        );
        let status = Command::new("powershell")
            .args(["-NoProfile", "-Command", &script])
            .status()
            .map_err(|err| err.to_string())?;
        if !status.success() {
            return Err(format!("elevation request failed with {}", status));
        }
        Ok(())
    }
}

#[cfg(not(windows))]
impl ToolLauncher for ShellLauncher {
    fn launch_elevated(&self, exe: &Path, flag: &str) -> Result<(), String> {
        let work_dir = exe.parent().unwrap_or_else(|| Path::new("."));
        Command::new(exe)
            .arg(flag)
            .current_dir(work_dir)
            .spawn()
            .map(|_| ())
            .map_err(|err| err.to_string())
    }
}

/// The product of a successful run: the persisted artifact name (the
/// catalog key) and the report it serializes.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub file_name: String,
    pub report: Report,
}

/// Deletes the raw report buffer on every exit path out of a run, so stale
/// tool output cannot contaminate the next collection. Deletion failure is
/// non-fatal and goes through the event sink.
struct RawBufferGuard<'a> {
    path: PathBuf,
    sink: &'a dyn EventSink,
}

impl Drop for RawBufferGuard<'_> {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("raw report deleted: {}", self.path.display()),
            Err(err) => self.sink.emit(DiagnosticEvent::RawCleanupFailed {
                path: self.path.clone(),
                cause: err.to_string(),
            }),
        }
    }
}

/// Drives one collection run.
pub struct DiagnosticInvoker<'a> {
    config: &'a CollectorConfig,
    launcher: &'a dyn ToolLauncher,
    sink: &'a dyn EventSink,
    watcher: CompletionWatcher,
}

impl<'a> DiagnosticInvoker<'a> {
    pub fn new(
        config: &'a CollectorConfig,
        launcher: &'a dyn ToolLauncher,
        sink: &'a dyn EventSink,
    ) -> Self {
        Self {
            config,
            launcher,
            sink,
            watcher: CompletionWatcher::new(),
        }
    }

    /// Replace the default watcher; tests use a faster poll interval.
    pub fn with_watcher(mut self, watcher: CompletionWatcher) -> Self {
        self.watcher = watcher;
        self
    }

    /// Run one collection: resolve the tool, launch it elevated, wait for
    /// exit, validate the raw report, archive it, parse it, persist the
    /// result.
    ///
    /// An empty parse is not a failure: "tool ran, found nothing" persists
    /// an empty report, distinct from any of the error variants. The raw
    /// buffer is removed on every exit path past the wait. Nothing is
    /// retried; a failure is surfaced to the operator as-is.
    pub fn run_collection(&self) -> Result<ReportArtifact, CollectionError> {
        let exe = self.config.tool_exe();
        if !exe.exists() {
            return Err(CollectionError::ToolNotFound(exe));
        }

        info!("launching {} {}", exe.display(), TOOL_FLAG);
        self.launcher
            .launch_elevated(&exe, TOOL_FLAG)
            .map_err(CollectionError::LaunchFailed)?;

        self.watcher
            .await_exit(&self.config.process_name, self.config.wait_timeout)
            .map_err(|timed_out| CollectionError::CollectionTimedOut {
                process: timed_out.process,
                timeout: timed_out.timeout,
            })?;

        let raw_path = self.config.raw_report();
        let _raw_guard = RawBufferGuard {
            path: raw_path.clone(),
            sink: self.sink,
        };

        let raw_len = match fs::metadata(&raw_path) {
            Ok(meta) => meta.len(),
            Err(_) => return Err(CollectionError::ArtifactMissing(raw_path)),
        };
        if raw_len == 0 {
            return Err(CollectionError::ArtifactEmpty(raw_path));
        }

        let raw_text = fs::read_to_string(&raw_path).map_err(CollectionError::PersistFailed)?;

        let collected_at = Local::now();
        let tag = collected_at.format(TIMESTAMP_FORMAT).to_string();

        let store = ArtifactStore::new(self.config.log_dir());
        store.archive_raw(&raw_text, &tag)?;

        let records = grammar::parse(&raw_text, self.sink);
        if records.is_empty() {
            self.sink.emit(DiagnosticEvent::EmptyReportPersisted);
        }

        let report = Report::with_timestamp(collected_at, records);
        let file_name = store.write(&report)?;

        Ok(ReportArtifact { file_name, report })
    }
}
