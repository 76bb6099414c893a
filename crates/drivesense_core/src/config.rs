//! Collector configuration. Every path is derived from one base directory,
//! matching the layout the application ships with: the bundled tool under
//! `CrystalDiskInfo/` and persisted reports under `log/`.

use std::path::PathBuf;
use std::time::Duration;

/// Directory holding the bundled diagnostic tool, relative to the base dir.
pub const TOOL_DIR: &str = "CrystalDiskInfo";

/// Executable name of the diagnostic tool; also the process name watched
/// for completion.
pub const TOOL_EXE: &str = "DiskInfo32.exe";

/// The one supported command-line flag: run, copy the result to the raw
/// report path, exit.
pub const TOOL_FLAG: &str = "/CopyExit";

/// Fixed file the tool writes its raw report to, inside [`TOOL_DIR`].
pub const RAW_REPORT_FILE: &str = "DiskInfo.txt";

/// Directory holding persisted report artifacts, relative to the base dir.
pub const LOG_DIR: &str = "log";

/// How long one collection run waits for the tool to exit. A hung tool is
/// surfaced to the operator rather than retried.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Application base directory all other paths hang off.
    pub base_dir: PathBuf,
    /// Process name matched (case-insensitively) while waiting for exit.
    pub process_name: String,
    pub wait_timeout: Duration,
}

impl CollectorConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            process_name: TOOL_EXE.to_string(),
            wait_timeout: WAIT_TIMEOUT,
        }
    }

    /// Installed path of the diagnostic tool executable.
    pub fn tool_exe(&self) -> PathBuf {
        self.base_dir.join(TOOL_DIR).join(TOOL_EXE)
    }

    /// Well-known path the tool writes its raw report to.
    pub fn raw_report(&self) -> PathBuf {
        self.base_dir.join(TOOL_DIR).join(RAW_REPORT_FILE)
    }

    /// Directory persisted artifacts live in.
    pub fn log_dir(&self) -> PathBuf {
        self.base_dir.join(LOG_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_derive_from_base_dir() {
        let config = CollectorConfig::new("/opt/drivesense");
        assert_eq!(
            config.tool_exe(),
            PathBuf::from("/opt/drivesense/CrystalDiskInfo/DiskInfo32.exe")
        );
        assert_eq!(
            config.raw_report(),
            PathBuf::from("/opt/drivesense/CrystalDiskInfo/DiskInfo.txt")
        );
        assert_eq!(config.log_dir(), PathBuf::from("/opt/drivesense/log"));
        assert_eq!(config.process_name, "DiskInfo32.exe");
    }
}
