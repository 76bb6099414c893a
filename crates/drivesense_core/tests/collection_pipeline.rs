//! End-to-end collection runs against a temp directory, with the tool
//! launch faked through the launcher seam.

use std::fs;
use std::path::{Path, PathBuf};

use drivesense_core::{
    CollectionError, CollectorConfig, DiagnosticEvent, DiagnosticInvoker, MemorySink,
    ReportCatalog, ToolLauncher,
};

/// Launcher that plays the tool's part: "runs", drops its raw report at the
/// well-known path, and is immediately gone from the process table.
struct FakeTool {
    raw_path: PathBuf,
    output: Option<String>,
}

impl ToolLauncher for FakeTool {
    fn launch_elevated(&self, _exe: &Path, flag: &str) -> Result<(), String> {
        assert_eq!(flag, "/CopyExit");
        if let Some(output) = &self.output {
            fs::write(&self.raw_path, output).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

fn install_tool(base: &Path) {
    let tool_dir = base.join("CrystalDiskInfo");
    fs::create_dir_all(&tool_dir).unwrap();
    fs::write(tool_dir.join("DiskInfo32.exe"), "stub").unwrap();
}

/// Collector config pointed at a temp base dir, watching a process name
/// that never exists so the wait returns immediately.
fn test_config(base: &Path) -> CollectorConfig {
    let mut config = CollectorConfig::new(base);
    config.process_name = "drivesense-no-such-process.exe".to_string();
    config
}

fn sample_raw_report() -> String {
    let rule = "-".repeat(76);
    format!(
        "-- Disk List {list_dashes}\n\
         (1) SAMSUNG SSD 870 EVO 500GB : 500.1 GB\n\
         {rule}\n\
         \n\
         {rule}\n\
         (1) SAMSUNG SSD 870 EVO 500GB\n\
         {rule}\n\
         \x20          Model : SAMSUNG SSD 870 EVO 500GB\n\
         \x20      Disk Size : 500.1 GB\n\
         \x20      Interface : Serial ATA\n\
         \x20 Power On Hours : 8,760 時間\n\
         \x20 Power On Count : 1204 回\n\
         \x20    Host Writes : 12,345 GB\n\
         \x20  Health Status : 正常 (99 %)\n\
         -- S.M.A.R.T. {smart_dashes}\n\
         ID Cur Wor Thr RawValues Attribute Name\n",
        list_dashes = "-".repeat(63),
        rule = rule,
        smart_dashes = "-".repeat(62),
    )
}

#[test]
fn successful_run_persists_report_and_cleans_raw_buffer() {
    let dir = tempfile::tempdir().unwrap();
    install_tool(dir.path());
    let config = test_config(dir.path());

    let launcher = FakeTool {
        raw_path: config.raw_report(),
        output: Some(sample_raw_report()),
    };
    let sink = MemorySink::new();

    let artifact = DiagnosticInvoker::new(&config, &launcher, &sink)
        .run_collection()
        .unwrap();

    assert_eq!(artifact.report.len(), 1);
    let record = &artifact.report.records[0];
    assert_eq!(record.model, "SAMSUNG SSD 870 EVO 500GB");
    assert_eq!(record.power_on_hours, "8760");
    assert_eq!(record.host_writes_gb, "12345");
    assert_eq!(record.health_status, "正常 (99 %)");

    // Parsed artifact and raw snapshot are both on disk; the raw buffer is
    // gone.
    let log_dir = config.log_dir();
    assert!(log_dir.join(&artifact.file_name).exists());
    let snapshot = log_dir.join(format!(
        "storage_health_log_{}.txt",
        artifact.report.timestamp_tag()
    ));
    assert!(snapshot.exists());
    assert!(!config.raw_report().exists());
    assert!(sink.events().is_empty());

    // The catalog sees the new artifact and round-trips the record.
    let catalog = ReportCatalog::new(&log_dir);
    assert_eq!(catalog.list(), vec![artifact.file_name.clone()]);
    let reloaded = catalog.fetch(&artifact.file_name).unwrap();
    assert_eq!(reloaded.records, artifact.report.records);
}

#[test]
fn tool_that_writes_nothing_yields_artifact_missing() {
    let dir = tempfile::tempdir().unwrap();
    install_tool(dir.path());
    let config = test_config(dir.path());

    let launcher = FakeTool {
        raw_path: config.raw_report(),
        output: None,
    };
    let sink = MemorySink::new();

    let err = DiagnosticInvoker::new(&config, &launcher, &sink)
        .run_collection()
        .unwrap_err();
    assert!(matches!(err, CollectionError::ArtifactMissing(_)));
    assert!(!config.log_dir().exists());
}

#[test]
fn empty_raw_report_yields_artifact_empty_and_is_deleted() {
    let dir = tempfile::tempdir().unwrap();
    install_tool(dir.path());
    let config = test_config(dir.path());

    let launcher = FakeTool {
        raw_path: config.raw_report(),
        output: Some(String::new()),
    };
    let sink = MemorySink::new();

    let err = DiagnosticInvoker::new(&config, &launcher, &sink)
        .run_collection()
        .unwrap_err();
    assert!(matches!(err, CollectionError::ArtifactEmpty(_)));
    // Stale empty buffer must not survive into the next run.
    assert!(!config.raw_report().exists());
}

#[test]
fn report_without_devices_persists_empty_artifact() {
    let dir = tempfile::tempdir().unwrap();
    install_tool(dir.path());
    let config = test_config(dir.path());

    let launcher = FakeTool {
        raw_path: config.raw_report(),
        output: Some("no banners in this output at all\n".to_string()),
    };
    let sink = MemorySink::new();

    let artifact = DiagnosticInvoker::new(&config, &launcher, &sink)
        .run_collection()
        .unwrap();

    assert!(artifact.report.is_empty());
    assert!(config.log_dir().join(&artifact.file_name).exists());

    let events = sink.events();
    assert!(events
        .iter()
        .any(|e| matches!(e, DiagnosticEvent::EmptyReportPersisted)));

    let reloaded = ReportCatalog::new(config.log_dir())
        .fetch(&artifact.file_name)
        .unwrap();
    assert!(reloaded.records.is_empty());
}
