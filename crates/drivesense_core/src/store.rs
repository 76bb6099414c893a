//! File-backed persistence for collection reports.
//!
//! Artifacts are immutable once written: a run only ever creates new files,
//! and nothing here updates or rewrites an existing one. Reads and writes
//! are whole-file operations with no partial-write recovery; an artifact
//! truncated by an interrupted write re-reads as an empty record list.
//!
//! The persisted schema is the store's own serialization (label/value lines
//! under a per-device header), a deliberately different text format from the
//! tool's raw report, with its own small re-parser.

use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local, NaiveDateTime};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::CollectionError;
use crate::record::{DeviceHealthRecord, Report, TIMESTAMP_FORMAT};

/// Naming convention for parsed report artifacts.
pub const REPORT_PREFIX: &str = "storage_info_log_";

/// Naming convention for verbatim snapshots of the tool's raw report.
pub const RAW_SNAPSHOT_PREFIX: &str = "storage_health_log_";

pub const ARTIFACT_SUFFIX: &str = ".txt";

/// One persisted device block: `Disk N:` header plus its indented
/// label/value lines. The header is layout, not a field.
static PERSISTED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Disk \d+:\n(?:  .+\n)+").unwrap());

/// Whole-file store over one artifact directory.
pub struct ArtifactStore {
    log_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    /// Serialize a report into a fresh timestamped artifact.
    ///
    /// One fixed-order `label: value` block per device under a `Disk N:`
    /// header, blocks separated by blank lines. Returns the bare file name,
    /// which doubles as the catalog key.
    pub fn write(&self, report: &Report) -> Result<String, CollectionError> {
        fs::create_dir_all(&self.log_dir).map_err(CollectionError::PersistFailed)?;

        let file_name = format!(
            "{}{}{}",
            REPORT_PREFIX,
            report.timestamp_tag(),
            ARTIFACT_SUFFIX
        );

        let mut text = String::new();
        for (idx, record) in report.records.iter().enumerate() {
            text.push_str(&format!("Disk {}:\n", idx + 1));
            for (label, value) in record.fields() {
                text.push_str(&format!("  {}: {}\n", label, value));
            }
            text.push('\n');
        }

        fs::write(self.log_dir.join(&file_name), text)
            .map_err(CollectionError::PersistFailed)?;
        info!("report persisted: {}", file_name);
        Ok(file_name)
    }

    /// Archive the tool's raw report verbatim alongside the parsed artifact.
    pub fn archive_raw(&self, content: &str, timestamp_tag: &str) -> Result<String, CollectionError> {
        fs::create_dir_all(&self.log_dir).map_err(CollectionError::PersistFailed)?;

        let file_name = format!("{}{}{}", RAW_SNAPSHOT_PREFIX, timestamp_tag, ARTIFACT_SUFFIX);
        fs::write(self.log_dir.join(&file_name), content)
            .map_err(CollectionError::PersistFailed)?;
        debug!("raw report archived: {}", file_name);
        Ok(file_name)
    }

    /// Load a previously persisted artifact back into a report.
    ///
    /// Returns `None` if the file is absent or unreadable. Corrupted or
    /// foreign-format content degrades to an empty record list rather than
    /// an error.
    pub fn read(&self, file_name: &str) -> Option<Report> {
        let path = self.log_dir.join(file_name);
        if !path.exists() {
            warn!("artifact not found: {}", path.display());
            return None;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                warn!("failed to read artifact {}: {}", path.display(), err);
                return None;
            }
        };

        let records = parse_persisted(&content);
        let collected_at = timestamp_from_name(file_name)
            .or_else(|| modified_time(&path))
            .unwrap_or_else(Local::now);

        Some(Report::with_timestamp(collected_at, records))
    }

    /// File names under the store matching `prefix`, most recent first.
    ///
    /// `max_age` is the retention window: entries whose modification time is
    /// older are dropped at read time. Storage reports are listed with `None`
    /// (no age filter); the windowed form exists for sibling log classes with
    /// a bounded-history policy.
    pub fn list(&self, prefix: &str, max_age: Option<Duration>) -> Vec<String> {
        let entries = match fs::read_dir(&self.log_dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let now = SystemTime::now();
        let mut files: Vec<(String, SystemTime)> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                if !name.starts_with(prefix) || !name.ends_with(ARTIFACT_SUFFIX) {
                    return None;
                }
                let modified = entry.metadata().and_then(|m| m.modified()).ok()?;
                within_retention(modified, now, max_age).then_some((name, modified))
            })
            .collect();

        files.sort_by(|a, b| b.1.cmp(&a.1));
        files.into_iter().map(|(name, _)| name).collect()
    }
}

/// Re-parse the persisted schema into records.
///
/// Each block starts from an all-sentinel record, so every record keeps its
/// seven fields even if lines are missing. Unknown labels are skipped.
fn parse_persisted(content: &str) -> Vec<DeviceHealthRecord> {
    let mut records = Vec::new();

    for block in PERSISTED_BLOCK.find_iter(content) {
        let mut record = DeviceHealthRecord::default();
        for line in block.as_str().lines().skip(1) {
            let Some((label, value)) = line.split_once(':') else {
                continue;
            };
            record.set_field(label.trim(), value.trim().to_string());
        }
        records.push(record);
    }

    records
}

/// Recover the collection timestamp embedded in an artifact name.
fn timestamp_from_name(file_name: &str) -> Option<DateTime<Local>> {
    let tag = file_name
        .strip_prefix(REPORT_PREFIX)?
        .strip_suffix(ARTIFACT_SUFFIX)?;
    let naive = NaiveDateTime::parse_from_str(tag, TIMESTAMP_FORMAT).ok()?;
    naive.and_local_timezone(Local).single()
}

fn modified_time(path: &std::path::Path) -> Option<DateTime<Local>> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Local>::from(modified))
}

fn within_retention(modified: SystemTime, now: SystemTime, max_age: Option<Duration>) -> bool {
    match max_age {
        None => true,
        // A file with a clock-skewed future mtime counts as fresh.
        Some(limit) => now
            .duration_since(modified)
            .map(|age| age <= limit)
            .unwrap_or(true),
    }
}
