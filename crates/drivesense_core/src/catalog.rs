//! Read-only catalog over persisted report artifacts.
//!
//! The surface callers browse history through: bare file names out of
//! `list`, one fetched report by name. Storage reports carry no retention
//! window; history is expected to be small and manually curated.

use std::path::PathBuf;

use crate::record::Report;
use crate::store::{ArtifactStore, REPORT_PREFIX};

pub struct ReportCatalog {
    store: ArtifactStore,
}

impl ReportCatalog {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: ArtifactStore::new(log_dir),
        }
    }

    /// Available report artifacts, most recent first. File names only; they
    /// double as the key for [`fetch`](Self::fetch).
    pub fn list(&self) -> Vec<String> {
        self.store.list(REPORT_PREFIX, None)
    }

    /// Load one artifact by name. `None` if absent or unreadable; corrupted
    /// content comes back as a report with zero records.
    pub fn fetch(&self, file_name: &str) -> Option<Report> {
        self.store.read(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DeviceHealthRecord, Report};
    use tempfile::tempdir;

    #[test]
    fn catalog_lists_and_fetches_what_the_store_wrote() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let mut record = DeviceHealthRecord::default();
        record.model = "SAMSUNG SSD 870".to_string();
        let file_name = store.write(&Report::new(vec![record])).unwrap();

        let catalog = ReportCatalog::new(dir.path());
        assert_eq!(catalog.list(), vec![file_name.clone()]);

        let report = catalog.fetch(&file_name).unwrap();
        assert_eq!(report.records[0].model, "SAMSUNG SSD 870");
        assert!(catalog.fetch("storage_info_log_unknown.txt").is_none());
    }
}
