//! Per-device health records and the report that groups them.
//!
//! A record always carries exactly seven fields; anything the tool did not
//! report is stored as the [`NOT_AVAILABLE`] sentinel instead of being
//! dropped. All values stay string-typed: the diagnostic tool already
//! annotates units and vocabulary, and downstream consumers may reparse.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Placeholder for a field the diagnostic tool did not report.
pub const NOT_AVAILABLE: &str = "N/A";

/// Timestamp layout used in artifact file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Persisted field labels, in serialization order.
pub const FIELD_LABELS: [&str; 7] = [
    "Model",
    "Disk Size",
    "Interface",
    "Power On Hours",
    "Power On Count",
    "Host Writes",
    "Health Status",
];

/// Health summary for a single physical storage device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceHealthRecord {
    /// Device model identifier
    pub model: String,
    /// Human-readable capacity, unit-annotated by the tool
    pub size_descriptor: String,
    /// Physical/bus interface label
    pub interface_type: String,
    /// Power-on hours, grouping separators stripped
    pub power_on_hours: String,
    /// Power cycle count
    pub power_on_count: String,
    /// Total host writes in GB, grouping separators stripped
    pub host_writes_gb: String,
    /// Free-text health classification, passed through verbatim
    pub health_status: String,
}

impl Default for DeviceHealthRecord {
    fn default() -> Self {
        let na = || NOT_AVAILABLE.to_string();
        Self {
            model: na(),
            size_descriptor: na(),
            interface_type: na(),
            power_on_hours: na(),
            power_on_count: na(),
            host_writes_gb: na(),
            health_status: na(),
        }
    }
}

impl DeviceHealthRecord {
    /// Label/value pairs in persisted order.
    pub fn fields(&self) -> [(&'static str, &str); 7] {
        [
            (FIELD_LABELS[0], self.model.as_str()),
            (FIELD_LABELS[1], self.size_descriptor.as_str()),
            (FIELD_LABELS[2], self.interface_type.as_str()),
            (FIELD_LABELS[3], self.power_on_hours.as_str()),
            (FIELD_LABELS[4], self.power_on_count.as_str()),
            (FIELD_LABELS[5], self.host_writes_gb.as_str()),
            (FIELD_LABELS[6], self.health_status.as_str()),
        ]
    }

    /// Labels of fields that resolved to the sentinel.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|(_, value)| *value == NOT_AVAILABLE)
            .map(|(label, _)| label)
            .collect()
    }

    /// Set a field by its persisted label. Returns false for unknown labels,
    /// which the catalog re-parser silently skips.
    pub fn set_field(&mut self, label: &str, value: String) -> bool {
        match label {
            "Model" => self.model = value,
            "Disk Size" => self.size_descriptor = value,
            "Interface" => self.interface_type = value,
            "Power On Hours" => self.power_on_hours = value,
            "Power On Count" => self.power_on_count = value,
            "Host Writes" => self.host_writes_gb = value,
            "Health Status" => self.health_status = value,
            _ => return false,
        }
        true
    }
}

/// Ordered device records from one collection run.
///
/// Record order matches device order in the tool's report text; the store
/// never re-sorts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Shared collection timestamp (local time, matching artifact names)
    pub collected_at: DateTime<Local>,
    pub records: Vec<DeviceHealthRecord>,
}

impl Report {
    /// Wrap records with the current local time as collection timestamp.
    pub fn new(records: Vec<DeviceHealthRecord>) -> Self {
        Self::with_timestamp(Local::now(), records)
    }

    pub fn with_timestamp(collected_at: DateTime<Local>, records: Vec<DeviceHealthRecord>) -> Self {
        Self {
            collected_at,
            records,
        }
    }

    /// Timestamp rendered the way artifact file names embed it.
    pub fn timestamp_tag(&self) -> String {
        self.collected_at.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_is_all_sentinel() {
        let record = DeviceHealthRecord::default();
        assert_eq!(record.missing_fields().len(), 7);
        for (_, value) in record.fields() {
            assert_eq!(value, NOT_AVAILABLE);
        }
    }

    #[test]
    fn missing_fields_reports_only_sentinels() {
        let mut record = DeviceHealthRecord::default();
        record.model = "SAMSUNG SSD 870".to_string();
        record.health_status = "Good".to_string();

        let missing = record.missing_fields();
        assert_eq!(missing.len(), 5);
        assert!(!missing.contains(&"Model"));
        assert!(!missing.contains(&"Health Status"));
    }

    #[test]
    fn set_field_rejects_unknown_labels() {
        let mut record = DeviceHealthRecord::default();
        assert!(record.set_field("Model", "WDC WD10EZEX".to_string()));
        assert!(!record.set_field("Disk 1", "header".to_string()));
        assert_eq!(record.model, "WDC WD10EZEX");
    }
}
