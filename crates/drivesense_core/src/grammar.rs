//! Parser for the diagnostic tool's free-form report text.
//!
//! Pure extraction, no I/O. Malformed input never fails: absent sections
//! yield an empty record list and a diagnostic event, and each of the seven
//! fields is extracted independently so one bad line cannot poison a block.
//!
//! The device-list section and the per-device detail blocks are extracted
//! independently and matched by position only. The report format carries no
//! join key between a list index and its detail block, so none is invented;
//! the list is used solely to confirm that some devices exist.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::events::{DiagnosticEvent, EventSink};
use crate::record::{DeviceHealthRecord, NOT_AVAILABLE};

/// Device-list section between its banner and the closing 76-dash rule.
static DISK_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)-- Disk List -{63}\n(.*?)\n-{76}").unwrap());

/// One `(N)  <model>` entry inside the device-list section.
static DISK_ENTRY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((\d+)\)\s+(.+)").unwrap());

/// One per-device detail block: banner-framed `(N) <model>` heading, then
/// everything up to the S.M.A.R.T. table marker.
static DISK_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)-{76}\n\s*\(\d+\)\s+.+?\n-{76}\n(.*?)\n-- S\.M\.A\.R\.T\.").unwrap()
});

static MODEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Model\s*:\s*(.+)").unwrap());
static DISK_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Disk Size\s*:\s*(.+)").unwrap());
static INTERFACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Interface\s*:\s*(.+)").unwrap());
// Units for hours and counts vary with the tool's display language, so the
// capture stops at the digits (grouping commas included) and leaves the
// trailing unit text behind.
static POWER_ON_HOURS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Power On Hours\s*:\s*([\d,]+)").unwrap());
static POWER_ON_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Power On Count\s*:\s*([\d,]+)").unwrap());
static HOST_WRITES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Host Writes\s*:\s*([\d,\.]+)\s*GB").unwrap());
static HEALTH_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Health Status\s*:\s*(.+)").unwrap());

/// Extract per-device health records from raw report text.
///
/// Returns an empty vector when the device-list section is absent, lists no
/// devices, or no detail blocks can be found; each case is reported through
/// the sink, never as an error. Within a block the first match for a field
/// label wins.
pub fn parse(raw_text: &str, sink: &dyn EventSink) -> Vec<DeviceHealthRecord> {
    let Some(list_match) = DISK_LIST.captures(raw_text) else {
        sink.emit(DiagnosticEvent::SectionMissing {
            section: "Disk List",
        });
        return Vec::new();
    };
    let list_text = &list_match[1];

    let entries: Vec<(&str, &str)> = DISK_ENTRY
        .captures_iter(list_text)
        .map(|c| {
            (
                c.get(1).map_or("", |m| m.as_str()),
                c.get(2).map_or("", |m| m.as_str()),
            )
        })
        .collect();

    if entries.is_empty() {
        sink.emit(DiagnosticEvent::NoDevicesListed);
        return Vec::new();
    }

    for (number, model) in &entries {
        debug!("device {} listed: {}", number, model.trim());
    }

    let mut records = Vec::new();
    let mut block_count = 0;

    for (idx, captures) in DISK_SECTION.captures_iter(raw_text).enumerate() {
        block_count += 1;
        let block = captures[1].trim();
        if block.is_empty() {
            continue;
        }

        let record = parse_detail_block(block);

        let missing = record.missing_fields();
        if !missing.is_empty() {
            sink.emit(DiagnosticEvent::FieldsDefaulted {
                device_index: idx + 1,
                fields: missing,
            });
        }

        records.push(record);
    }

    if block_count == 0 {
        sink.emit(DiagnosticEvent::SectionMissing {
            section: "device detail blocks",
        });
    }

    records
}

/// Extract the seven fields from one detail block. Every field is attempted
/// in isolation and defaults to the sentinel on its own.
fn parse_detail_block(block: &str) -> DeviceHealthRecord {
    DeviceHealthRecord {
        model: extract(&MODEL, block),
        size_descriptor: extract(&DISK_SIZE, block),
        interface_type: extract(&INTERFACE, block),
        power_on_hours: extract_count(&POWER_ON_HOURS, block),
        power_on_count: extract_count(&POWER_ON_COUNT, block),
        host_writes_gb: extract_count(&HOST_WRITES, block),
        health_status: extract(&HEALTH_STATUS, block),
    }
}

fn extract(pattern: &Regex, text: &str) -> String {
    pattern
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Like [`extract`] but with thousands separators removed.
fn extract_count(pattern: &Regex, text: &str) -> String {
    pattern
        .captures(text)
        .map(|c| c[1].trim().replace(',', ""))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
