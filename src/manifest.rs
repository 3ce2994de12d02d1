//! Metadata index of a .vap3 archive
//!
//! # Archive Structure
//!
//! ```text
//! session.vap3
//! ├── metadata.json               (ArchiveMetadata)
//! ├── plot_options.json           (["TPM", "Draw Pressure", ...])
//! ├── plot_settings.json          (optional)
//! ├── image_crop_states.json      (optional)
//! ├── sheets/
//! │   └── Intense Test/
//! │       ├── data.csv
//! │       ├── metadata.json       (SheetMetadata)
//! │       └── header_data.json    (optional)
//! ├── images/
//! │   └── Intense Test/image_0.png
//! └── sample_images/              (optional)
//!     ├── metadata.json           (SampleImagesMetadata)
//!     ├── crop_states.json        (optional)
//!     └── Sample 1/image_0.jpg
//! ```
//!
//! Archives written by older releases spell the index `meta_data.json`;
//! the reader accepts both.

use crate::error::{Result, Vap3Error};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Parse an ISO-8601 timestamp with or without a UTC offset
///
/// Offset forms (`+02:00`, `Z`) yield the wall-clock time they were
/// written in.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    text.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Format version written into every new archive
pub const FORMAT_VERSION: &str = "1.0";

/// Timestamp layout of new archives (ISO-8601, microseconds, no offset)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Top-level `metadata.json`
///
/// Identity and time are kept exactly as stored; use
/// [`ArchiveMetadata::file_uuid`] and [`ArchiveMetadata::parsed_timestamp`]
/// for typed views. Keys this version does not know survive a load and
/// re-save in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveMetadata {
    /// Format version
    #[serde(default)]
    pub version: String,

    /// Identifier minted for this save (a UUID v4 in new archives)
    #[serde(default)]
    pub file_id: String,

    /// Local time of the save, ISO-8601
    #[serde(default)]
    pub timestamp: String,

    /// Sheets stored under `sheets/`, in session order
    #[serde(default)]
    pub sheet_names: Vec<String>,

    #[serde(default)]
    pub has_images: bool,

    #[serde(default)]
    pub has_sample_images: bool,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ArchiveMetadata {
    /// Create metadata for a new save, with a fresh `file_id` and timestamp
    pub fn new(sheet_names: Vec<String>, has_images: bool, has_sample_images: bool) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            file_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Local::now()
                .naive_local()
                .format(TIMESTAMP_FORMAT)
                .to_string(),
            sheet_names,
            has_images,
            has_sample_images,
            extra: serde_json::Map::new(),
        }
    }

    /// `file_id` as a UUID, if it is one
    pub fn file_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.file_id).ok()
    }

    /// `timestamp` as a wall-clock time, if it parses
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(Vap3Error::from)
    }

    /// Parse from JSON
    pub fn from_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map_err(|e| Vap3Error::InvalidMetadata(format!("metadata.json: {}", e)))
    }
}

/// Per-sheet `metadata.json`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetMetadata {
    #[serde(default)]
    pub is_plotting: bool,

    #[serde(default)]
    pub is_empty: bool,
}

impl SheetMetadata {
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(Vap3Error::from)
    }

    pub fn from_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(Vap3Error::from)
    }
}

/// `sample_images/metadata.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleImagesMetadata {
    #[serde(default)]
    pub version: String,

    /// Same value as the archive's `timestamp`
    #[serde(default)]
    pub timestamp: String,

    #[serde(default)]
    pub sample_count: usize,

    /// Sample header information used to label the images
    #[serde(default)]
    pub header_data: Option<serde_json::Value>,
}

impl SampleImagesMetadata {
    pub fn new(
        timestamp: String,
        sample_count: usize,
        header_data: Option<serde_json::Value>,
    ) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            timestamp,
            sample_count,
            header_data,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(Vap3Error::from)
    }

    pub fn from_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(Vap3Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_creation() {
        let metadata = ArchiveMetadata::new(vec!["Summary".to_string()], true, false);

        assert_eq!(metadata.version, FORMAT_VERSION);
        assert_eq!(metadata.sheet_names, vec!["Summary"]);
        assert!(metadata.has_images);
        assert!(!metadata.has_sample_images);
    }

    #[test]
    fn test_each_metadata_gets_new_id() {
        let a = ArchiveMetadata::new(Vec::new(), false, false);
        let b = ArchiveMetadata::new(Vec::new(), false, false);
        assert_ne!(a.file_id, b.file_id);
    }

    #[test]
    fn test_json_roundtrip() {
        let metadata = ArchiveMetadata::new(vec!["A".into(), "B".into()], false, true);
        let json = metadata.to_json().unwrap();
        let parsed = ArchiveMetadata::from_json(&json).unwrap();
        assert_eq!(parsed, metadata);
    }

    #[test]
    fn test_parse_legacy_document() {
        // Older writers emit Python isoformat timestamps and omit has_sample_images
        let json = br#"{
            "version": "1.0",
            "file_id": "0b7e7c8e-5b8a-4e4e-9d55-6a3f0c2d9a11",
            "timestamp": "2024-05-02T14:03:11.482913",
            "sheet_names": ["Intense Test", "Sheet1"],
            "has_images": false
        }"#;

        let parsed = ArchiveMetadata::from_json(json).unwrap();
        assert_eq!(parsed.sheet_names.len(), 2);
        assert!(!parsed.has_sample_images);
    }

    #[test]
    fn test_timestamps_with_offset() {
        for (stamp, hour) in [
            ("2025-03-14T09:26:53+02:00", 9),
            ("2025-03-14T07:26:53Z", 7),
            ("2025-03-14T09:26:53.589793", 9),
        ] {
            let json = format!(
                r#"{{"version": "1.0", "file_id": "x", "timestamp": "{}", "sheet_names": []}}"#,
                stamp
            );
            let parsed = ArchiveMetadata::from_json(json.as_bytes()).unwrap();
            assert_eq!(parsed.timestamp, stamp);
            let time = parsed.parsed_timestamp().unwrap();
            assert_eq!(chrono::Timelike::hour(&time), hour);
        }
    }

    #[test]
    fn test_stored_values_kept_verbatim() {
        let json = br#"{
            "version": "1.0",
            "file_id": "not-a-uuid",
            "timestamp": "yesterday",
            "sheet_names": ["A"],
            "has_images": false,
            "app_version": "3.2.1"
        }"#;

        let parsed = ArchiveMetadata::from_json(json).unwrap();
        assert_eq!(parsed.file_id, "not-a-uuid");
        assert!(parsed.file_uuid().is_none());
        assert!(parsed.parsed_timestamp().is_none());
        assert_eq!(parsed.extra["app_version"], "3.2.1");

        let again = ArchiveMetadata::from_json(&parsed.to_json().unwrap()).unwrap();
        assert_eq!(again, parsed);
    }

    #[test]
    fn test_new_metadata_is_typed() {
        let metadata = ArchiveMetadata::new(Vec::new(), false, false);
        assert!(metadata.file_uuid().is_some());
        assert!(metadata.parsed_timestamp().is_some());
        assert!(metadata.extra.is_empty());
    }

    #[test]
    fn test_invalid_metadata() {
        let result = ArchiveMetadata::from_json(b"{\"version\": 1}");
        assert!(matches!(result, Err(Vap3Error::InvalidMetadata(_))));
    }

    #[test]
    fn test_sheet_metadata_defaults() {
        let parsed = SheetMetadata::from_json(b"{}").unwrap();
        assert_eq!(parsed, SheetMetadata::default());

        let parsed = SheetMetadata::from_json(br#"{"is_plotting": true, "is_empty": false}"#).unwrap();
        assert!(parsed.is_plotting);
    }
}
