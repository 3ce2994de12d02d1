//! Writer and reader configuration
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! compression = "deflated"
//! compression_level = 6
//! temp_dir = "/var/tmp/dataviewer"
//! temp_prefix = "vap3_"
//! sample_image_extensions = ["png", "jpg"]
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Compression applied to every archive entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMethod {
    /// No compression
    Stored,
    /// Deflate, readable by every zip tool
    #[default]
    Deflated,
    /// Zstandard (smaller archives, fewer compatible readers)
    Zstd,
}

impl CompressionMethod {
    pub(crate) fn to_zip(self) -> zip::CompressionMethod {
        match self {
            Self::Stored => zip::CompressionMethod::Stored,
            Self::Deflated => zip::CompressionMethod::Deflated,
            Self::Zstd => zip::CompressionMethod::Zstd,
        }
    }

    /// Level the zip writer accepts for this method
    ///
    /// Stored entries take no level; others are clamped to the method's range.
    pub fn effective_level(self, requested: Option<i64>) -> Option<i64> {
        match self {
            Self::Stored => None,
            Self::Deflated => requested.map(|level| level.clamp(1, 9)),
            Self::Zstd => requested.map(|level| level.clamp(1, 22)),
        }
    }
}

/// Configuration shared by the archive writer and reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vap3Config {
    /// Entry compression
    pub compression: CompressionMethod,

    /// Compression level, `None` uses the method's default
    pub compression_level: Option<i64>,

    /// Directory extracted images are written to (OS temp dir when unset)
    pub temp_dir: Option<PathBuf>,

    /// File-name prefix for extracted images
    pub temp_prefix: String,

    /// Extensions recognized as images under `sample_images/`
    pub sample_image_extensions: Vec<String>,
}

impl Default for Vap3Config {
    fn default() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
            compression_level: None,
            temp_dir: None,
            temp_prefix: "vap3_".to_string(),
            sample_image_extensions: ["png", "jpg", "jpeg", "gif", "bmp", "pdf"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl Vap3Config {
    /// Parse from a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file on disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serialize to a TOML document
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Directory extracted images go to
    pub fn resolved_temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Whether an entry under `sample_images/` has a recognized image extension
    pub fn is_sample_image(&self, entry_name: &str) -> bool {
        let Some(extension) = Path::new(entry_name).extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.sample_image_extensions
            .iter()
            .any(|ext| ext.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = Vap3Config::from_toml_str("").unwrap();
        assert_eq!(config, Vap3Config::default());
    }

    #[test]
    fn test_parse_overrides() {
        let config = Vap3Config::from_toml_str(
            r#"
            compression = "zstd"
            compression_level = 3
            temp_dir = "/tmp/vap3-test"
            sample_image_extensions = ["png"]
            "#,
        )
        .unwrap();

        assert_eq!(config.compression, CompressionMethod::Zstd);
        assert_eq!(config.compression_level, Some(3));
        assert_eq!(config.resolved_temp_dir(), PathBuf::from("/tmp/vap3-test"));
        assert_eq!(config.temp_prefix, "vap3_");
        assert!(config.is_sample_image("sample_images/S1/image_0.PNG"));
        assert!(!config.is_sample_image("sample_images/S1/image_0.jpg"));
    }

    #[test]
    fn test_unknown_compression_rejected() {
        let result = Vap3Config::from_toml_str(r#"compression = "lzma""#);
        assert!(matches!(result, Err(crate::Vap3Error::TomlError(_))));
    }

    #[test]
    fn test_level_ignored_for_stored() {
        let config = Vap3Config::from_toml_str(
            r#"
            compression = "stored"
            compression_level = 6
            "#,
        )
        .unwrap();
        assert_eq!(config.compression.effective_level(config.compression_level), None);
        assert_eq!(CompressionMethod::Deflated.effective_level(Some(6)), Some(6));
        assert_eq!(CompressionMethod::Deflated.effective_level(Some(40)), Some(9));
        assert_eq!(CompressionMethod::Zstd.effective_level(None), None);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Vap3Config {
            compression: CompressionMethod::Stored,
            ..Vap3Config::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(Vap3Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_extensionless_entry_is_not_image() {
        let config = Vap3Config::default();
        assert!(!config.is_sample_image("sample_images/S1/png"));
        assert!(!config.is_sample_image("sample_images/metadata.json"));
    }
}
