//! vap3-rs: reader and writer for .vap3 test-session archives
//!
//! A .vap3 file is a zip container holding one test session of the
//! viewer:
//! - Sheets as CSV tables, each with a small metadata record
//! - Images attached to sheets and to individual samples
//! - Plot options, plot settings and image crop states as JSON
//! - A metadata index with a per-save file id and timestamp
//!
//! # Example
//!
//! ```no_run
//! use vap3_rs::{Session, Sheet, SheetTable, VapFileManager};
//!
//! let mut session = Session::new();
//! let table = SheetTable::with_rows(["Puffs", "TPM"], vec![])?;
//! session.add_sheet(Sheet::new("Intense Test", table, true));
//!
//! let mut manager = VapFileManager::new();
//! let path = manager.try_save_to_vap3("run", &session)?;
//!
//! let loaded = manager.load_from_vap3(&path)?;
//! assert_eq!(loaded.sheet_names(), vec!["Intense Test"]);
//! manager.cleanup_temp_files();
//! # Ok::<(), vap3_rs::error::Vap3Error>(())
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod manager;
pub mod manifest;
pub mod metrics;
pub mod session;
pub mod sheet;
pub mod temp;

pub use archive::{LoadedArchive, Vap3Reader, Vap3Writer, VAP3_EXTENSION};
pub use config::{CompressionMethod, Vap3Config};
pub use error::{Result, Vap3Error};
pub use manager::VapFileManager;
pub use manifest::{
    parse_timestamp, ArchiveMetadata, SampleImagesMetadata, SheetMetadata, FORMAT_VERSION,
};
pub use metrics::PuffingRegime;
pub use session::Session;
pub use sheet::{is_plotting_sheet, CellValue, Sheet, SheetTable};
pub use temp::TempFiles;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        let _method = CompressionMethod::Zstd;
        let config = Vap3Config::default();
        assert_eq!(config.compression, CompressionMethod::Deflated);
        assert_eq!(VAP3_EXTENSION, "vap3");
    }
}
