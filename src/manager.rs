//! Save/load entry point used by the application
//!
//! [`VapFileManager`] wraps [`Vap3Writer`] and [`Vap3Reader`] behind the
//! three calls the viewer makes: save a session, load an archive, and
//! delete the images extracted by earlier loads.

use crate::archive::{with_vap3_extension, LoadedArchive, Vap3Reader, Vap3Writer};
use crate::config::Vap3Config;
use crate::error::Result;
use crate::session::Session;
use crate::temp::TempFiles;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Saves and loads .vap3 archives and owns every image extracted by its loads
#[derive(Debug, Default)]
pub struct VapFileManager {
    config: Vap3Config,
    temp_files: TempFiles,
}

impl VapFileManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Vap3Config) -> Self {
        Self {
            config,
            temp_files: TempFiles::new(),
        }
    }

    pub fn config(&self) -> &Vap3Config {
        &self.config
    }

    /// Save a session, returning the path actually written
    ///
    /// `.vap3` is appended to `path` unless already present. On error nothing
    /// is left at the target path.
    pub fn try_save_to_vap3<P: AsRef<Path>>(&self, path: P, session: &Session) -> Result<PathBuf> {
        let path = with_vap3_extension(path.as_ref());
        info!("Saving session to {:?}", path);

        let result = Vap3Writer::create(&path, &self.config).and_then(|mut writer| {
            writer.write_session(session)?;
            writer.finalize()
        });

        if result.is_err() {
            remove_if_present(&path);
        }
        result
    }

    /// Save a session; `false` on failure, with the error logged
    pub fn save_to_vap3<P: AsRef<Path>>(&self, path: P, session: &Session) -> bool {
        match self.try_save_to_vap3(path.as_ref(), session) {
            Ok(written) => {
                info!("Saved {:?}", written);
                true
            }
            Err(e) => {
                error!("Failed to save {:?}: {}", path.as_ref(), e);
                false
            }
        }
    }

    /// Load an archive
    ///
    /// Extracted images stay on disk until [`cleanup_temp_files`] runs or the
    /// manager is dropped, even if the returned value is dropped first.
    ///
    /// [`cleanup_temp_files`]: VapFileManager::cleanup_temp_files
    pub fn load_from_vap3<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadedArchive> {
        let path = path.as_ref();
        info!("Loading {:?}", path);

        let mut loaded = Vap3Reader::open(path)?
            .with_config(self.config.clone())
            .load()?;

        let extracted = loaded.take_temp_files();
        debug!("Tracking {} extracted files from {:?}", extracted.len(), path);
        self.temp_files.absorb(extracted);

        if !loaded.is_complete() {
            warn!(
                "Loaded {:?} without sheets {:?}",
                path, loaded.skipped_sheets
            );
        }
        Ok(loaded)
    }

    /// Number of extracted files currently tracked
    pub fn temp_file_count(&self) -> usize {
        self.temp_files.len()
    }

    /// Delete every file extracted by earlier loads, best-effort
    ///
    /// Returns the number of files removed.
    pub fn cleanup_temp_files(&mut self) -> usize {
        let removed = self.temp_files.cleanup();
        info!("Cleaned up {} temporary files", removed);
        removed
    }
}

fn remove_if_present(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed incomplete archive {:?}", path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove incomplete archive {:?}: {}", path, e),
    }
}
