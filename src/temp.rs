//! Ownership of temporary files extracted from archives
//!
//! Images are extracted to named files so other tools (image viewers,
//! report generators) can open them by path. [`TempFiles`] owns those paths:
//! dropping it deletes them.

use crate::error::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Tracked set of extracted temporary files, deleted on drop
#[derive(Debug, Default)]
pub struct TempFiles {
    paths: Vec<PathBuf>,
}

impl TempFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `data` to a new uniquely named file in `dir` and track it
    ///
    /// `suffix` (usually the image extension, with its dot) is kept so the
    /// file opens with the right application.
    pub fn extract(&mut self, dir: &Path, prefix: &str, suffix: &str, data: &[u8]) -> Result<PathBuf> {
        let mut file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(dir)?;
        file.write_all(data)?;
        file.flush()?;

        let (_, path) = file.keep()?;
        debug!("Extracted {} bytes to {:?}", data.len(), path);
        self.paths.push(path.clone());
        Ok(path)
    }

    /// Take ownership of every path tracked by `other`
    pub fn absorb(&mut self, mut other: TempFiles) {
        self.paths.append(&mut other.paths);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Stop tracking the files and hand their paths to the caller, who
    /// becomes responsible for deleting them
    pub fn into_paths(mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.paths)
    }

    /// Delete every tracked file, best-effort
    ///
    /// Failures are logged, never returned. The tracked list is empty
    /// afterwards. Returns the number of files removed.
    pub fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Could not delete temporary file {:?}: {}", path, e),
            }
        }
        removed
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        if !self.paths.is_empty() {
            self.cleanup();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keeps_suffix() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut files = TempFiles::new();

        let path = files.extract(dir.path(), "vap3_", ".png", b"not really a png")?;

        assert!(path.exists());
        assert!(path.to_string_lossy().ends_with(".png"));
        assert_eq!(std::fs::read(&path)?, b"not really a png");
        assert_eq!(files.len(), 1);
        Ok(())
    }

    #[test]
    fn test_unique_names() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut files = TempFiles::new();

        let a = files.extract(dir.path(), "vap3_", ".jpg", b"a")?;
        let b = files.extract(dir.path(), "vap3_", ".jpg", b"b")?;
        assert_ne!(a, b);
        Ok(())
    }

    #[test]
    fn test_drop_deletes_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = {
            let mut files = TempFiles::new();
            files.extract(dir.path(), "vap3_", ".png", b"x")?
        };
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_cleanup_tolerates_missing_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut files = TempFiles::new();
        let a = files.extract(dir.path(), "vap3_", ".png", b"a")?;
        files.extract(dir.path(), "vap3_", ".png", b"b")?;
        std::fs::remove_file(&a)?;

        assert_eq!(files.cleanup(), 1);
        assert!(files.is_empty());
        Ok(())
    }

    #[test]
    fn test_into_paths_disowns() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut files = TempFiles::new();
        files.extract(dir.path(), "vap3_", ".png", b"x")?;

        let paths = files.into_paths();
        assert!(paths[0].exists());
        std::fs::remove_file(&paths[0])?;
        Ok(())
    }

    #[test]
    fn test_absorb_moves_ownership() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut owner = TempFiles::new();
        let mut loaded = TempFiles::new();
        let path = loaded.extract(dir.path(), "vap3_", ".png", b"x")?;

        owner.absorb(loaded);
        assert!(path.exists());
        assert_eq!(owner.len(), 1);

        drop(owner);
        assert!(!path.exists());
        Ok(())
    }
}
