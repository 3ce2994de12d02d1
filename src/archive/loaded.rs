use crate::manifest::{ArchiveMetadata, SampleImagesMetadata};
use crate::session::{CropStates, PlotSettings, SampleImages, Session, SheetImages};
use crate::sheet::Sheet;
use crate::temp::TempFiles;
use std::path::PathBuf;

/// Everything read back from a .vap3 archive
///
/// Image paths point at temporary files owned by this value: they are
/// deleted when it is dropped unless ownership is moved out with
/// [`LoadedArchive::take_temp_files`] or [`LoadedArchive::into_session`].
#[derive(Debug)]
pub struct LoadedArchive {
    /// The archive's metadata index, as stored
    pub metadata: ArchiveMetadata,

    /// Sheets that were fully present, in index order
    pub sheets: Vec<Sheet>,

    /// Sheets listed in the index whose data or metadata entry is missing
    pub skipped_sheets: Vec<String>,

    /// Extracted images: archive file name → sheet name → temp paths
    pub sheet_images: SheetImages,

    pub image_crop_states: CropStates,

    pub plot_options: Vec<String>,

    pub plot_settings: PlotSettings,

    /// Extracted sample images: sample id → temp paths
    pub sample_images: SampleImages,

    pub sample_image_crop_states: CropStates,

    pub sample_images_metadata: Option<SampleImagesMetadata>,

    pub(crate) temp_files: TempFiles,
}

impl LoadedArchive {
    /// True when every sheet named in the index was loaded
    pub fn is_complete(&self) -> bool {
        self.skipped_sheets.is_empty()
    }

    /// Find a loaded sheet by name
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Sheet::name).collect()
    }

    /// Temporary files extracted by this load
    pub fn temp_files(&self) -> &[PathBuf] {
        self.temp_files.paths()
    }

    /// Move ownership of the extracted files to the caller
    pub fn take_temp_files(&mut self) -> TempFiles {
        std::mem::take(&mut self.temp_files)
    }

    /// Turn the loaded archive back into a session that can be edited and
    /// saved again
    ///
    /// The returned [`TempFiles`] owns the extracted images the session
    /// refers to; keep it alive until the session has been saved.
    pub fn into_session(mut self) -> (Session, TempFiles) {
        let temp_files = self.take_temp_files();
        let session = Session {
            sheets: self.sheets,
            images: self.sheet_images,
            plot_options: self.plot_options,
            crop_states: Some(self.image_crop_states).filter(|c| !c.is_empty()),
            plot_settings: Some(self.plot_settings).filter(|s| !s.is_empty()),
            sample_images: self.sample_images,
            sample_crop_states: Some(self.sample_image_crop_states).filter(|c| !c.is_empty()),
            sample_header_data: self.sample_images_metadata.and_then(|m| m.header_data),
        };
        (session, temp_files)
    }
}
