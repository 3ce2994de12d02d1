use crate::archive::format::{
    dotted_extension, sample_image_entry, sheet_data_entry, sheet_header_data_entry,
    sheet_image_entry, sheet_metadata_entry, validate_sample_id, validate_sheet_name,
    IMAGE_CROP_STATES_ENTRY, METADATA_ENTRY, PLOT_OPTIONS_ENTRY, PLOT_SETTINGS_ENTRY,
    SAMPLE_CROP_STATES_ENTRY, SAMPLE_IMAGES_METADATA_ENTRY,
};
use crate::config::Vap3Config;
use crate::error::{Result, Vap3Error};
use crate::manifest::{ArchiveMetadata, SampleImagesMetadata, SheetMetadata};
use crate::session::Session;
use crate::sheet::Sheet;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Archive writer for creating .vap3 files
///
/// Entries are streamed into the zip as they are added. Nothing is
/// readable until [`Vap3Writer::finalize`] writes the central directory; a
/// writer dropped before that (including on an error path) deletes its
/// partial output.
pub struct Vap3Writer {
    zip: Option<ZipWriter<BufWriter<File>>>,
    path: PathBuf,
    options: SimpleFileOptions,
}

impl Vap3Writer {
    /// Create a new archive file at exactly `path`, truncating any existing file
    pub fn create<P: AsRef<Path>>(path: P, config: &Vap3Config) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;

        let options = SimpleFileOptions::default()
            .compression_method(config.compression.to_zip())
            .compression_level(config.compression.effective_level(config.compression_level));

        Ok(Self {
            zip: Some(ZipWriter::new(BufWriter::new(file))),
            path,
            options,
        })
    }

    /// Target path of this writer
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn zip(&mut self) -> Result<&mut ZipWriter<BufWriter<File>>> {
        self.zip
            .as_mut()
            .ok_or_else(|| Vap3Error::Other("archive writer already finalized".to_string()))
    }

    /// Add a raw entry
    pub fn add_entry(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let options = self.options.clone();
        let zip = self.zip()?;
        zip.start_file(name, options)?;
        zip.write_all(data)?;
        Ok(())
    }

    /// Add an entry holding `value` as compact JSON
    pub fn add_json<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<()> {
        let json = serde_json::to_vec(value)?;
        self.add_entry(name, &json)
    }

    /// Copy a file from disk into the archive
    pub fn add_file_from_disk(&mut self, name: &str, disk_path: &Path) -> Result<()> {
        let data = std::fs::read(disk_path)?;
        self.add_entry(name, &data)
    }

    /// Add the top-level metadata index
    pub fn add_metadata(&mut self, metadata: &ArchiveMetadata) -> Result<()> {
        let json = metadata.to_json()?;
        self.add_entry(METADATA_ENTRY, &json)
    }

    /// Add a sheet's CSV, metadata and (if present) header data
    pub fn add_sheet(&mut self, sheet: &Sheet) -> Result<()> {
        validate_sheet_name(sheet.name())?;

        let csv = sheet.data().to_csv()?;
        self.add_entry(&sheet_data_entry(sheet.name()), &csv)?;

        let metadata = SheetMetadata {
            is_plotting: sheet.is_plotting(),
            is_empty: sheet.is_empty(),
        };
        self.add_entry(&sheet_metadata_entry(sheet.name()), &metadata.to_json()?)?;

        if let Some(header_data) = sheet.header_data() {
            self.add_json(&sheet_header_data_entry(sheet.name()), header_data)?;
            debug!("Stored header data for sheet {}", sheet.name());
        }

        Ok(())
    }

    /// Add images for one sheet as `images/<sheet>/image_<i><ext>`
    ///
    /// Sources that do not exist are skipped and do not consume an index.
    /// Returns the number of images written.
    pub fn add_sheet_images(&mut self, sheet_name: &str, sources: &[&PathBuf]) -> Result<usize> {
        validate_sheet_name(sheet_name)?;
        self.add_indexed_images(sources, |index, ext| sheet_image_entry(sheet_name, index, ext))
    }

    /// Add images for one sample as `sample_images/<id>/image_<i><ext>`
    pub fn add_sample_images(&mut self, sample_id: &str, sources: &[PathBuf]) -> Result<usize> {
        validate_sample_id(sample_id)?;
        let sources: Vec<&PathBuf> = sources.iter().collect();
        self.add_indexed_images(&sources, |index, ext| sample_image_entry(sample_id, index, ext))
    }

    fn add_indexed_images<F>(&mut self, sources: &[&PathBuf], entry_name: F) -> Result<usize>
    where
        F: Fn(usize, &str) -> String,
    {
        let mut index = 0;
        for source in sources {
            if !source.exists() {
                warn!("Image {:?} does not exist, not stored", source);
                continue;
            }
            let name = entry_name(index, &dotted_extension(source));
            self.add_file_from_disk(&name, source)?;
            index += 1;
        }
        Ok(index)
    }

    /// Write every part of a session
    pub fn write_session(&mut self, session: &Session) -> Result<()> {
        session.check_unique_sheet_names()?;

        let metadata = ArchiveMetadata::new(
            session.sheet_names(),
            session.has_images(),
            session.has_sample_images(),
        );
        self.add_metadata(&metadata)?;
        self.add_json(PLOT_OPTIONS_ENTRY, &session.plot_options)?;

        if let Some(settings) = session.plot_settings.as_ref().filter(|s| !s.is_empty()) {
            self.add_json(PLOT_SETTINGS_ENTRY, settings)?;
        }

        for sheet in &session.sheets {
            self.add_sheet(sheet)?;
        }

        for sheet_name in session.image_sheet_names() {
            let sources = session.images_for_sheet(sheet_name);
            let written = self.add_sheet_images(sheet_name, &sources)?;
            debug!("Stored {} images for sheet {}", written, sheet_name);
        }

        if session.has_sample_images() {
            let sample_metadata = SampleImagesMetadata::new(
                metadata.timestamp.clone(),
                session.sample_images.len(),
                session.sample_header_data.clone(),
            );
            self.add_entry(SAMPLE_IMAGES_METADATA_ENTRY, &sample_metadata.to_json()?)?;

            for (sample_id, sources) in &session.sample_images {
                let written = self.add_sample_images(sample_id, sources)?;
                debug!("Stored {} images for sample {}", written, sample_id);
            }

            if let Some(crop_states) = session.sample_crop_states.as_ref().filter(|c| !c.is_empty()) {
                self.add_json(SAMPLE_CROP_STATES_ENTRY, crop_states)?;
            }
        }

        if let Some(crop_states) = session.crop_states.as_ref().filter(|c| !c.is_empty()) {
            self.add_json(IMAGE_CROP_STATES_ENTRY, crop_states)?;
        }

        info!(
            "Wrote session {} ({} sheets) to {:?}",
            metadata.file_id,
            session.sheets.len(),
            self.path
        );
        Ok(())
    }

    /// Finalize the archive by writing the zip central directory
    pub fn finalize(mut self) -> Result<PathBuf> {
        let zip = self
            .zip
            .take()
            .ok_or_else(|| Vap3Error::Other("archive writer already finalized".to_string()))?;

        match zip.finish().map_err(Vap3Error::from).and_then(|mut inner| {
            inner.flush()?;
            Ok(())
        }) {
            Ok(()) => Ok(std::mem::take(&mut self.path)),
            Err(e) => {
                self.remove_partial_file();
                Err(e)
            }
        }
    }

    fn remove_partial_file(&mut self) {
        if self.path.as_os_str().is_empty() {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed partial archive {:?}", self.path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove partial archive {:?}: {}", self.path, e),
        }
        self.path = PathBuf::new();
    }
}

impl Drop for Vap3Writer {
    fn drop(&mut self) {
        if let Some(zip) = self.zip.take() {
            // Close the file handle before removing it
            drop(zip);
            self.remove_partial_file();
        }
    }
}
