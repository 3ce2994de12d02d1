use crate::archive::format::{
    legacy_sheet_metadata_entry, parse_image_entry, sheet_data_entry, sheet_header_data_entry,
    sheet_metadata_entry, IMAGES_DIR, IMAGE_CROP_STATES_ENTRY, LEGACY_METADATA_ENTRY,
    METADATA_ENTRY, PLOT_OPTIONS_ENTRY, PLOT_SETTINGS_ENTRY, SAMPLE_CROP_STATES_ENTRY,
    SAMPLE_IMAGES_DIR, SAMPLE_IMAGES_METADATA_ENTRY,
};
use crate::archive::loaded::LoadedArchive;
use crate::config::Vap3Config;
use crate::error::{Result, Vap3Error};
use crate::manifest::{ArchiveMetadata, SampleImagesMetadata, SheetMetadata};
use crate::session::{CropStates, PlotSettings, SampleImages, SheetImages};
use crate::sheet::{Sheet, SheetTable};
use crate::temp::TempFiles;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::result::ZipError;
use zip::ZipArchive;

/// Upper bound on the buffer reserved up front for one entry
///
/// Sizes come from the archive itself, so they are not trusted for
/// allocation; larger entries still read fine, the buffer just grows.
const MAX_PREALLOCATION: u64 = 16 * 1024 * 1024;

/// Archive reader for .vap3 files
pub struct Vap3Reader {
    archive: ZipArchive<BufReader<File>>,
    path: PathBuf,
    entries: HashSet<String>,
    entry_list: Vec<String>,
    config: Vap3Config,
}

impl Vap3Reader {
    /// Open an archive file for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let archive = ZipArchive::new(BufReader::new(file))?;

        let mut entry_list: Vec<String> = archive.file_names().map(str::to_string).collect();
        entry_list.sort();
        let entries = entry_list.iter().cloned().collect();

        Ok(Self {
            archive,
            path,
            entries,
            entry_list,
            config: Vap3Config::default(),
        })
    }

    /// Use a non-default configuration (temp directory, sample image types)
    pub fn with_config(mut self, config: Vap3Config) -> Self {
        self.config = config;
        self
    }

    /// Path the archive was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries in the archive
    pub fn entry_count(&self) -> usize {
        self.entry_list.len()
    }

    /// All entry names, sorted
    pub fn list_files(&self) -> &[String] {
        &self.entry_list
    }

    /// Check if an entry exists
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains(name)
    }

    /// Entry names starting with `prefix`, sorted
    pub fn list_prefix(&self, prefix: &str) -> Vec<&String> {
        self.entry_list
            .iter()
            .filter(|name| name.starts_with(prefix))
            .collect()
    }

    /// Read an entry's bytes
    pub fn read_file(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut entry = self.archive.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => Vap3Error::EntryNotFound(name.to_string()),
            other => Vap3Error::from(other),
        })?;

        let mut data = Vec::with_capacity(entry.size().min(MAX_PREALLOCATION) as usize);
        entry.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read and parse a JSON entry
    pub fn read_json<T: DeserializeOwned>(&mut self, name: &str) -> Result<T> {
        let data = self.read_file(name)?;
        serde_json::from_slice(&data)
            .map_err(|e| Vap3Error::InvalidFormat(format!("Invalid {}: {}", name, e)))
    }

    /// Read a JSON entry if present
    pub fn read_optional_json<T: DeserializeOwned>(&mut self, name: &str) -> Result<Option<T>> {
        if !self.contains(name) {
            return Ok(None);
        }
        self.read_json(name).map(Some)
    }

    /// Read the metadata index, falling back to the legacy `meta_data.json`
    pub fn read_metadata(&mut self) -> Result<ArchiveMetadata> {
        let name = if self.contains(METADATA_ENTRY) {
            METADATA_ENTRY
        } else if self.contains(LEGACY_METADATA_ENTRY) {
            LEGACY_METADATA_ENTRY
        } else {
            return Err(Vap3Error::MetadataNotFound);
        };

        let data = self.read_file(name)?;
        ArchiveMetadata::from_json(&data)
    }

    /// Read one sheet; `None` when its data or metadata entry is missing
    pub fn read_sheet(&mut self, name: &str) -> Result<Option<Sheet>> {
        let metadata_entry = [sheet_metadata_entry(name), legacy_sheet_metadata_entry(name)]
            .into_iter()
            .find(|entry| self.contains(entry));
        let data_entry = sheet_data_entry(name);

        let Some(metadata_entry) = metadata_entry else {
            return Ok(None);
        };
        if !self.contains(&data_entry) {
            return Ok(None);
        }

        let metadata = SheetMetadata::from_json(&self.read_file(&metadata_entry)?)?;
        let data = SheetTable::from_csv(&self.read_file(&data_entry)?)?;
        let header_data = self.read_optional_json(&sheet_header_data_entry(name))?;
        if header_data.is_some() {
            debug!("Loaded header data for sheet {}", name);
        }

        Ok(Some(Sheet::from_stored(
            name.to_string(),
            data,
            metadata.is_empty,
            metadata.is_plotting,
            header_data,
        )))
    }

    /// Load the whole archive
    ///
    /// Images are extracted to temporary files owned by the returned
    /// [`LoadedArchive`]. On error, files extracted so far are deleted before
    /// the error is returned.
    pub fn load(&mut self) -> Result<LoadedArchive> {
        let mut temp_files = TempFiles::new();

        let metadata = self.read_metadata()?;
        let plot_options: Vec<String> =
            self.read_optional_json(PLOT_OPTIONS_ENTRY)?.unwrap_or_default();
        let plot_settings: PlotSettings =
            self.read_optional_json(PLOT_SETTINGS_ENTRY)?.unwrap_or_default();

        let mut sheets = Vec::with_capacity(metadata.sheet_names.len());
        let mut skipped_sheets = Vec::new();
        for name in &metadata.sheet_names {
            match self.read_sheet(name)? {
                Some(sheet) => sheets.push(sheet),
                None => {
                    warn!("Sheet {:?} is listed in the index but missing from {:?}", name, self.path);
                    skipped_sheets.push(name.clone());
                }
            }
        }

        let mut sheet_images = SheetImages::new();
        sheet_images.insert(
            self.file_label(),
            self.extract_images(IMAGES_DIR, &mut temp_files, |_| true)?,
        );

        let mut sample_images = SampleImages::new();
        let mut sample_image_crop_states = CropStates::new();
        let mut sample_images_metadata = None;
        if metadata.has_sample_images {
            sample_images_metadata =
                self.read_optional_json::<SampleImagesMetadata>(SAMPLE_IMAGES_METADATA_ENTRY)?;
            sample_image_crop_states = self
                .read_optional_json(SAMPLE_CROP_STATES_ENTRY)?
                .unwrap_or_default();

            let config = self.config.clone();
            sample_images = self.extract_images(SAMPLE_IMAGES_DIR, &mut temp_files, |name| {
                config.is_sample_image(name)
            })?;
            debug!("Loaded images for {} samples", sample_images.len());
        }

        let image_crop_states: CropStates = self
            .read_optional_json(IMAGE_CROP_STATES_ENTRY)?
            .unwrap_or_default();

        info!(
            "Loaded {} of {} sheets and {} images from {:?}",
            sheets.len(),
            metadata.sheet_names.len(),
            temp_files.len(),
            self.path
        );

        Ok(LoadedArchive {
            metadata,
            sheets,
            skipped_sheets,
            sheet_images,
            image_crop_states,
            plot_options,
            plot_settings,
            sample_images,
            sample_image_crop_states,
            sample_images_metadata,
            temp_files,
        })
    }

    /// Archive file name, used as the file label of extracted sheet images
    fn file_label(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extract `<dir>/<owner>/<file>` entries, grouped by owner and ordered
    /// by image index
    fn extract_images<F>(
        &mut self,
        dir: &str,
        temp_files: &mut TempFiles,
        accept: F,
    ) -> Result<BTreeMap<String, Vec<PathBuf>>>
    where
        F: Fn(&str) -> bool,
    {
        let mut grouped: BTreeMap<String, Vec<(usize, String, String)>> = BTreeMap::new();
        for name in &self.entry_list {
            if !accept(name) {
                continue;
            }
            if let Some(entry) = parse_image_entry(dir, name) {
                grouped.entry(entry.owner.to_string()).or_default().push((
                    entry.index.unwrap_or(usize::MAX),
                    name.clone(),
                    entry.extension,
                ));
            }
        }

        let temp_dir = self.config.resolved_temp_dir();
        let prefix = self.config.temp_prefix.clone();
        let mut extracted = BTreeMap::new();
        for (owner, mut images) in grouped {
            images.sort();
            let mut paths = Vec::with_capacity(images.len());
            for (_, name, extension) in images {
                let data = self.read_file(&name)?;
                paths.push(temp_files.extract(&temp_dir, &prefix, &extension, &data)?);
            }
            extracted.insert(owner, paths);
        }
        Ok(extracted)
    }
}
