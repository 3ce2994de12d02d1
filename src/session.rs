//! In-memory session: everything a .vap3 archive stores
//!
//! A [`Session`] is what the writer consumes. The reader produces a
//! [`LoadedArchive`](crate::archive::LoadedArchive) with the same pieces plus
//! the extracted image files.

use crate::error::{Result, Vap3Error};
use crate::sheet::Sheet;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

/// Images grouped by source file label, then by sheet name
pub type SheetImages = BTreeMap<String, BTreeMap<String, Vec<PathBuf>>>;

/// Image path → auto-crop enabled
pub type CropStates = BTreeMap<String, bool>;

/// Flat plot settings object
pub type PlotSettings = serde_json::Map<String, serde_json::Value>;

/// Sample id → image paths
pub type SampleImages = BTreeMap<String, Vec<PathBuf>>;

/// The contents of one test session
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Sheets in display order
    pub sheets: Vec<Sheet>,

    /// Images attached to sheets
    pub images: SheetImages,

    /// Plot types offered for the session
    pub plot_options: Vec<String>,

    pub crop_states: Option<CropStates>,

    pub plot_settings: Option<PlotSettings>,

    /// Images attached to individual samples
    pub sample_images: SampleImages,

    pub sample_crop_states: Option<CropStates>,

    /// Sample header information used to label sample images
    pub sample_header_data: Option<serde_json::Value>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet
    pub fn add_sheet(&mut self, sheet: Sheet) -> &mut Self {
        self.sheets.push(sheet);
        self
    }

    /// Attach an image to a sheet under a source file label
    pub fn add_image(
        &mut self,
        file_label: impl Into<String>,
        sheet_name: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> &mut Self {
        self.images
            .entry(file_label.into())
            .or_default()
            .entry(sheet_name.into())
            .or_default()
            .push(path.into());
        self
    }

    /// Attach an image to a sample
    pub fn add_sample_image(&mut self, sample_id: impl Into<String>, path: impl Into<PathBuf>) -> &mut Self {
        self.sample_images
            .entry(sample_id.into())
            .or_default()
            .push(path.into());
        self
    }

    /// Find a sheet by name
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name().to_string()).collect()
    }

    /// Whether any sheet image is attached
    pub fn has_images(&self) -> bool {
        self.images
            .values()
            .any(|sheets| sheets.values().any(|paths| !paths.is_empty()))
    }

    pub fn has_sample_images(&self) -> bool {
        !self.sample_images.is_empty()
    }

    /// Image paths for one sheet across all file labels, in label order
    pub fn images_for_sheet(&self, sheet_name: &str) -> Vec<&PathBuf> {
        self.images
            .values()
            .filter_map(|sheets| sheets.get(sheet_name))
            .flatten()
            .collect()
    }

    /// Sheet names of every attached image, deduplicated, in label order
    pub(crate) fn image_sheet_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.images
            .values()
            .flat_map(|sheets| sheets.keys())
            .map(String::as_str)
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Reject duplicate sheet names
    pub fn check_unique_sheet_names(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for sheet in &self.sheets {
            if !seen.insert(sheet.name()) {
                return Err(Vap3Error::DuplicateSheet(sheet.name().to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::SheetTable;

    #[test]
    fn test_images_for_sheet_spans_labels() {
        let mut session = Session::new();
        session
            .add_image("a.xlsx", "Intense Test", "/tmp/1.png")
            .add_image("b.xlsx", "Intense Test", "/tmp/2.png")
            .add_image("b.xlsx", "Other", "/tmp/3.png");

        let images = session.images_for_sheet("Intense Test");
        assert_eq!(images, vec![&PathBuf::from("/tmp/1.png"), &PathBuf::from("/tmp/2.png")]);
        assert_eq!(session.image_sheet_names(), vec!["Intense Test", "Other"]);
        assert!(session.has_images());
    }

    #[test]
    fn test_empty_image_lists_do_not_count() {
        let mut session = Session::new();
        session
            .images
            .entry("a.xlsx".into())
            .or_default()
            .insert("S".into(), Vec::new());
        assert!(!session.has_images());
    }

    #[test]
    fn test_duplicate_sheet_names() {
        let mut session = Session::new();
        session
            .add_sheet(Sheet::new("A", SheetTable::default(), true))
            .add_sheet(Sheet::new("A", SheetTable::default(), true));

        assert!(matches!(
            session.check_unique_sheet_names(),
            Err(Vap3Error::DuplicateSheet(name)) if name == "A"
        ));
    }
}
