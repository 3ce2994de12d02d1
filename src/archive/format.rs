use crate::error::{Result, Vap3Error};
use std::path::Path;

/// File extension of session archives
pub const VAP3_EXTENSION: &str = "vap3";

/// Top-level metadata index
pub const METADATA_ENTRY: &str = "metadata.json";

/// Spelling of the metadata index used by older writers
pub const LEGACY_METADATA_ENTRY: &str = "meta_data.json";

pub const PLOT_OPTIONS_ENTRY: &str = "plot_options.json";
pub const PLOT_SETTINGS_ENTRY: &str = "plot_settings.json";
pub const IMAGE_CROP_STATES_ENTRY: &str = "image_crop_states.json";

pub const SHEETS_DIR: &str = "sheets";
pub const IMAGES_DIR: &str = "images";
pub const SAMPLE_IMAGES_DIR: &str = "sample_images";

pub const SHEET_DATA_FILE: &str = "data.csv";
pub const SHEET_HEADER_DATA_FILE: &str = "header_data.json";

pub const SAMPLE_IMAGES_METADATA_ENTRY: &str = "sample_images/metadata.json";
pub const SAMPLE_CROP_STATES_ENTRY: &str = "sample_images/crop_states.json";

/// `sheets/<name>/data.csv`
pub fn sheet_data_entry(sheet_name: &str) -> String {
    format!("{}/{}/{}", SHEETS_DIR, sheet_name, SHEET_DATA_FILE)
}

/// `sheets/<name>/metadata.json`
pub fn sheet_metadata_entry(sheet_name: &str) -> String {
    format!("{}/{}/{}", SHEETS_DIR, sheet_name, METADATA_ENTRY)
}

/// `sheets/<name>/meta_data.json`
pub fn legacy_sheet_metadata_entry(sheet_name: &str) -> String {
    format!("{}/{}/{}", SHEETS_DIR, sheet_name, LEGACY_METADATA_ENTRY)
}

/// `sheets/<name>/header_data.json`
pub fn sheet_header_data_entry(sheet_name: &str) -> String {
    format!("{}/{}/{}", SHEETS_DIR, sheet_name, SHEET_HEADER_DATA_FILE)
}

/// `images/<sheet>/image_<i><ext>`
pub fn sheet_image_entry(sheet_name: &str, index: usize, extension: &str) -> String {
    format!("{}/{}/image_{}{}", IMAGES_DIR, sheet_name, index, extension)
}

/// `sample_images/<sample>/image_<i><ext>`
pub fn sample_image_entry(sample_id: &str, index: usize, extension: &str) -> String {
    format!("{}/{}/image_{}{}", SAMPLE_IMAGES_DIR, sample_id, index, extension)
}

/// Extension of a source path including the leading dot, or `""`
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

/// An image entry split into its owner (sheet or sample) and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry<'a> {
    pub owner: &'a str,
    pub index: Option<usize>,
    pub extension: String,
}

/// Parse `<dir>/<owner>/<file>` into an [`ImageEntry`]
///
/// Returns `None` for entries outside `dir`, directory entries, and entries
/// nested deeper than one level.
pub fn parse_image_entry<'a>(dir: &str, entry_name: &'a str) -> Option<ImageEntry<'a>> {
    let mut parts = entry_name.split('/');
    if parts.next()? != dir {
        return None;
    }
    let owner = parts.next()?;
    let file_name = parts.next()?;
    if parts.next().is_some() || owner.is_empty() || file_name.is_empty() {
        return None;
    }

    let stem = file_name.split('.').next().unwrap_or(file_name);
    let index = stem.strip_prefix("image_").and_then(|i| i.parse().ok());

    Some(ImageEntry {
        owner,
        index,
        extension: dotted_extension(Path::new(file_name)),
    })
}

/// Check that a sheet name can be used as a single archive path segment
pub fn validate_sheet_name(name: &str) -> Result<()> {
    if is_valid_segment(name) {
        Ok(())
    } else {
        Err(Vap3Error::InvalidSheetName(name.to_string()))
    }
}

/// Check that a sample id can be used as a single archive path segment
pub fn validate_sample_id(id: &str) -> Result<()> {
    if is_valid_segment(id) {
        Ok(())
    } else {
        Err(Vap3Error::InvalidSampleId(id.to_string()))
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}

/// Append `.vap3` unless the path already ends with it (any case)
pub fn with_vap3_extension(path: &Path) -> std::path::PathBuf {
    let has_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(VAP3_EXTENSION));

    if has_extension {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".");
        name.push(VAP3_EXTENSION);
        name.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_entry_names() {
        assert_eq!(sheet_data_entry("Intense Test"), "sheets/Intense Test/data.csv");
        assert_eq!(sheet_metadata_entry("S"), "sheets/S/metadata.json");
        assert_eq!(sheet_image_entry("S", 2, ".png"), "images/S/image_2.png");
        assert_eq!(sample_image_entry("Sample 1", 0, ".jpg"), "sample_images/Sample 1/image_0.jpg");
    }

    #[test]
    fn test_parse_image_entry() {
        let entry = parse_image_entry(IMAGES_DIR, "images/Intense Test/image_12.jpeg").unwrap();
        assert_eq!(entry.owner, "Intense Test");
        assert_eq!(entry.index, Some(12));
        assert_eq!(entry.extension, ".jpeg");

        let entry = parse_image_entry(IMAGES_DIR, "images/S/photo.png").unwrap();
        assert_eq!(entry.index, None);

        assert!(parse_image_entry(IMAGES_DIR, "images/S/").is_none());
        assert!(parse_image_entry(IMAGES_DIR, "images/S/a/b.png").is_none());
        assert!(parse_image_entry(IMAGES_DIR, "sheets/S/data.csv").is_none());
        assert!(parse_image_entry(IMAGES_DIR, "images/").is_none());
    }

    #[test]
    fn test_sheet_name_validation() {
        assert!(validate_sheet_name("Intense Test").is_ok());
        assert!(validate_sheet_name("Q&A (v2)").is_ok());
        assert!(validate_sheet_name("").is_err());
        assert!(validate_sheet_name("..").is_err());
        assert!(validate_sheet_name("a/b").is_err());
        assert!(validate_sheet_name("a\\b").is_err());
        assert!(matches!(
            validate_sample_id("x/y"),
            Err(Vap3Error::InvalidSampleId(_))
        ));
    }

    #[test]
    fn test_with_vap3_extension() {
        assert_eq!(
            with_vap3_extension(Path::new("/tmp/session")),
            PathBuf::from("/tmp/session.vap3")
        );
        assert_eq!(
            with_vap3_extension(Path::new("/tmp/session.vap3")),
            PathBuf::from("/tmp/session.vap3")
        );
        assert_eq!(
            with_vap3_extension(Path::new("/tmp/session.VAP3")),
            PathBuf::from("/tmp/session.VAP3")
        );
        assert_eq!(
            with_vap3_extension(Path::new("/tmp/data.xlsx")),
            PathBuf::from("/tmp/data.xlsx.vap3")
        );
    }

    #[test]
    fn test_dotted_extension() {
        assert_eq!(dotted_extension(Path::new("/a/b.PNG")), ".PNG");
        assert_eq!(dotted_extension(Path::new("/a/b")), "");
    }
}
