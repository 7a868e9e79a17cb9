//! Specimen photo files.
//!
//! Photos live outside the database, in a `specimens` subfolder of the
//! app-private pictures directory, and are referenced from specimen rows only
//! by an opaque URI string. Deletion matches the URI's trailing path segment
//! against files in that folder, so a reference scheme prefix does not matter.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::debug;

use crate::error::VerdantError;

pub const SPECIMENS_SUBDIR: &str = "specimens";

fn specimens_dir(pictures_dir: &Path) -> PathBuf {
    pictures_dir.join(SPECIMENS_SUBDIR)
}

/// Trailing path segment of a photo URI, the part that names the file.
fn file_name_from_uri(uri: &str) -> Option<&str> {
    let trimmed = uri.trim_end_matches('/');
    match trimmed.rsplit('/').next() {
        Some("") | None => None,
        Some(name) => Some(name),
    }
}

/// Whether the referenced photo file is present on disk.
pub fn photo_exists(pictures_dir: &Path, uri: Option<&str>) -> bool {
    let Some(uri) = uri.filter(|u| !u.trim().is_empty()) else {
        return false;
    };
    match file_name_from_uri(uri) {
        Some(name) => specimens_dir(pictures_dir).join(name).is_file(),
        None => false,
    }
}

/// Delete the photo file a URI points at. A blank URI or an already-missing
/// file is fine; only a failing filesystem delete is an error.
pub fn delete_photo(pictures_dir: &Path, uri: Option<&str>) -> Result<(), VerdantError> {
    let Some(uri) = uri.filter(|u| !u.trim().is_empty()) else {
        return Ok(());
    };
    let Some(name) = file_name_from_uri(uri) else {
        return Ok(());
    };

    let file = specimens_dir(pictures_dir).join(name);
    if file.exists() {
        fs::remove_file(&file)?;
        debug!("deleted specimen photo {}", file.display());
    }
    Ok(())
}

/// Reserve a path for a new photo: `<sanitized-name>_<timestamp>.jpg` in the
/// specimens folder, creating the folder if needed. The file itself is
/// written by the capture surface.
pub fn new_photo_path(pictures_dir: &Path, specimen_name: &str) -> Result<PathBuf, VerdantError> {
    let dir = specimens_dir(pictures_dir);
    fs::create_dir_all(&dir)?;

    let safe_name = sanitize_name(specimen_name);
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    Ok(dir.join(format!("{safe_name}_{timestamp}.jpg")))
}

fn sanitize_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "specimen".to_owned();
    }
    trimmed
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn place_photo(pictures_dir: &Path, name: &str) -> PathBuf {
        let dir = specimens_dir(pictures_dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, b"jpeg-bytes").unwrap();
        path
    }

    #[test]
    fn exists_matches_by_trailing_segment() {
        let dir = TempDir::new().unwrap();
        place_photo(dir.path(), "Fern_20240101_120000.jpg");

        assert!(photo_exists(
            dir.path(),
            Some("content://app/photos/Fern_20240101_120000.jpg")
        ));
        assert!(photo_exists(dir.path(), Some("Fern_20240101_120000.jpg")));
        assert!(!photo_exists(dir.path(), Some("content://app/photos/other.jpg")));
        assert!(!photo_exists(dir.path(), Some("   ")));
        assert!(!photo_exists(dir.path(), None));
    }

    #[test]
    fn delete_removes_only_the_referenced_file() {
        let dir = TempDir::new().unwrap();
        let kept = place_photo(dir.path(), "kept.jpg");
        let doomed = place_photo(dir.path(), "doomed.jpg");

        delete_photo(dir.path(), Some("scheme://x/y/doomed.jpg")).unwrap();
        assert!(!doomed.exists());
        assert!(kept.exists());
    }

    #[test]
    fn delete_of_missing_file_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        delete_photo(dir.path(), Some("nothing/here.jpg")).unwrap();
        delete_photo(dir.path(), None).unwrap();
        delete_photo(dir.path(), Some("")).unwrap();
    }

    #[test]
    fn new_photo_path_sanitizes_and_creates_folder() {
        let dir = TempDir::new().unwrap();
        let path = new_photo_path(dir.path(), "Mon stéra / géante").unwrap();

        assert!(path.parent().unwrap().ends_with(SPECIMENS_SUBDIR));
        assert!(path.parent().unwrap().is_dir());

        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.starts_with("Mon_st_ra___g_ante_"));
        assert!(file_name.ends_with(".jpg"));
    }

    #[test]
    fn blank_name_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = new_photo_path(dir.path(), "   ").unwrap();
        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.starts_with("specimen_"));
    }
}
