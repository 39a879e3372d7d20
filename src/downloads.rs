//! Download table generation.
//!
//! A downloads page lists the files of one directory in reverse filename
//! order, so with versioned names the latest release comes first. Detached
//! signatures (`<file>.asc`) are shown next to the file they sign and never
//! get a row of their own.

use crate::scan::{ScanError, visible_files};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// One row of the downloads table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Download {
    pub name: String,
    /// Public URL of the file.
    pub path: String,
    /// Size in KiB, rounded to two decimals.
    pub size_kib: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signame: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sigpath: Option<String>,
}

/// Bytes to KiB, rounded to two decimals.
pub fn size_in_kib(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 * 100.0).round() / 100.0
}

/// Join a public base path and a filename with exactly one slash.
fn public_path(base_url: &str, name: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), name)
}

/// Scan `dir` into download rows, in reverse filename order.
///
/// `base_url` is where the directory is published; `signature_suffix` marks
/// detached signature files.
pub fn list_downloads(
    dir: &Path,
    base_url: &str,
    signature_suffix: &str,
) -> Result<Vec<Download>, ScanError> {
    let files = visible_files(dir)?;
    let mut downloads = Vec::new();

    for name in files.iter().rev() {
        if name.ends_with(signature_suffix) {
            continue;
        }
        let file_path = dir.join(name);
        let metadata = fs::metadata(&file_path).map_err(|source| ScanError {
            path: file_path.clone(),
            source,
        })?;

        let signame = format!("{name}{signature_suffix}");
        let has_signature = files.binary_search(&signame).is_ok();

        downloads.push(Download {
            name: name.clone(),
            path: public_path(base_url, name),
            size_kib: size_in_kib(metadata.len()),
            sigpath: has_signature.then(|| public_path(base_url, &signame)),
            signame: has_signature.then_some(signame),
        });
    }

    Ok(downloads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_sized(dir: &Path, name: &str, bytes: usize) {
        fs::write(dir.join(name), vec![b'x'; bytes]).unwrap();
    }

    #[test]
    fn signature_is_attached_to_its_file() {
        let tmp = TempDir::new().unwrap();
        write_sized(tmp.path(), "foo.tar.gz", 2048);
        write_sized(tmp.path(), "foo.tar.gz.asc", 10);

        let downloads = list_downloads(tmp.path(), "/downloads", ".asc").unwrap();
        assert_eq!(
            downloads,
            vec![Download {
                name: "foo.tar.gz".into(),
                path: "/downloads/foo.tar.gz".into(),
                size_kib: 2.0,
                signame: Some("foo.tar.gz.asc".into()),
                sigpath: Some("/downloads/foo.tar.gz.asc".into()),
            }]
        );
    }

    #[test]
    fn lone_signature_produces_no_row() {
        let tmp = TempDir::new().unwrap();
        write_sized(tmp.path(), "bar.zip.asc", 10);
        assert!(list_downloads(tmp.path(), "/downloads", ".asc").unwrap().is_empty());
    }

    #[test]
    fn rows_are_reverse_sorted() {
        let tmp = TempDir::new().unwrap();
        for name in ["tool-1.0.tar.gz", "tool-1.2.tar.gz", "tool-1.1.tar.gz"] {
            write_sized(tmp.path(), name, 1);
        }
        let names: Vec<String> = list_downloads(tmp.path(), "/downloads/", ".asc")
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(
            names,
            vec!["tool-1.2.tar.gz", "tool-1.1.tar.gz", "tool-1.0.tar.gz"]
        );
    }

    #[test]
    fn unsigned_file_has_no_signature_fields() {
        let tmp = TempDir::new().unwrap();
        write_sized(tmp.path(), "notes.txt", 100);
        let downloads = list_downloads(tmp.path(), "/files", ".asc").unwrap();
        assert_eq!(downloads[0].signame, None);
        assert_eq!(downloads[0].sigpath, None);
        assert_eq!(downloads[0].path, "/files/notes.txt");
    }

    #[test]
    fn hidden_files_and_subdirectories_are_skipped() {
        let tmp = TempDir::new().unwrap();
        write_sized(tmp.path(), ".htaccess", 1);
        fs::create_dir(tmp.path().join("old")).unwrap();
        write_sized(tmp.path(), "a.zip", 1);
        let downloads = list_downloads(tmp.path(), "/downloads", ".asc").unwrap();
        assert_eq!(downloads.len(), 1);
        assert_eq!(downloads[0].name, "a.zip");
    }

    #[test]
    fn size_rounds_to_two_decimals() {
        assert_eq!(size_in_kib(0), 0.0);
        assert_eq!(size_in_kib(1024), 1.0);
        assert_eq!(size_in_kib(1536), 1.5);
        assert_eq!(size_in_kib(1000), 0.98);
        assert_eq!(size_in_kib(12_345_678), 12056.33);
    }

    #[test]
    fn missing_directory_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(list_downloads(&tmp.path().join("nope"), "/d", ".asc").is_err());
    }
}
