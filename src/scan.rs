//! Directory listing shared by the menu builder and the page generators.
//!
//! Downloads, manpages and the manpage sub-menus all look at the same kind
//! of listing: the regular files directly inside one directory, dotfiles
//! excluded, sorted by filename. A missing or unreadable directory is an
//! error, never an empty listing.

use crate::naming::is_hidden;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("cannot list {path}: {source}")]
pub struct ScanError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// Names of the regular, non-hidden files directly inside `dir`, sorted.
///
/// Symlinks count when they resolve to a regular file. Subdirectories are
/// ignored.
pub fn visible_files(dir: &Path) -> Result<Vec<String>, ScanError> {
    let err = |source| ScanError {
        path: dir.to_path_buf(),
        source,
    };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(err)? {
        let entry = entry.map_err(err)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_hidden(&name) || !entry.path().is_file() {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lists_sorted_regular_files() {
        let tmp = TempDir::new().unwrap();
        for name in ["zsh.1", "ls.1", "cat.1"] {
            fs::write(tmp.path().join(name), "").unwrap();
        }
        assert_eq!(
            visible_files(tmp.path()).unwrap(),
            vec!["cat.1", "ls.1", "zsh.1"]
        );
    }

    #[test]
    fn skips_hidden_files_and_directories() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".hidden"), "").unwrap();
        fs::create_dir(tmp.path().join("subdir")).unwrap();
        fs::write(tmp.path().join("subdir/inner.1"), "").unwrap();
        fs::write(tmp.path().join("ls.1"), "").unwrap();
        assert_eq!(visible_files(tmp.path()).unwrap(), vec!["ls.1"]);
    }

    #[test]
    fn missing_directory_is_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        let err = visible_files(&missing).unwrap_err();
        assert_eq!(err.path, missing);
    }
}
