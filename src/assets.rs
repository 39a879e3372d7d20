//! Output tree initialization.
//!
//! Every build starts from an empty output directory. Before any page is
//! rendered the static and downloads trees are copied over verbatim, the
//! favicon gets linked at the site root and the syntax-highlighting
//! stylesheet is generated next to the static assets.

use crate::config::GeneratorConfig;
use crate::markdown::{Highlighter, MarkdownError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("asset directory {0} does not exist")]
    MissingDir(PathBuf),
    #[error("IO error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("cannot walk directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("cannot generate highlighting stylesheet: {0}")]
    Stylesheet(#[from] MarkdownError),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> AssetError + '_ {
    move |source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// What [`init_output`] put in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetReport {
    pub static_files: usize,
    pub download_files: usize,
    pub stylesheet: PathBuf,
}

/// Remove `dir` if it exists and create it again, empty.
pub fn reset_dir(dir: &Path) -> Result<(), AssetError> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(io_err(dir))?;
    }
    fs::create_dir_all(dir).map_err(io_err(dir))
}

/// Copy the tree under `src` into `dst`, creating `dst` as needed.
///
/// Returns the number of files copied. A missing `src` is an error.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<usize, AssetError> {
    if !src.is_dir() {
        return Err(AssetError::MissingDir(src.to_path_buf()));
    }
    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(io_err(&target))?;
        } else {
            fs::copy(entry.path(), &target).map_err(io_err(&target))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Create a symbolic link at `link` pointing to `target`.
///
/// `target` is stored as given, so relative targets resolve against the
/// link's own directory.
pub fn symlink(target: &Path, link: &Path) -> Result<(), AssetError> {
    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(target, link);
    #[cfg(windows)]
    let result = std::os::windows::fs::symlink_file(target, link);
    result.map_err(io_err(link))
}

/// Prepare a fresh output tree.
pub fn init_output(
    config: &GeneratorConfig,
    content_root: &Path,
    output_root: &Path,
    highlighter: &Highlighter,
) -> Result<AssetReport, AssetError> {
    let paths = &config.paths;
    reset_dir(output_root)?;

    let static_files = copy_dir_recursive(
        &content_root.join(&paths.static_dir),
        &output_root.join(&paths.static_dir),
    )?;
    let download_files = copy_dir_recursive(
        &content_root.join(&paths.downloads_dir),
        &output_root.join(&paths.downloads_dir),
    )?;

    symlink(
        &Path::new(&paths.static_dir).join(&paths.favicon),
        &output_root.join(&paths.favicon),
    )?;

    let stylesheet = output_root.join(&paths.static_dir).join(&paths.highlight_css);
    fs::write(&stylesheet, highlighter.stylesheet()?).map_err(io_err(&stylesheet))?;

    tracing::debug!(
        static_files,
        download_files,
        output = %output_root.display(),
        "Initialized output tree"
    );
    Ok(AssetReport {
        static_files,
        download_files,
        stylesheet,
    })
}
