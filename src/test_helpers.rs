//! Shared test utilities for the sitegen test suite.
//!
//! Provides content-tree builders and menu extractors so tests can state
//! expectations as plain label lists.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let content = site_with(
//!     r#"[["", "English"]]"#,
//!     r#"[{"path": "/", "generator": "markdown", "meta": {"input": "home.md"}, "menu": ["Home"]}]"#,
//! );
//! write_file(content.path(), "home.md", "# Hello");
//!
//! let menu = build_menu(&site.structure, &overrides, "", content.path()).unwrap();
//! assert_eq!(menu_labels(&menu), vec!["Home"]);
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::types::MenuItem;

// =========================================================================
// Content trees
// =========================================================================

/// Write `contents` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// A minimal buildable content root.
///
/// `languages` is the JSON array for `config.json`, `structure` the whole
/// `structure.json`. Empty `static/` (with a favicon) and `downloads/`
/// directories are created so output initialization succeeds.
pub fn site_with(languages: &str, structure: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_file(
        tmp.path(),
        "config.json",
        &format!(r#"{{"languages": {languages}}}"#),
    );
    write_file(tmp.path(), "structure.json", structure);
    write_file(tmp.path(), "static/favicon.ico", "");
    fs::create_dir_all(tmp.path().join("downloads")).unwrap();
    tmp
}

// =========================================================================
// Menu extractors
// =========================================================================

/// Labels of the top-level menu items, in order.
pub fn menu_labels(menu: &[MenuItem]) -> Vec<&str> {
    menu.iter().map(MenuItem::label).collect()
}

/// Labels of a group's children. Panics if `item` is not a group.
pub fn group_labels(item: &MenuItem) -> Vec<&str> {
    match item {
        MenuItem::Group { items, .. } => menu_labels(items),
        MenuItem::Link { label, .. } => panic!("{label:?} is a link, not a group"),
    }
}
