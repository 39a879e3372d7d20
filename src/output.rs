//! CLI output formatting for `build` and `check`.
//!
//! # Information-First Display
//!
//! Output is organized by what the site contains, not by the files on disk.
//! Each language is a section; inside it every rendered entry leads with its
//! position and public path, followed by `→` and what was written. Extra
//! files of the same entry (manpages) are indented below it.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! English
//! 001 / (markdown) → index.html
//! 002 /download/ (downloads) → download/index.html
//! 003 /man/ (manpages) → man/index.html
//!     man/man1/tool.1.html
//!
//! Deutsch (/de)
//! 001 /de/ (markdown) → de/index.html
//!
//! Assets
//!     static/ (3 files)
//!     downloads/ (2 files)
//!     static/highlight.css
//!
//! Generated 2 languages, 5 files in output
//! ```
//!
//! ## Check
//!
//! ```text
//! English
//!     Overrides: none
//!     Home → /
//!     Docs
//!         Guide → /docs/
//!     |
//!
//! Checked 4 entries in 1 language
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::config::GeneratorConfig;
use crate::site::{BuildReport, CheckReport};
use crate::types::{Language, MenuItem};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `"1 file"`, `"2 files"`.
fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

/// Section header for a language: its name, plus the prefix if it has one.
fn language_header(language: &Language) -> String {
    if language.is_default() {
        language.name.clone()
    } else {
        format!("{} ({})", language.name, language.prefix())
    }
}

fn display_path(path: &Path) -> String {
    let shown = path.display().to_string();
    if shown.is_empty() { ".".to_string() } else { shown }
}

/// Flatten a menu into indented lines.
fn menu_lines(items: &[MenuItem], depth: usize, lines: &mut Vec<String>) {
    for item in items {
        match item {
            MenuItem::Link { label, .. } if item.is_separator() => {
                lines.push(format!("{}{}", indent(depth), label));
            }
            MenuItem::Link { href, label } => {
                lines.push(format!("{}{} \u{2192} {}", indent(depth), label, href));
            }
            MenuItem::Group { label, items } => {
                lines.push(format!("{}{}", indent(depth), label));
                menu_lines(items, depth + 1, lines);
            }
        }
    }
}

/// Format build output: rendered entries per language, then assets.
pub fn format_build_output(report: &BuildReport, config: &GeneratorConfig) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, language) in report.languages.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(language_header(&language.language));
        for (pos, page) in language.pages.iter().enumerate() {
            let mut files = page.files.iter();
            let first = files.next().map(|f| display_path(f)).unwrap_or_default();
            lines.push(format!(
                "{} {} ({}) \u{2192} {}",
                format_index(pos + 1),
                page.path,
                page.generator,
                first
            ));
            for file in files {
                lines.push(format!("{}{}", indent(1), display_path(file)));
            }
        }
    }

    let paths = &config.paths;
    lines.push(String::new());
    lines.push("Assets".to_string());
    lines.push(format!(
        "{}{}/ ({})",
        indent(1),
        paths.static_dir,
        plural(report.assets.static_files, "file", "files")
    ));
    lines.push(format!(
        "{}{}/ ({})",
        indent(1),
        paths.downloads_dir,
        plural(report.assets.download_files, "file", "files")
    ));
    lines.push(format!(
        "{}{}/{}",
        indent(1),
        paths.static_dir,
        paths.highlight_css
    ));

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {} in {}",
        plural(report.languages.len(), "language", "languages"),
        plural(report.file_count(), "file", "files"),
        report.output_root.display()
    ));
    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &BuildReport, config: &GeneratorConfig) {
    for line in format_build_output(report, config) {
        println!("{}", line);
    }
}

/// Format check output: the menu each language would get.
pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, language) in report.languages.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(language_header(&language.language));
        let overrides = match language.overrides {
            0 => "none".to_string(),
            n => n.to_string(),
        };
        lines.push(format!("{}Overrides: {}", indent(1), overrides));
        menu_lines(&language.menu, 1, &mut lines);
    }
    lines.push(String::new());
    lines.push(format!(
        "Checked {} in {}",
        plural(report.entries, "entry", "entries"),
        plural(report.languages.len(), "language", "languages")
    ));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}
