//! Whole-site build driver.
//!
//! ```text
//! load site documents ─→ init output ─→ for each language:
//!                                         load overrides
//!                                         build menu
//!                                         render every entry
//! ```
//!
//! Languages are built in the order `config.json` lists them. The first
//! failure aborts the run; the error names the language, the entry and its
//! generator.

use crate::assets::{AssetError, AssetReport, init_output};
use crate::config::GeneratorConfig;
use crate::markdown::{Highlighter, MarkdownError};
use crate::menu::{MenuError, build_menu};
use crate::render::{RenderError, Shared, render_page};
use crate::structure::{StructureError, load_overrides, load_site};
use crate::templates::Templates;
use crate::types::{Language, MenuModel};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Structure(#[from] StructureError),
    #[error(transparent)]
    Highlight(#[from] MarkdownError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("language {language:?}: menu: {source}")]
    Menu { language: String, source: MenuError },
    #[error("language {language:?}: {path} ({generator}): {source}")]
    Render {
        language: String,
        path: String,
        generator: String,
        source: RenderError,
    },
}

/// One rendered structure entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PageOutput {
    /// Public path, prefix included.
    pub path: String,
    pub generator: String,
    /// Files and directories written, relative to the output root.
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct LanguageReport {
    pub language: Language,
    pub overrides: usize,
    pub menu: MenuModel,
    pub pages: Vec<PageOutput>,
}

/// Everything a build produced, for console output.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output_root: PathBuf,
    pub assets: AssetReport,
    pub languages: Vec<LanguageReport>,
}

impl BuildReport {
    /// Number of pages, manpages, symlinks and mounted directories written.
    pub fn file_count(&self) -> usize {
        self.languages
            .iter()
            .flat_map(|l| &l.pages)
            .map(|p| p.files.len())
            .sum()
    }
}

/// Summary of a successful check.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub entries: usize,
    pub languages: Vec<LanguageReport>,
}

fn relative_to(root: &Path, file: PathBuf) -> PathBuf {
    match file.strip_prefix(root) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => file,
    }
}

/// Build the complete site from `content_root` into `output_root`.
pub fn build_site(
    content_root: &Path,
    output_root: &Path,
    config: &GeneratorConfig,
) -> Result<BuildReport, BuildError> {
    let site = load_site(content_root)?;
    let highlighter = Highlighter::new(&config.highlight.theme)?;
    let templates = Templates::from_config(config);
    let assets = init_output(config, content_root, output_root, &highlighter)?;

    let mut languages = Vec::new();
    for language in &site.languages {
        let overrides = load_overrides(content_root, &language.code)?;
        let prefix = language.prefix();
        tracing::info!(
            language = %language.name,
            prefix = %prefix,
            overrides = overrides.len(),
            "Building language"
        );

        let menu = build_menu(&site.structure, &overrides, &prefix, content_root).map_err(
            |source| BuildError::Menu {
                language: language.code.clone(),
                source,
            },
        )?;

        let shared = Shared {
            config,
            templates: &templates,
            highlighter: &highlighter,
            content_root,
            output_root,
            languages: &site.languages,
            language,
            menu: &menu,
        };

        let mut pages = Vec::new();
        for base in &site.structure {
            let entry = overrides.apply(base)?;
            let files = render_page(base, &overrides, &shared).map_err(|source| {
                BuildError::Render {
                    language: language.code.clone(),
                    path: entry.path.clone(),
                    generator: entry.generator_name(),
                    source,
                }
            })?;
            if files.is_empty() {
                continue;
            }
            pages.push(PageOutput {
                path: format!("{prefix}{}", entry.path),
                generator: entry.generator_name(),
                files: files
                    .into_iter()
                    .map(|f| relative_to(output_root, f))
                    .collect(),
            });
        }

        languages.push(LanguageReport {
            language: language.clone(),
            overrides: overrides.len(),
            menu,
            pages,
        });
    }

    Ok(BuildReport {
        output_root: output_root.to_path_buf(),
        assets,
        languages,
    })
}

/// Load and validate everything a build would use, without writing output.
///
/// Covers the site documents, every language's overrides and menu
/// (including manpage directories) and the highlight theme.
pub fn check_site(
    content_root: &Path,
    config: &GeneratorConfig,
) -> Result<CheckReport, BuildError> {
    let site = load_site(content_root)?;
    Highlighter::new(&config.highlight.theme)?;

    let mut languages = Vec::new();
    for language in &site.languages {
        let overrides = load_overrides(content_root, &language.code)?;
        let menu = build_menu(&site.structure, &overrides, &language.prefix(), content_root)
            .map_err(|source| BuildError::Menu {
                language: language.code.clone(),
                source,
            })?;
        languages.push(LanguageReport {
            language: language.clone(),
            overrides: overrides.len(),
            menu,
            pages: Vec::new(),
        });
    }

    Ok(CheckReport {
        entries: site.structure.len(),
        languages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use crate::types::MenuItem;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn config() -> GeneratorConfig {
        let mut config = GeneratorConfig::default();
        config.manpages.command = vec!["cat".to_string()];
        config
    }

    #[test]
    fn builds_every_language_under_its_prefix() {
        let content = site_with(
            r#"[["", "English"], ["de", "Deutsch"]]"#,
            r#"[{"path": "/", "generator": "markdown", "meta": {"input": "home.md"},
                 "menu": ["Home"], "title": "Home"}]"#,
        );
        write_file(content.path(), "home.md", "Hello");
        let out = TempDir::new().unwrap();

        let report = build_site(content.path(), out.path(), &config()).unwrap();

        assert_eq!(report.languages.len(), 2);
        assert_eq!(report.languages[1].menu, vec![MenuItem::link("/de/", "Home")]);
        assert_eq!(
            report.languages[1].pages,
            vec![PageOutput {
                path: "/de/".into(),
                generator: "markdown".into(),
                files: vec![PathBuf::from("de/index.html")],
            }]
        );
        assert!(out.path().join("index.html").is_file());
        assert!(out.path().join("de/index.html").is_file());
        assert_eq!(report.file_count(), 2);
    }

    #[test]
    fn render_error_names_language_entry_and_generator() {
        let content = site_with(
            r#"[["", "English"]]"#,
            r#"[{"path": "/broken/", "generator": "html", "meta": {"input": "missing.html"}}]"#,
        );
        let out = TempDir::new().unwrap();
        let err = build_site(content.path(), out.path(), &config()).unwrap_err();
        match &err {
            BuildError::Render {
                language,
                path,
                generator,
                ..
            } => {
                assert_eq!(language, "");
                assert_eq!(path, "/broken/");
                assert_eq!(generator, "html");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("missing.html"));
    }

    #[test]
    fn missing_structure_is_fatal() {
        let content = TempDir::new().unwrap();
        fs::write(content.path().join("config.json"), r#"{"languages": [["", "English"]]}"#)
            .unwrap();
        let out = TempDir::new().unwrap();
        let err = build_site(content.path(), out.path(), &config()).unwrap_err();
        assert!(matches!(err, BuildError::Structure(StructureError::Read { .. })));
    }

    #[test]
    fn unknown_theme_is_fatal() {
        let content = site_with(r#"[["", "English"]]"#, "[]");
        let mut config = config();
        config.highlight.theme = "Nope".into();
        let err = check_site(content.path(), &config).unwrap_err();
        assert!(matches!(err, BuildError::Highlight(_)));
    }

    #[test]
    fn check_writes_nothing() {
        let content = site_with(
            r#"[["", "English"], ["de", "Deutsch"]]"#,
            r#"[{"path": "/", "generator": "markdown", "menu": ["Home"]}]"#,
        );
        write_file(
            content.path(),
            "structure.de.json",
            r#"[{"path": "/", "menu": ["Start"]}]"#,
        );
        let report = check_site(content.path(), &config()).unwrap();
        assert_eq!(report.entries, 1);
        assert_eq!(report.languages[1].overrides, 1);
        assert_eq!(report.languages[1].menu, vec![MenuItem::link("/de/", "Start")]);
        assert!(!content.path().join("output").exists());
    }

    #[test]
    fn check_reports_bad_menu() {
        let content = site_with(
            r#"[["", "English"]]"#,
            r#"[{"path": "/", "generator": "markdown", "menu": []}]"#,
        );
        let err = check_site(content.path(), &config()).unwrap_err();
        assert!(matches!(err, BuildError::Menu { .. }));
    }
}
