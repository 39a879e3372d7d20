//! Page rendering: one structure entry, one language.
//!
//! The generator of an entry decides what ends up below
//! `<output><prefix><path>/`:
//!
//! | Generator | Output |
//! |-----------|--------|
//! | none, `splitter`, `link` | nothing |
//! | `directory` | a recursive copy of `meta.directory` |
//! | `alias` | `index.html` as a relative symlink to the target's page |
//! | `html` | `index.html` with `meta.input` as body |
//! | `markdown` | `index.html` with `meta.input` rendered |
//! | `downloads` | `index.html` with an optional preamble and the file table |
//! | `manpages` | `man<section>/<file>.html` per manpage plus an index page |

use crate::assets::{AssetError, copy_dir_recursive, symlink};
use crate::config::GeneratorConfig;
use crate::downloads::list_downloads;
use crate::manpage::{ManpageError, clean_manpage, convert};
use crate::markdown::{Highlighter, MarkdownError, render_markdown};
use crate::naming::{manpage_href, manpage_relative_url};
use crate::pretty::{PrettyError, prettify};
use crate::scan::{ScanError, visible_files};
use crate::structure::{Generator, Overrides, StructureEntry, StructureError};
use crate::templates::{RenderContext, Template, Templates};
use crate::types::{Language, MenuItem};
use maud::html;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Structure(#[from] StructureError),
    #[error("{generator} entry needs meta.{key}")]
    MissingMeta {
        generator: Generator,
        key: &'static str,
    },
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Markdown(#[from] MarkdownError),
    #[error("manpage {file}: {source}")]
    Manpage { file: String, source: ManpageError },
    #[error(transparent)]
    Pretty(#[from] PrettyError),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Everything a page needs besides its own entry. Built once per language.
#[derive(Clone, Copy)]
pub struct Shared<'a> {
    pub config: &'a GeneratorConfig,
    pub templates: &'a Templates,
    pub highlighter: &'a Highlighter,
    pub content_root: &'a Path,
    pub output_root: &'a Path,
    pub languages: &'a [Language],
    pub language: &'a Language,
    pub menu: &'a [MenuItem],
}

impl Shared<'_> {
    fn prefix(&self) -> String {
        self.language.prefix()
    }
}

/// Output directory of the page at `path` for the language with `prefix`.
pub fn page_dir(output_root: &Path, prefix: &str, path: &str) -> PathBuf {
    let public = format!("{prefix}{path}");
    output_root.join(public.trim_start_matches('/'))
}

/// Relative path from the directory of page `from` to `index.html` of
/// page `to`. Both are un-prefixed site paths.
pub fn alias_target(from: &str, to: &str) -> PathBuf {
    let from: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut target = PathBuf::new();
    for _ in common..from.len() {
        target.push("..");
    }
    for segment in &to[common..] {
        target.push(segment);
    }
    target.push("index.html");
    target
}

fn require<'e>(
    value: &'e Option<String>,
    generator: Generator,
    key: &'static str,
) -> Result<&'e str, RenderError> {
    value
        .as_deref()
        .ok_or(RenderError::MissingMeta { generator, key })
}

fn read_source(root: &Path, relative: &str) -> Result<String, RenderError> {
    let path = root.join(relative);
    fs::read_to_string(&path).map_err(|source| RenderError::Read { path, source })
}

/// Render through `template`, pretty-print and write to `file`.
fn write_page(
    file: &Path,
    template: Template,
    ctx: &RenderContext,
    shared: &Shared,
) -> Result<(), RenderError> {
    let html = shared.templates.render(template, ctx).into_string();
    let pretty = prettify(&html)?;
    let write_err = |source| RenderError::Write {
        path: file.to_path_buf(),
        source,
    };
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(file, pretty).map_err(write_err)?;
    tracing::debug!(file = %file.display(), "Wrote page");
    Ok(())
}

/// Render one entry for the language in `shared`.
///
/// The language override for the entry is merged first. Returns every file
/// or directory written, empty for entries that produce no output.
pub fn render_page(
    base: &StructureEntry,
    overrides: &Overrides,
    shared: &Shared,
) -> Result<Vec<PathBuf>, RenderError> {
    let entry = overrides.apply(base)?;
    let generator = match entry.effective_generator() {
        None | Some(Generator::Link) | Some(Generator::Splitter) => return Ok(Vec::new()),
        Some(generator) => generator,
    };

    let prefix = shared.prefix();
    let dir = page_dir(shared.output_root, &prefix, &entry.path);
    fs::create_dir_all(&dir).map_err(|source| RenderError::Write {
        path: dir.clone(),
        source,
    })?;
    let index = dir.join("index.html");
    let meta = &entry.meta;

    let mut written = Vec::new();
    let mut downloads = Vec::new();
    let content = match generator {
        Generator::Directory => {
            let source = require(&meta.directory, generator, "directory")?;
            fs::remove_dir_all(&dir).map_err(|source| RenderError::Write {
                path: dir.clone(),
                source,
            })?;
            copy_dir_recursive(&shared.content_root.join(source), &dir)?;
            return Ok(vec![dir]);
        }
        Generator::Alias => {
            let target = require(&meta.target, generator, "target")?;
            symlink(&alias_target(&entry.path, target), &index)?;
            return Ok(vec![index]);
        }
        Generator::Html => {
            let input = require(&meta.input, generator, "input")?;
            read_source(shared.content_root, input)?
        }
        Generator::Markdown => {
            let input = require(&meta.input, generator, "input")?;
            let source = read_source(shared.content_root, input)?;
            render_markdown(&source, shared.highlighter)?
        }
        Generator::Downloads => {
            let directory = require(&meta.directory, generator, "directory")?;
            let url = meta.url.clone().unwrap_or_else(|| format!("/{directory}"));
            downloads = list_downloads(
                &shared.content_root.join(directory),
                &url,
                &shared.config.downloads.signature_suffix,
            )?;
            match &meta.input {
                Some(input) => {
                    render_markdown(&read_source(shared.content_root, input)?, shared.highlighter)?
                }
                None => String::new(),
            }
        }
        Generator::Manpages => {
            let directory = require(&meta.directory, generator, "directory")?;
            let (files, index_html) = render_manpages(&entry, directory, &dir, shared)?;
            written.extend(files);
            index_html
        }
        Generator::Link | Generator::Splitter => return Ok(Vec::new()),
    };
    let template = match generator {
        Generator::Downloads => Template::Downloads(&downloads),
        Generator::Manpages => Template::Manpage,
        _ => Template::Page,
    };

    let page_path = format!("{prefix}{}", entry.path);
    let page_menu = entry.menu.clone().unwrap_or_default();
    let ctx = RenderContext {
        page_path: &page_path,
        page_raw_path: &entry.path,
        page_title: &entry.title,
        page_menu: &page_menu,
        content: &content,
        page_language: shared.language,
        languages: shared.languages,
        menu: shared.menu,
    };
    write_page(&index, template, &ctx, shared)?;
    written.insert(0, index);
    Ok(written)
}

/// Convert every manpage of a manpages entry.
///
/// Returns the written files and the body of the entry's index page.
fn render_manpages(
    entry: &StructureEntry,
    directory: &str,
    dir: &Path,
    shared: &Shared,
) -> Result<(Vec<PathBuf>, String), RenderError> {
    let source_dir = shared.content_root.join(directory);
    let files = visible_files(&source_dir)?;
    let known: HashSet<String> = files.iter().cloned().collect();
    let page_path = format!("{}{}", shared.prefix(), entry.path);

    let mut written = Vec::new();
    for file in &files {
        let manpage_err = |source| RenderError::Manpage {
            file: file.clone(),
            source,
        };
        let converted =
            convert(&shared.config.manpages.command, &source_dir.join(file)).map_err(manpage_err)?;
        let body = clean_manpage(&converted, &known).map_err(manpage_err)?;

        let output = dir.join(manpage_relative_url(file));
        let href = manpage_href(&page_path, file);
        let raw_href = manpage_href(&entry.path, file);
        let crumbs = vec![entry.title.clone(), file.clone()];
        let ctx = RenderContext {
            page_path: &href,
            page_raw_path: &raw_href,
            page_title: file,
            page_menu: &crumbs,
            content: &body,
            page_language: shared.language,
            languages: shared.languages,
            menu: shared.menu,
        };
        write_page(&output, Template::Manpage, &ctx, shared)?;
        written.push(output);
    }

    let index = html! {
        ul.manpages {
            @for file in &files {
                li { a href=(manpage_relative_url(file)) { (file) } }
            }
        }
    };
    Ok((written, index.into_string()))
}
