//! Site documents: languages, page structure and per-language overrides.
//!
//! ```text
//! content/
//! ├── config.json          # {"languages": [["", "English"], ["de", "Deutsch"]]}
//! ├── structure.json       # ordered list of structure entries
//! └── structure.de.json    # optional overrides for "de", keyed by path
//! ```
//!
//! A structure entry describes one node of the site tree:
//!
//! ```json
//! {
//!     "path": "/downloads/",
//!     "generator": "downloads",
//!     "meta": {"directory": "downloads", "input": "downloads.md"},
//!     "menu": ["Download"],
//!     "title": "Downloads"
//! }
//! ```
//!
//! Overrides are partial entries. Every field an override carries replaces
//! the base field wholesale; `meta` is not merged key by key.

use crate::types::Language;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SITE_CONFIG_FILE: &str = "config.json";
pub const STRUCTURE_FILE: &str = "structure.json";

#[derive(Error, Debug)]
pub enum StructureError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("override #{index} in {path} has no \"path\" key")]
    OverrideWithoutPath { path: PathBuf, index: usize },
    #[error("override for {path} does not fit the entry schema: {source}")]
    Merge {
        path: String,
        source: serde_json::Error,
    },
}

/// Rendering strategy of a structure entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Generator {
    /// Explicit form of a missing generator: a menu separator.
    Splitter,
    Link,
    Directory,
    Alias,
    Html,
    Markdown,
    Downloads,
    Manpages,
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Splitter => "splitter",
            Self::Link => "link",
            Self::Directory => "directory",
            Self::Alias => "alias",
            Self::Html => "html",
            Self::Markdown => "markdown",
            Self::Downloads => "downloads",
            Self::Manpages => "manpages",
        };
        f.write_str(name)
    }
}

/// Generator parameters. Which keys matter depends on the generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    /// Source file (`html`, `markdown`, preamble of `downloads`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// Source directory (`directory`, `downloads`, `manpages`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    /// External URL of a `link`, or public base path of `downloads`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Un-prefixed path of the entry an `alias` points at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// One node of the site tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureEntry {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<Generator>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: Meta,
    /// `[group]` for a top-level item, `[group, leaf]` for a drop-down child.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu: Option<Vec<String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
}

impl StructureEntry {
    /// Generator with the explicit `splitter` folded into "none".
    pub fn effective_generator(&self) -> Option<Generator> {
        self.generator.filter(|g| *g != Generator::Splitter)
    }

    /// Short description used in error messages and console output.
    pub fn generator_name(&self) -> String {
        self.effective_generator()
            .map_or_else(|| "splitter".to_string(), |g| g.to_string())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `config.json`.
#[derive(Debug, Clone, Deserialize)]
struct SiteDocument {
    languages: Vec<Language>,
}

/// Everything loaded from the required site documents.
#[derive(Debug, Clone)]
pub struct Site {
    pub languages: Vec<Language>,
    pub structure: Vec<StructureEntry>,
}

/// Per-language patches keyed by entry path.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    by_path: HashMap<String, Map<String, Value>>,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// Build from partial entries; each must carry its `path`.
    pub fn from_entries(
        entries: Vec<Map<String, Value>>,
        source: &Path,
    ) -> Result<Self, StructureError> {
        let mut by_path = HashMap::new();
        for (index, entry) in entries.into_iter().enumerate() {
            let Some(path) = entry.get("path").and_then(Value::as_str) else {
                return Err(StructureError::OverrideWithoutPath {
                    path: source.to_path_buf(),
                    index,
                });
            };
            by_path.insert(path.to_string(), entry);
        }
        Ok(Self { by_path })
    }

    /// Shallow-merge the override for `base.path` onto `base`.
    ///
    /// Fields present in the override replace the base fields, one level
    /// deep. Entries without an override come back unchanged.
    pub fn apply(&self, base: &StructureEntry) -> Result<StructureEntry, StructureError> {
        let Some(patch) = self.by_path.get(&base.path) else {
            return Ok(base.clone());
        };
        let merge_err = |source| StructureError::Merge {
            path: base.path.clone(),
            source,
        };
        let value = serde_json::to_value(base).map_err(merge_err)?;
        let mut merged: Map<String, Value> = serde_json::from_value(value).map_err(merge_err)?;
        for (key, value) in patch {
            merged.insert(key.clone(), value.clone());
        }
        serde_json::from_value(Value::Object(merged)).map_err(merge_err)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StructureError> {
    let content = fs::read_to_string(path).map_err(|source| StructureError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| StructureError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the required `config.json` and `structure.json` from the content root.
pub fn load_site(root: &Path) -> Result<Site, StructureError> {
    let document: SiteDocument = read_json(&root.join(SITE_CONFIG_FILE))?;
    let structure: Vec<StructureEntry> = read_json(&root.join(STRUCTURE_FILE))?;
    Ok(Site {
        languages: document.languages,
        structure,
    })
}

/// Path of the override document for a language code.
pub fn override_file(root: &Path, code: &str) -> PathBuf {
    root.join(format!("structure.{code}.json"))
}

/// Load the overrides for one language.
///
/// The default language never has overrides, and a missing file just means
/// the language uses the base structure as-is.
pub fn load_overrides(root: &Path, code: &str) -> Result<Overrides, StructureError> {
    if code.is_empty() {
        return Ok(Overrides::default());
    }
    let path = override_file(root, code);
    if !path.exists() {
        return Ok(Overrides::default());
    }
    let entries: Vec<Map<String, Value>> = read_json(&path)?;
    Overrides::from_entries(entries, &path)
}
