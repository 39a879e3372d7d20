//! Shared types used across the pipeline.
//!
//! The menu model is produced by [`crate::menu`], consumed by
//! [`crate::templates`] and summarized by [`crate::output`], so it lives here
//! rather than in any one of them.

use serde::{Deserialize, Serialize};

/// A site language: a code and the name shown in the language switcher.
///
/// Deserialized from a two-element JSON array (`["de", "Deutsch"]`). The
/// empty code is the default language and gets no URL prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Language {
    pub code: String,
    pub name: String,
}

impl Language {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.code.is_empty()
    }

    /// URL path prefix for this language: `""` or `/<code>`.
    pub fn prefix(&self) -> String {
        if self.is_default() {
            String::new()
        } else {
            format!("/{}", self.code)
        }
    }
}

impl From<(String, String)> for Language {
    fn from((code, name): (String, String)) -> Self {
        Self { code, name }
    }
}

impl From<Language> for (String, String) {
    fn from(lang: Language) -> Self {
        (lang.code, lang.name)
    }
}

/// One navigation item.
///
/// A `Link` with an empty `href` is a visual separator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MenuItem {
    Link { href: String, label: String },
    Group { label: String, items: Vec<MenuItem> },
}

impl MenuItem {
    pub fn link(href: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Link {
            href: href.into(),
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Link { label, .. } | Self::Group { label, .. } => label,
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, Self::Link { href, .. } if href.is_empty())
    }
}

/// The full navigation for one language, in structure order.
pub type MenuModel = Vec<MenuItem>;
