//! # sitegen
//!
//! A static site generator for small multi-language project websites: a few
//! content pages, a downloads page with signatures, a set of manpages.
//!
//! # Architecture: One Pass Per Language
//!
//! The site is declared, not discovered. `structure.json` lists every entry
//! in menu order; each entry names a generator that decides what is written
//! at its path. A build runs once, top to bottom:
//!
//! ```text
//! 1. Load      config.json + structure.json + generator.toml
//! 2. Assets    wipe output/, copy static/ and downloads/, favicon, highlight.css
//! 3. Per language (in config.json order):
//!      overrides  structure.<code>.json merged into each entry
//!      menu       built from the merged structure
//!      render     every entry → output/<prefix><path>/
//! ```
//!
//! Nothing reads back its own output, so there are no intermediate files and
//! every build starts from an empty output directory.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Optional `generator.toml`: loading, merging onto stock defaults, validation |
//! | [`structure`] | `config.json`, `structure.json` and per-language overrides |
//! | [`types`] | Shared types: `Language`, the menu model |
//! | [`menu`] | Menu model built from the structure, drop-downs grouped by adjacency |
//! | [`assets`] | Output initialization: static trees, favicon link, highlight stylesheet |
//! | [`render`] | One entry in one language: dispatch on the generator |
//! | [`markdown`] | Markdown to HTML with class-based highlighting and heading anchors |
//! | [`downloads`] | Download table rows with detached signatures |
//! | [`manpage`] | External converter call and cleanup of its HTML |
//! | [`templates`] | Maud page templates: nav, language switcher, breadcrumb |
//! | [`pretty`] | Re-indentation of generated HTML |
//! | [`site`] | Build driver over all languages, and the read-only check |
//! | [`scan`] | Directory listings shared by downloads and manpages |
//! | [`naming`] | Manpage filename conventions |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Languages Are Overlays
//!
//! The default language (code `""`) owns the structure. Every other language
//! only lists what differs, keyed by path, and a present field replaces the
//! base field wholesale: an override with `meta` replaces all of `meta`, and
//! `"menu": null` hides an entry. An empty override file builds exactly what
//! no override file builds.
//!
//! ## Adjacency Grouping
//!
//! Drop-down groups are formed from consecutive entries with the same group
//! label. The menu therefore always reads in structure order, and splitting a
//! group in two is just a matter of putting something between its entries.
//!
//! ## Highlighting With Classes
//!
//! Code is highlighted with CSS classes, not inline styles, and the matching
//! stylesheet is generated from the configured syntect theme at build time.
//! Changing the theme is a config change; no page needs re-rendering by hand.
//!
//! ## Manpages Through a Subprocess
//!
//! Manpages are converted by an external program (`man2html -r` by default)
//! and its output is cleaned up rather than parsing roff here. Any converter
//! that prints an HTML document works, which is also how the tests run:
//! `cat` on files that already contain HTML.

pub mod assets;
pub mod config;
pub mod downloads;
pub mod manpage;
pub mod markdown;
pub mod menu;
pub mod naming;
pub mod output;
pub mod pretty;
pub mod render;
pub mod scan;
pub mod site;
pub mod structure;
pub mod templates;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
