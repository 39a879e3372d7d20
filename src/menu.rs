//! Navigation menu construction.
//!
//! The menu is derived from the structure, in structure order, once per
//! language:
//!
//! - entries without a `menu` field are not in the navigation at all;
//! - `menu: [label]` is a top-level item;
//! - `menu: [group, label]` is a drop-down child. Consecutive children with
//!   the same group label share one drop-down. Grouping is purely by
//!   adjacency: `A, A, B, A` yields three drop-downs, the last `A` is not
//!   folded into the first.
//!
//! Manpage entries are expanded from the filesystem: their menu item becomes
//! a group with one link per manpage in the source directory.

use crate::naming::manpage_href;
use crate::scan::{ScanError, visible_files};
use crate::structure::{Generator, Overrides, StructureEntry, StructureError};
use crate::types::{MenuItem, MenuModel};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MenuError {
    #[error(transparent)]
    Structure(#[from] StructureError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("menu of {path} must have one or two labels, found {count}")]
    InvalidLabels { path: String, count: usize },
    #[error("{path}: {generator} entry needs meta.{key}")]
    MissingMeta {
        path: String,
        generator: Generator,
        key: &'static str,
    },
}

/// Where a menu item for `entry` points.
///
/// Separators have no target, links point at their external URL, and
/// internal pages get the language prefix.
pub fn link_target(entry: &StructureEntry, prefix: &str) -> String {
    match entry.effective_generator() {
        None => String::new(),
        Some(Generator::Link) => entry.meta.url.clone().unwrap_or_default(),
        Some(_) => format!("{prefix}{}", entry.path),
    }
}

/// Drop-down currently being filled.
struct OpenGroup {
    label: String,
    items: Vec<MenuItem>,
}

fn flush(open: &mut Option<OpenGroup>, menu: &mut MenuModel) {
    if let Some(group) = open.take()
        && !group.items.is_empty()
    {
        menu.push(MenuItem::Group {
            label: group.label,
            items: group.items,
        });
    }
}

/// One link per manpage below a manpages entry.
fn manpage_items(
    entry: &StructureEntry,
    href: &str,
    content_root: &Path,
) -> Result<Vec<MenuItem>, MenuError> {
    let directory = entry
        .meta
        .directory
        .as_deref()
        .ok_or_else(|| MenuError::MissingMeta {
            path: entry.path.clone(),
            generator: Generator::Manpages,
            key: "directory",
        })?;
    let files = visible_files(&content_root.join(directory))?;
    Ok(files
        .iter()
        .map(|file| MenuItem::link(manpage_href(href, file), file.as_str()))
        .collect())
}

/// Build the navigation for one language.
///
/// `prefix` is `""` for the default language and `/<code>` otherwise.
/// Manpage source directories are resolved against `content_root`.
pub fn build_menu(
    structure: &[StructureEntry],
    overrides: &Overrides,
    prefix: &str,
    content_root: &Path,
) -> Result<MenuModel, MenuError> {
    let mut menu = MenuModel::new();
    let mut open: Option<OpenGroup> = None;

    for base in structure {
        let entry = overrides.apply(base)?;
        let href = link_target(&entry, prefix);
        let Some(labels) = &entry.menu else {
            continue;
        };
        let is_manpages = entry.effective_generator() == Some(Generator::Manpages);

        match labels.as_slice() {
            [label] => {
                flush(&mut open, &mut menu);
                if is_manpages {
                    menu.push(MenuItem::Group {
                        label: label.clone(),
                        items: manpage_items(&entry, &href, content_root)?,
                    });
                } else {
                    menu.push(MenuItem::link(href, label.as_str()));
                }
            }
            [group, label] => {
                if open.as_ref().is_none_or(|g| g.label != *group) {
                    flush(&mut open, &mut menu);
                    open = Some(OpenGroup {
                        label: group.clone(),
                        items: Vec::new(),
                    });
                }
                let item = if is_manpages {
                    MenuItem::Group {
                        label: label.clone(),
                        items: manpage_items(&entry, &href, content_root)?,
                    }
                } else {
                    MenuItem::link(href, label.as_str())
                };
                if let Some(group) = open.as_mut() {
                    group.items.push(item);
                }
            }
            other => {
                return Err(MenuError::InvalidLabels {
                    path: entry.path.clone(),
                    count: other.len(),
                });
            }
        }
    }
    flush(&mut open, &mut menu);

    Ok(menu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, Value};
    use std::fs;
    use tempfile::TempDir;

    fn structure(json: &str) -> Vec<StructureEntry> {
        serde_json::from_str(json).unwrap()
    }

    fn overrides(json: &str) -> Overrides {
        let entries: Vec<Map<String, Value>> = serde_json::from_str(json).unwrap();
        Overrides::from_entries(entries, Path::new("structure.de.json")).unwrap()
    }

    fn build(entries: &[StructureEntry], prefix: &str) -> MenuModel {
        build_menu(entries, &Overrides::default(), prefix, Path::new(".")).unwrap()
    }

    #[test]
    fn single_markdown_page() {
        let entries = structure(
            r#"[{"path": "/", "generator": "markdown", "meta": {"input": "home.md"},
                 "menu": ["Home"], "title": "Home"}]"#,
        );
        assert_eq!(build(&entries, ""), vec![MenuItem::link("/", "Home")]);
    }

    #[test]
    fn prefix_applies_to_internal_paths_only() {
        let entries = structure(
            r#"[
                {"path": "/about/", "generator": "html", "menu": ["About"]},
                {"path": "/gh", "generator": "link", "meta": {"url": "https://github.com/x"},
                 "menu": ["GitHub"]},
                {"path": "/sep", "menu": ["|"]}
            ]"#,
        );
        assert_eq!(
            build(&entries, "/de"),
            vec![
                MenuItem::link("/de/about/", "About"),
                MenuItem::link("https://github.com/x", "GitHub"),
                MenuItem::link("", "|"),
            ]
        );
    }

    #[test]
    fn entries_without_menu_are_skipped() {
        let entries = structure(
            r#"[
                {"path": "/", "generator": "markdown", "menu": ["Home"]},
                {"path": "/hidden/", "generator": "markdown"}
            ]"#,
        );
        assert_eq!(build(&entries, ""), vec![MenuItem::link("/", "Home")]);
    }

    #[test]
    fn adjacent_children_share_a_dropdown() {
        let entries = structure(
            r#"[
                {"path": "/a/x/", "generator": "html", "menu": ["A", "x"]},
                {"path": "/a/y/", "generator": "html", "menu": ["A", "y"]}
            ]"#,
        );
        assert_eq!(
            build(&entries, ""),
            vec![MenuItem::Group {
                label: "A".into(),
                items: vec![MenuItem::link("/a/x/", "x"), MenuItem::link("/a/y/", "y")],
            }]
        );
    }

    #[test]
    fn non_adjacent_groups_are_not_merged() {
        let entries = structure(
            r#"[
                {"path": "/x/", "generator": "html", "menu": ["A", "x"]},
                {"path": "/y/", "generator": "html", "menu": ["A", "y"]},
                {"path": "/z/", "generator": "html", "menu": ["B", "z"]},
                {"path": "/w/", "generator": "html", "menu": ["A", "w"]}
            ]"#,
        );
        let menu = build(&entries, "");
        assert_eq!(menu_labels(&menu), vec!["A", "B", "A"]);
        assert_eq!(group_labels(&menu[0]), vec!["x", "y"]);
        assert_eq!(group_labels(&menu[1]), vec!["z"]);
        assert_eq!(group_labels(&menu[2]), vec!["w"]);
    }

    #[test]
    fn flat_item_closes_open_dropdown() {
        let entries = structure(
            r#"[
                {"path": "/x/", "generator": "html", "menu": ["A", "x"]},
                {"path": "/", "generator": "html", "menu": ["Home"]},
                {"path": "/y/", "generator": "html", "menu": ["A", "y"]}
            ]"#,
        );
        let menu = build(&entries, "");
        assert_eq!(menu_labels(&menu), vec!["A", "Home", "A"]);
    }

    #[test]
    fn override_relabels_and_hides_entries() {
        let entries = structure(
            r#"[
                {"path": "/", "generator": "markdown", "menu": ["Home"]},
                {"path": "/news/", "generator": "markdown", "menu": ["News"]}
            ]"#,
        );
        let ov = overrides(
            r#"[{"path": "/", "menu": ["Start"]}, {"path": "/news/", "menu": null}]"#,
        );
        let menu = build_menu(&entries, &ov, "/de", Path::new(".")).unwrap();
        assert_eq!(menu, vec![MenuItem::link("/de/", "Start")]);
    }

    #[test]
    fn override_can_turn_page_into_external_link() {
        let entries =
            structure(r#"[{"path": "/blog/", "generator": "markdown", "menu": ["Blog"]}]"#);
        let ov = overrides(
            r#"[{"path": "/blog/", "generator": "link", "meta": {"url": "https://blog.de"}}]"#,
        );
        let menu = build_menu(&entries, &ov, "/de", Path::new(".")).unwrap();
        assert_eq!(menu, vec![MenuItem::link("https://blog.de", "Blog")]);
    }

    #[test]
    fn empty_override_is_identity() {
        let entries = structure(
            r#"[
                {"path": "/", "generator": "markdown", "menu": ["Home"]},
                {"path": "/x/", "generator": "html", "menu": ["A", "x"]}
            ]"#,
        );
        let with_empty = build_menu(&entries, &overrides("[]"), "", Path::new(".")).unwrap();
        assert_eq!(with_empty, build(&entries, ""));
    }

    #[test]
    fn too_many_labels_is_error() {
        let entries =
            structure(r#"[{"path": "/x/", "generator": "html", "menu": ["A", "B", "C"]}]"#);
        let err = build_menu(&entries, &Overrides::default(), "", Path::new(".")).unwrap_err();
        assert!(matches!(err, MenuError::InvalidLabels { count: 3, .. }));
    }

    #[test]
    fn flat_manpages_entry_expands_to_group() {
        let tmp = TempDir::new().unwrap();
        let man = tmp.path().join("man");
        fs::create_dir(&man).unwrap();
        for name in ["tool.1", "tool.conf.5", ".hidden"] {
            fs::write(man.join(name), "").unwrap();
        }
        let entries = structure(
            r#"[{"path": "/man/", "generator": "manpages", "meta": {"directory": "man"},
                 "menu": ["Manual"]}]"#,
        );
        let menu = build_menu(&entries, &Overrides::default(), "/de", tmp.path()).unwrap();
        assert_eq!(
            menu,
            vec![MenuItem::Group {
                label: "Manual".into(),
                items: vec![
                    MenuItem::link("/de/man/man1/tool.1.html", "tool.1"),
                    MenuItem::link("/de/man/man5/tool.conf.5.html", "tool.conf.5"),
                ],
            }]
        );
    }

    #[test]
    fn dropdown_manpages_child_nests_inside_group() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("man")).unwrap();
        fs::write(tmp.path().join("man/tool.1"), "").unwrap();
        let entries = structure(
            r#"[
                {"path": "/docs/", "generator": "markdown", "menu": ["Docs", "Guide"]},
                {"path": "/man/", "generator": "manpages", "meta": {"directory": "man"},
                 "menu": ["Docs", "Manpages"]}
            ]"#,
        );
        let menu = build_menu(&entries, &Overrides::default(), "", tmp.path()).unwrap();
        assert_eq!(
            menu,
            vec![MenuItem::Group {
                label: "Docs".into(),
                items: vec![
                    MenuItem::link("/docs/", "Guide"),
                    MenuItem::Group {
                        label: "Manpages".into(),
                        items: vec![MenuItem::link("/man/man1/tool.1.html", "tool.1")],
                    },
                ],
            }]
        );
    }

    #[test]
    fn missing_manpage_directory_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let entries = structure(
            r#"[{"path": "/man/", "generator": "manpages", "meta": {"directory": "man"},
                 "menu": ["Manual"]}]"#,
        );
        let err = build_menu(&entries, &Overrides::default(), "", tmp.path()).unwrap_err();
        assert!(matches!(err, MenuError::Scan(_)));
    }
}
