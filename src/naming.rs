//! Filename conventions for manpages and hidden files.
//!
//! Manpage sources are named `<name>.<section>` (`ls.1`, `Foo::Bar.3pm`).
//! The section decides the output subdirectory, mirroring the layout the
//! converter assumes when it writes relative cross-references
//! (`../man1/ls.1.html`):
//!
//! ```text
//! <entry path>/
//! ├── index.html            # list of all manpages
//! ├── man1/
//! │   └── ls.1.html
//! └── man3pm/
//!     └── Foo::Bar.3pm.html
//! ```

/// Result of parsing a manpage filename like `ls.1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ManpageName {
    /// Everything before the last dot. The whole filename if there is none.
    pub name: String,
    /// Suffix after the last dot. Empty if there is none.
    pub section: String,
}

/// Parse a manpage filename following the `name.section` convention.
///
/// - `"ls.1"` → name="ls", section="1"
/// - `"Foo::Bar.3pm"` → name="Foo::Bar", section="3pm"
/// - `"tar.gz.5"` → name="tar.gz", section="5"
/// - `"README"` → name="README", section=""
pub fn parse_manpage_name(filename: &str) -> ManpageName {
    match filename.rsplit_once('.') {
        Some((name, section)) if !name.is_empty() => ManpageName {
            name: name.to_string(),
            section: section.to_string(),
        },
        _ => ManpageName {
            name: filename.to_string(),
            section: String::new(),
        },
    }
}

/// Location of a rendered manpage relative to its entry directory.
pub fn manpage_relative_url(filename: &str) -> String {
    let parsed = parse_manpage_name(filename);
    format!("man{}/{}.html", parsed.section, filename)
}

/// Absolute link to a rendered manpage below an entry's (prefixed) path.
pub fn manpage_href(entry_href: &str, filename: &str) -> String {
    format!(
        "{}/{}",
        entry_href.trim_end_matches('/'),
        manpage_relative_url(filename)
    )
}

/// Recover the manpage filename a converted cross-reference points at.
///
/// `"../man1/ls.1.html"` → `Some("ls.1")`. Links that do not end in
/// `.html` are not manpage references.
pub fn manpage_from_href(href: &str) -> Option<&str> {
    let path = href.split(['#', '?']).next().unwrap_or(href);
    let last = path.rsplit('/').next()?;
    last.strip_suffix(".html").filter(|name| !name.is_empty())
}

/// Dotfiles are never published.
pub fn is_hidden(filename: &str) -> bool {
    filename.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_one() {
        let p = parse_manpage_name("ls.1");
        assert_eq!(p.name, "ls");
        assert_eq!(p.section, "1");
    }

    #[test]
    fn multi_character_section() {
        let p = parse_manpage_name("Foo::Bar.3pm");
        assert_eq!(p.name, "Foo::Bar");
        assert_eq!(p.section, "3pm");
    }

    #[test]
    fn only_last_dot_splits() {
        let p = parse_manpage_name("tar.gz.5");
        assert_eq!(p.name, "tar.gz");
        assert_eq!(p.section, "5");
    }

    #[test]
    fn no_section() {
        let p = parse_manpage_name("README");
        assert_eq!(p.name, "README");
        assert_eq!(p.section, "");
    }

    #[test]
    fn leading_dot_is_not_a_section() {
        let p = parse_manpage_name(".profile");
        assert_eq!(p.name, ".profile");
        assert_eq!(p.section, "");
    }

    #[test]
    fn relative_url_uses_section_directory() {
        assert_eq!(manpage_relative_url("ls.1"), "man1/ls.1.html");
        assert_eq!(manpage_relative_url("git-config.5"), "man5/git-config.5.html");
    }

    #[test]
    fn href_joins_entry_path_without_double_slash() {
        assert_eq!(manpage_href("/man/", "ls.1"), "/man/man1/ls.1.html");
        assert_eq!(manpage_href("/de/man", "ls.1"), "/de/man/man1/ls.1.html");
    }

    #[test]
    fn href_back_to_filename() {
        assert_eq!(manpage_from_href("../man1/ls.1.html"), Some("ls.1"));
        assert_eq!(manpage_from_href("other.1.html"), Some("other.1"));
        assert_eq!(manpage_from_href("other.1.html#OPTIONS"), Some("other.1"));
        assert_eq!(manpage_from_href("https://example.org/"), None);
        assert_eq!(manpage_from_href("../man1/"), None);
    }

    #[test]
    fn dotfiles_are_hidden() {
        assert!(is_hidden(".gitignore"));
        assert!(!is_hidden("ls.1"));
    }
}
