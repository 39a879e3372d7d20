//! Manpage conversion and cleanup.
//!
//! Each manpage is converted by an external program (`man2html -r` by
//! default) that prints a complete HTML document. Only part of that document
//! is kept:
//!
//! - everything outside `<body>` is dropped;
//! - the first element inside `<body>` is the converter's own header and is
//!   dropped too;
//! - links are unwrapped (replaced by their text) unless they point back up
//!   to the manpage index, are `mailto:` links, in-page anchors, or
//!   cross-references to another manpage from the same directory.
//!
//! Converter output is old-style HTML (upper-case tags, unclosed `<P>`,
//! unquoted attributes), so it is streamed through `quick-xml` with end-tag
//! checking disabled rather than parsed into a tree.

use crate::naming::manpage_from_href;
use quick_xml::Writer;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Link the converter emits from every page back to the index.
pub const UP_LINK: &str = "../index.html";

#[derive(Error, Debug)]
pub enum ManpageError {
    #[error("manpage converter command is empty")]
    EmptyCommand,
    #[error("cannot run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} failed on {file} ({status}): {stderr}")]
    Failed {
        program: String,
        file: PathBuf,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("converter output is not parsable HTML: {0}")]
    Parse(#[from] quick_xml::Error),
    #[error("converter output has a malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("converter output has no <body>")]
    NoBody,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cleaned manpage is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Run the converter on one manpage and return its stdout.
///
/// `command` is the program followed by its leading arguments; the manpage
/// path is appended. A non-zero exit status is an error.
pub fn convert(command: &[String], file: &Path) -> Result<String, ManpageError> {
    let (program, args) = command.split_first().ok_or(ManpageError::EmptyCommand)?;
    tracing::debug!(program = %program, file = %file.display(), "Converting manpage");

    let output = Command::new(program)
        .args(args)
        .arg(file)
        .output()
        .map_err(|source| ManpageError::Spawn {
            program: program.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(ManpageError::Failed {
            program: program.clone(),
            file: file.to_path_buf(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    // Manpages predating UTF-8 are common enough that a stray Latin-1 byte
    // should not abort the build.
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Whether a link in converted output still leads somewhere after publishing.
fn keep_link(href: &str, known: &HashSet<String>) -> bool {
    href == UP_LINK
        || href.starts_with("mailto:")
        || href.starts_with('#')
        || manpage_from_href(href).is_some_and(|name| known.contains(name))
}

fn href_of(element: &BytesStart) -> Result<Option<String>, ManpageError> {
    for attr in element.html_attributes() {
        let attr = attr?;
        if attr.key.as_ref().eq_ignore_ascii_case(b"href") {
            return Ok(Some(String::from_utf8_lossy(&attr.value).into_owned()));
        }
    }
    Ok(None)
}

fn is_named(name: &[u8], expected: &[u8]) -> bool {
    name.eq_ignore_ascii_case(expected)
}

/// Elements that never have an end tag in converter output.
fn is_void(name: &[u8]) -> bool {
    const VOID: &[&[u8]] = &[b"br", b"hr", b"img", b"meta", b"link", b"input", b"wbr"];
    VOID.iter().any(|v| name.eq_ignore_ascii_case(v))
}

enum Position {
    BeforeBody,
    BeforeFirstChild,
    /// Inside the dropped header element; counts nested same-name elements.
    InFirstChild { name: Vec<u8>, depth: usize },
    Content,
    AfterBody,
}

/// Strip converter chrome and dead links from a converted manpage.
///
/// `known` holds the filenames of all manpages in the same source
/// directory; cross-references to them survive.
pub fn clean_manpage(html: &str, known: &HashSet<String>) -> Result<String, ManpageError> {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.trim_text(false);
    config.allow_dangling_amp = true;
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut writer = Writer::new(Vec::new());
    let mut position = Position::BeforeBody;
    // One flag per open <a>: true when that anchor is being unwrapped.
    let mut anchors: Vec<bool> = Vec::new();

    loop {
        let event = reader.read_event()?;
        if matches!(event, Event::Eof) {
            break;
        }

        let emit = match (&mut position, &event) {
            (Position::BeforeBody, Event::Start(e)) if is_named(e.name().as_ref(), b"body") => {
                position = Position::BeforeFirstChild;
                false
            }
            (Position::BeforeBody, _) | (Position::AfterBody, _) => false,

            (Position::BeforeFirstChild, Event::Start(e)) => {
                let name = e.name().as_ref().to_ascii_lowercase();
                position = if is_void(&name) {
                    Position::Content
                } else {
                    Position::InFirstChild { name, depth: 1 }
                };
                false
            }
            (Position::BeforeFirstChild, Event::Empty(_)) => {
                position = Position::Content;
                false
            }
            (Position::BeforeFirstChild, Event::End(e)) if is_named(e.name().as_ref(), b"body") => {
                position = Position::AfterBody;
                false
            }
            (Position::BeforeFirstChild, _) => false,

            (Position::InFirstChild { name, depth }, Event::Start(e))
                if is_named(e.name().as_ref(), name) =>
            {
                *depth += 1;
                false
            }
            (Position::InFirstChild { name, depth }, Event::End(e))
                if is_named(e.name().as_ref(), name) =>
            {
                *depth -= 1;
                if *depth == 0 {
                    position = Position::Content;
                }
                false
            }
            (Position::InFirstChild { .. }, _) => false,

            (Position::Content, Event::End(e)) if is_named(e.name().as_ref(), b"body") => {
                position = Position::AfterBody;
                false
            }
            (Position::Content, Event::Start(e)) if is_named(e.name().as_ref(), b"a") => {
                let unwrap = href_of(e)?.is_some_and(|href| !keep_link(&href, known));
                anchors.push(unwrap);
                !unwrap
            }
            (Position::Content, Event::Empty(e)) if is_named(e.name().as_ref(), b"a") => {
                !href_of(e)?.is_some_and(|href| !keep_link(&href, known))
            }
            (Position::Content, Event::End(e)) if is_named(e.name().as_ref(), b"a") => {
                !anchors.pop().unwrap_or(false)
            }
            (Position::Content, _) => true,
        };

        if emit {
            writer.write_event(event)?;
        }
    }

    if matches!(position, Position::BeforeBody) {
        return Err(ManpageError::NoBody);
    }
    Ok(String::from_utf8(writer.into_inner())?.trim().to_string())
}
