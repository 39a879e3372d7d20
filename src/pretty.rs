//! HTML pretty-printing for generated pages.
//!
//! Block-level elements start on their own line, indented two spaces per
//! nesting level. Inline markup and text are written exactly as they came in,
//! and `pre`, `textarea`, `script` and `style` elements are copied byte for
//! byte, start tag to end tag, without being tokenized. The only whitespace
//! dropped is whitespace-only text sitting directly against a block boundary.
//!
//! Converter output such as man2html's leaves `<P>`, `<LI>`, `<DT>` and
//! `<DD>` unclosed. Their end tags are implied the way HTML parsers imply
//! them, so such pages do not drift to the right.

use quick_xml::Writer;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrettyError {
    #[error("cannot tokenize HTML: {0}")]
    Parse(#[from] quick_xml::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("pretty-printed HTML is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

const INDENT: &[u8] = b"  ";

const BLOCK: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "head", "header", "hr", "html", "li", "link", "main", "meta", "nav", "ol", "p", "pre",
    "script", "section", "style", "summary", "table", "tbody", "td", "textarea", "tfoot", "th",
    "thead", "title", "tr", "ul",
];

const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW: &[&str] = &["pre", "script", "style", "textarea"];

/// Start tags that end an open `p`.
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "ul",
];

fn is_one_of(set: &[&str], name: &str) -> bool {
    set.contains(&name)
}

fn lower(name: &[u8]) -> String {
    String::from_utf8_lossy(name).to_ascii_lowercase()
}

// =========================================================================
// Raw element splitting
// =========================================================================

/// A stretch of the input: markup to tokenize, or a whole raw element.
#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Markup(&'a str),
    Raw { name: &'static str, source: &'a str },
}

fn starts_with_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.len() >= needle.len() && haystack[..needle.len()].eq_ignore_ascii_case(needle)
}

fn tag_name_ends(bytes: &[u8], at: usize) -> bool {
    bytes
        .get(at)
        .is_none_or(|b| *b == b'>' || *b == b'/' || b.is_ascii_whitespace())
}

/// Offset just past the next `>` at or after `from`, or the end of input.
fn past_tag_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|b| *b == b'>')
        .map_or(bytes.len(), |end| from + end + 1)
}

/// Name of the raw element whose start tag begins at `tag`, if any.
fn raw_start(bytes: &[u8], tag: usize) -> Option<&'static str> {
    RAW.iter().copied().find(|name| {
        starts_with_ignore_case(&bytes[tag + 1..], name.as_bytes())
            && tag_name_ends(bytes, tag + 1 + name.len())
    })
}

/// Offset just past the end tag of `name`, or the end of input.
fn raw_end(bytes: &[u8], from: usize, name: &str) -> usize {
    let mut at = from;
    while let Some(offset) = bytes[at..].iter().position(|b| *b == b'<') {
        let tag = at + offset;
        if bytes.get(tag + 1) == Some(&b'/')
            && starts_with_ignore_case(&bytes[tag + 2..], name.as_bytes())
            && tag_name_ends(bytes, tag + 2 + name.len())
        {
            return past_tag_end(bytes, tag);
        }
        at = tag + 1;
    }
    bytes.len()
}

fn split_raw(html: &str) -> Vec<Segment<'_>> {
    let bytes = html.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut at = 0;

    while let Some(offset) = bytes[at..].iter().position(|b| *b == b'<') {
        let tag = at + offset;
        if bytes[tag..].starts_with(b"<!--") {
            at = bytes[tag + 4..]
                .windows(3)
                .position(|w| w == b"-->")
                .map_or(bytes.len(), |end| tag + 4 + end + 3);
            continue;
        }
        let Some(name) = raw_start(bytes, tag) else {
            at = tag + 1;
            continue;
        };
        let end = raw_end(bytes, past_tag_end(bytes, tag), name);
        if start < tag {
            segments.push(Segment::Markup(&html[start..tag]));
        }
        segments.push(Segment::Raw {
            name,
            source: &html[tag..end],
        });
        start = end;
        at = end;
    }
    if start < html.len() {
        segments.push(Segment::Markup(&html[start..]));
    }
    segments
}

// =========================================================================
// Printer
// =========================================================================

struct Frame {
    name: String,
    block: bool,
    has_block_child: bool,
}

struct Printer {
    writer: Writer<Vec<u8>>,
    frames: Vec<Frame>,
    depth: usize,
    /// Whitespace-only text held back until we know what follows it.
    pending_space: Vec<u8>,
}

impl Printer {
    fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
            frames: Vec::new(),
            depth: 0,
            pending_space: Vec::new(),
        }
    }

    fn newline(&mut self, depth: usize) {
        let out = self.writer.get_mut();
        if out.is_empty() {
            return;
        }
        out.push(b'\n');
        for _ in 0..depth {
            out.extend_from_slice(INDENT);
        }
    }

    fn flush_space(&mut self) {
        let space = std::mem::take(&mut self.pending_space);
        self.writer.get_mut().extend_from_slice(&space);
    }

    fn open(&mut self, name: String, block: bool) {
        if block {
            self.depth += 1;
        }
        self.frames.push(Frame {
            name,
            block,
            has_block_child: false,
        });
    }

    /// Pop frames up to and including `name`. Returns whether the closed
    /// element needs its end tag on a fresh line.
    fn close(&mut self, name: &str) -> bool {
        if !self.frames.iter().any(|f| f.name == name) {
            return false;
        }
        while let Some(frame) = self.frames.pop() {
            if frame.block {
                self.depth -= 1;
            }
            if frame.name == name {
                return frame.block && frame.has_block_child;
            }
        }
        false
    }

    fn innermost_block(&self) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find(|f| f.block)
            .map(|f| f.name.as_str())
    }

    /// Close what the start of block `name` implicitly ends: an open `p`,
    /// and an open sibling list item or definition term.
    fn imply_ends(&mut self, name: &str) {
        if is_one_of(CLOSES_P, name) && self.innermost_block() == Some("p") {
            self.close("p");
        }
        let (siblings, scope): (&[&str], &[&str]) = match name {
            "li" => (&["li"], &["ul", "ol"]),
            "dt" | "dd" => (&["dt", "dd"], &["dl"]),
            _ => return,
        };
        let open = self
            .frames
            .iter()
            .rev()
            .take_while(|f| !is_one_of(scope, &f.name))
            .find(|f| is_one_of(siblings, &f.name))
            .map(|f| f.name.clone());
        if let Some(open) = open {
            self.close(&open);
        }
    }

    fn start_block(&mut self, name: &str) {
        self.imply_ends(name);
        if let Some(parent) = self.frames.last_mut() {
            parent.has_block_child = true;
        }
        self.pending_space.clear();
        self.newline(self.depth);
    }

    fn raw(&mut self, name: &str, source: &str) {
        self.start_block(name);
        self.writer.get_mut().extend_from_slice(source.as_bytes());
    }

    fn markup(&mut self, source: &str) -> Result<(), PrettyError> {
        let mut reader = Reader::from_str(source);
        let config = reader.config_mut();
        config.trim_text(false);
        config.allow_dangling_amp = true;
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        loop {
            let event = reader.read_event()?;
            match &event {
                Event::Eof => return Ok(()),
                Event::Text(text) if text.iter().all(u8::is_ascii_whitespace) => {
                    self.pending_space.extend_from_slice(text);
                    continue;
                }
                Event::Start(e) | Event::Empty(e) => {
                    let name = lower(e.name().as_ref());
                    let block = is_one_of(BLOCK, &name);
                    if block {
                        self.start_block(&name);
                    } else {
                        self.flush_space();
                    }
                    if matches!(event, Event::Start(_)) && !is_one_of(VOID, &name) {
                        self.open(name, block);
                    }
                }
                Event::End(e) => {
                    let name = lower(e.name().as_ref());
                    if self.close(&name) {
                        self.pending_space.clear();
                        self.newline(self.depth);
                    } else if is_one_of(BLOCK, &name) {
                        self.pending_space.clear();
                    } else {
                        self.flush_space();
                    }
                }
                Event::DocType(_) => self.pending_space.clear(),
                _ => self.flush_space(),
            }
            self.writer.write_event(event)?;
        }
    }
}

/// Re-indent an HTML document.
pub fn prettify(html: &str) -> Result<String, PrettyError> {
    let mut printer = Printer::new();
    for segment in split_raw(html) {
        match segment {
            Segment::Markup(source) => printer.markup(source)?,
            Segment::Raw { name, source } => printer.raw(name, source),
        }
    }
    let mut out = String::from_utf8(printer.writer.into_inner())?;
    out.push('\n');
    Ok(out)
}
