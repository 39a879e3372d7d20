//! Markdown rendering with class-based syntax highlighting and heading anchors.
//!
//! Fenced code blocks that name a language are highlighted by syntect into
//! `<span class="...">` markup; the colors come from a stylesheet generated
//! from the same theme ([`Highlighter::stylesheet`]). There is no language
//! guessing: a block without a language token, or with one syntect does not
//! know, is emitted as escaped plain text. No line numbers are added.
//!
//! Every heading gets a stable `id` derived from its text plus a `¶`
//! permalink, so the same document always yields the same anchors.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarkdownError {
    #[error("unknown highlight theme {name:?}, available: {available}")]
    UnknownTheme { name: String, available: String },
    #[error("syntax highlighting failed: {0}")]
    Highlight(#[from] syntect::Error),
}

const CLASS_STYLE: ClassStyle = ClassStyle::Spaced;

/// Syntax definitions plus the theme the stylesheet is generated from.
///
/// Loading the bundled syntax set is not free, so one highlighter is built
/// per run and shared by every page.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    pub fn new(theme_name: &str) -> Result<Self, MarkdownError> {
        let mut themes = ThemeSet::load_defaults().themes;
        let Some(theme) = themes.remove(theme_name) else {
            return Err(MarkdownError::UnknownTheme {
                name: theme_name.to_string(),
                available: themes.keys().cloned().collect::<Vec<_>>().join(", "),
            });
        };
        Ok(Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    /// CSS for the classes emitted by [`Highlighter::highlight`].
    pub fn stylesheet(&self) -> Result<String, MarkdownError> {
        Ok(css_for_theme_with_class_style(&self.theme, CLASS_STYLE)?)
    }

    /// Render one code block as `<pre><code>` markup.
    ///
    /// `lang` is the fence info token; anything syntect cannot resolve falls
    /// back to plain text.
    pub fn highlight(&self, lang: Option<&str>, code: &str) -> Result<String, MarkdownError> {
        let syntax = lang.and_then(|token| self.syntaxes.find_syntax_by_token(token));
        let Some(syntax) = syntax else {
            return Ok(format!(
                "<pre class=\"code\"><code>{}</code></pre>\n",
                escape_html(code)
            ));
        };
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        let lang_class = escape_html(lang.unwrap_or_default());
        Ok(format!(
            "<pre class=\"code\"><code class=\"language-{lang_class}\">{}</code></pre>\n",
            generator.finalize()
        ))
    }
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options
}

/// Heading being collected until its end tag.
struct PendingHeading<'a> {
    level: HeadingLevel,
    text: String,
    events: Vec<Event<'a>>,
}

/// Hands out unique anchor ids within one document.
#[derive(Default)]
struct AnchorIds {
    counts: HashMap<String, usize>,
}

impl AnchorIds {
    fn next(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = "section".to_string();
        }
        let count = self.counts.entry(base.clone()).or_default();
        let id = match *count {
            0 => base,
            n => format!("{base}-{n}"),
        };
        *count += 1;
        id
    }
}

/// Render a Markdown document to an HTML fragment.
pub fn render_markdown(source: &str, highlighter: &Highlighter) -> Result<String, MarkdownError> {
    let mut events: Vec<Event> = Vec::new();
    let mut code: Option<(Option<String>, String)> = None;
    let mut heading: Option<PendingHeading> = None;
    let mut anchors = AnchorIds::default();

    for event in Parser::new_ext(source, markdown_options()) {
        if code.is_some() {
            match event {
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, buffer)) = code.take() {
                        let html = highlighter.highlight(lang.as_deref(), &buffer)?;
                        events.push(Event::Html(CowStr::from(html)));
                    }
                }
                Event::Text(text) => {
                    if let Some((_, buffer)) = code.as_mut() {
                        buffer.push_str(&text);
                    }
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string)
                        .filter(|l| !l.is_empty()),
                    CodeBlockKind::Indented => None,
                };
                code = Some((lang, String::new()));
            }
            Event::Start(Tag::Heading { level, .. }) => {
                heading = Some(PendingHeading {
                    level,
                    text: String::new(),
                    events: Vec::new(),
                });
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(pending) = heading.take() {
                    let id = anchors.next(&pending.text);
                    let n = heading_level_to_num(pending.level);
                    events.push(Event::Html(CowStr::from(format!("<h{n} id=\"{id}\">"))));
                    events.extend(pending.events);
                    events.push(Event::Html(CowStr::from(format!(
                        "<a class=\"headerlink\" href=\"#{id}\" title=\"Permalink to this heading\">\u{b6}</a></h{n}>\n"
                    ))));
                }
            }
            other => match heading.as_mut() {
                Some(pending) => {
                    if let Event::Text(text) | Event::Code(text) = &other {
                        pending.text.push_str(text);
                    }
                    pending.events.push(other);
                }
                None => events.push(other),
            },
        }
    }

    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, events.into_iter());
    Ok(html)
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Convert text to URL-safe slug.
///
/// Converts to lowercase, replaces whitespace/dashes/underscores with single dashes,
/// and removes other non-alphanumeric characters.
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true; // Prevents leading dash

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn highlighter() -> &'static Highlighter {
        static HIGHLIGHTER: OnceLock<Highlighter> = OnceLock::new();
        HIGHLIGHTER.get_or_init(|| Highlighter::new("InspiredGitHub").unwrap())
    }

    fn render(source: &str) -> String {
        render_markdown(source, highlighter()).unwrap()
    }

    #[test]
    fn slugify_examples() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What's New?"), "whats-new");
        assert_eq!(slugify("  Spaces  "), "spaces");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
        assert_eq!(slugify("snake_case"), "snake-case");
    }

    #[test]
    fn converts_inline_markup() {
        let html = render("This is **bold** and *italic*.");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>italic</em>"));
    }

    #[test]
    fn headings_get_ids_and_permalinks() {
        let html = render("## Getting Started\n\ntext\n");
        assert!(html.contains(r##"<h2 id="getting-started">Getting Started<a class="headerlink" href="#getting-started""##));
    }

    #[test]
    fn duplicate_headings_get_numbered_ids() {
        let html = render("# Usage\n\n# Usage\n\n# Usage\n");
        assert!(html.contains(r#"id="usage""#));
        assert!(html.contains(r#"id="usage-1""#));
        assert!(html.contains(r#"id="usage-2""#));
    }

    #[test]
    fn heading_anchor_ignores_inline_markup() {
        let html = render("## The `build` *command*\n");
        assert!(html.contains(r#"id="the-build-command""#));
        assert!(html.contains("<code>build</code>"));
        assert!(html.contains("<em>command</em>"));
    }

    #[test]
    fn anchors_are_deterministic() {
        let source = "# A\n\n## B\n\n## B\n";
        assert_eq!(render(source), render(source));
    }

    #[test]
    fn fenced_code_with_language_is_highlighted_with_classes() {
        let html = render("```rust\nfn main() {}\n```\n");
        assert!(html.contains(r#"<pre class="code"><code class="language-rust">"#));
        assert!(html.contains("<span class=\""));
        assert!(!html.contains("style=\""));
    }

    #[test]
    fn code_without_language_is_not_guessed() {
        let html = render("```\nfn main() { 1 < 2 }\n```\n");
        assert!(html.contains("<pre class=\"code\"><code>fn main() { 1 &lt; 2 }\n</code></pre>"));
        assert!(!html.contains("<span"));
    }

    #[test]
    fn unknown_language_falls_back_to_plain_text() {
        let html = render("```nosuchlang\n<tag>\n```\n");
        assert!(html.contains("&lt;tag&gt;"));
        assert!(!html.contains("<span"));
    }

    #[test]
    fn no_line_numbers() {
        let html = render("```python\na = 1\nb = 2\n```\n");
        assert!(!html.contains("lineno"));
    }

    #[test]
    fn tables_are_enabled() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn stylesheet_targets_spaced_classes() {
        let css = highlighter().stylesheet().unwrap();
        assert!(css.contains(".comment"));
        assert!(css.contains('{'));
    }

    #[test]
    fn unknown_theme_is_error() {
        let result = Highlighter::new("No Such Theme");
        assert!(matches!(result, Err(MarkdownError::UnknownTheme { .. })));
    }

    #[test]
    fn escape_html_examples() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
    }
}
