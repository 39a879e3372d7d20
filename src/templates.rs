//! Page templates.
//!
//! All pages share one document frame: the `<head>` with stylesheets, the
//! site navigation built from the menu model, a language switcher, a
//! breadcrumb and the page body. The template kind only changes what goes
//! around the body:
//!
//! | Kind | Used for | Body |
//! |------|----------|------|
//! | [`Template::Page`] | html, markdown | content as-is |
//! | [`Template::Manpage`] | manpages and their index | content in `div.manpage` |
//! | [`Template::Downloads`] | downloads | optional preamble, then the file table |
//!
//! Uses [maud](https://maud.lambda.xyz/): interpolated values are escaped,
//! the already-rendered `content` is inserted with `PreEscaped`.

use crate::config::GeneratorConfig;
use crate::downloads::Download;
use crate::types::{Language, MenuItem};
use maud::{DOCTYPE, Markup, PreEscaped, html};

/// Everything a template needs to render one page.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Public path including the language prefix (`/de/about/`).
    pub page_path: &'a str,
    /// Path without the language prefix (`/about/`).
    pub page_raw_path: &'a str,
    pub page_title: &'a str,
    /// Breadcrumb labels, outermost first.
    pub page_menu: &'a [String],
    /// Rendered body HTML.
    pub content: &'a str,
    pub page_language: &'a Language,
    pub languages: &'a [Language],
    pub menu: &'a [MenuItem],
}

#[derive(Debug, Clone, Copy)]
pub enum Template<'a> {
    Page,
    Manpage,
    Downloads(&'a [Download]),
}

/// Template registry, built once per run.
#[derive(Debug, Clone)]
pub struct Templates {
    site_title: String,
    stylesheets: Vec<String>,
    favicon: String,
}

impl Templates {
    pub fn from_config(config: &GeneratorConfig) -> Self {
        let mut stylesheets = config.site.stylesheets.clone();
        stylesheets.push(config.paths.highlight_css_url());
        Self {
            site_title: config.site.title.clone(),
            stylesheets,
            favicon: format!("/{}", config.paths.favicon),
        }
    }

    /// `<page> - <site>`, or just the site title for untitled pages.
    pub fn document_title(&self, page_title: &str) -> String {
        if page_title.is_empty() {
            self.site_title.clone()
        } else {
            format!("{page_title} - {}", self.site_title)
        }
    }

    pub fn render(&self, template: Template, ctx: &RenderContext) -> Markup {
        let body = match template {
            Template::Page => html! {
                main.page { (PreEscaped(ctx.content)) }
            },
            Template::Manpage => html! {
                main.page {
                    div.manpage { (PreEscaped(ctx.content)) }
                }
            },
            Template::Downloads(downloads) => html! {
                main.page {
                    (PreEscaped(ctx.content))
                    (downloads_table(downloads))
                }
            },
        };
        self.base_document(ctx, body)
    }

    fn base_document(&self, ctx: &RenderContext, body: Markup) -> Markup {
        let lang = &ctx.page_language.code;
        html! {
            (DOCTYPE)
            html lang=[(!lang.is_empty()).then_some(lang)] {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { (self.document_title(ctx.page_title)) }
                    link rel="icon" href=(self.favicon);
                    @for href in &self.stylesheets {
                        link rel="stylesheet" href=(href);
                    }
                }
                body {
                    header.site-header {
                        nav.site-nav {
                            (render_menu(ctx.menu, ctx.page_path))
                        }
                        (language_switcher(ctx))
                    }
                    (breadcrumb(ctx.page_menu))
                    (body)
                }
            }
        }
    }
}

fn is_current(item: &MenuItem, current_path: &str) -> bool {
    match item {
        MenuItem::Link { href, .. } => !href.is_empty() && href == current_path,
        MenuItem::Group { items, .. } => items.iter().any(|i| is_current(i, current_path)),
    }
}

/// Renders the navigation menu as nested lists.
pub fn render_menu(items: &[MenuItem], current_path: &str) -> Markup {
    html! {
        ul {
            @for item in items {
                (render_menu_item(item, current_path))
            }
        }
    }
}

fn render_menu_item(item: &MenuItem, current_path: &str) -> Markup {
    let current = is_current(item, current_path);
    html! {
        @match item {
            MenuItem::Link { href, label } => {
                @if item.is_separator() {
                    li.nav-separator role="separator" { (label) }
                } @else {
                    li class=[current.then_some("current")] {
                        a href=(href) { (label) }
                    }
                }
            }
            MenuItem::Group { label, items } => {
                li.nav-group.current[current] {
                    span.nav-group-label { (label) }
                    (render_menu(items, current_path))
                }
            }
        }
    }
}

/// Links to the same page in every language. Hidden for single-language sites.
fn language_switcher(ctx: &RenderContext) -> Markup {
    html! {
        @if ctx.languages.len() > 1 {
            nav.languages {
                ul {
                    @for lang in ctx.languages {
                        @let active = lang.code == ctx.page_language.code;
                        li class=[active.then_some("current")] {
                            a href={ (lang.prefix()) (ctx.page_raw_path) } hreflang=[(!lang.is_default()).then_some(&lang.code)] {
                                (lang.name)
                            }
                        }
                    }
                }
            }
        }
    }
}

fn breadcrumb(labels: &[String]) -> Markup {
    html! {
        @if !labels.is_empty() {
            nav.breadcrumb {
                @for (i, label) in labels.iter().enumerate() {
                    @if i > 0 { " / " }
                    span { (label) }
                }
            }
        }
    }
}

fn downloads_table(downloads: &[Download]) -> Markup {
    html! {
        table.downloads {
            thead {
                tr {
                    th { "File" }
                    th { "Size" }
                    th { "Signature" }
                }
            }
            tbody {
                @for download in downloads {
                    tr {
                        td { a href=(download.path) { (download.name) } }
                        td.size { (format!("{:.2} KiB", download.size_kib)) }
                        td {
                            @if let (Some(name), Some(path)) = (&download.signame, &download.sigpath) {
                                a href=(path) { (name) }
                            }
                        }
                    }
                }
            }
        }
    }
}
