//! Page composition.
//!
//! Every page is composed in two layers: an inner fragment specific to the
//! page kind, then `layout.html` around it.
//!
//! ```text
//! home  → parts/index.html (posts)      ┐
//! post  → article (maud) + body HTML    ├→ layout.html (+ parts/header.html)
//! tag   → parts/tag.html (tag, posts)   ┘
//! ```
//!
//! ## Layout Context
//!
//! | Variable       | Home            | Post              | Tag               |
//! |----------------|-----------------|-------------------|-------------------|
//! | `title`        | site title      | `<post> \| site`  | `#<tag> \| site`  |
//! | `site_title`   | site title      | site title        | site title        |
//! | `css`          | compiled CSS    | compiled CSS      | compiled CSS      |
//! | `content`      | listing         | article           | listing           |
//! | `hero`         | empty `#hero`   | `<img id="hero">` | nothing           |
//! | `tags`         | all tags        | all tags          | all tags          |
//! | `show_sidebar` | true            | false             | false             |
//! | `tag`          | none            | none              | the tag           |
//!
//! Templates are loaded lazily from the templates directory, so a missing or
//! broken template surfaces as an error for the page being rendered.
//! `css`, `content` and `hero` are passed as safe strings; everything else
//! is auto-escaped.

use crate::highlight::Highlighter;
use crate::render::{RenderError, render_content};
use crate::types::{Document, tag_url};
use maud::{Markup, PreEscaped, html};
use minijinja::{Environment, Value, context, path_loader};
use std::path::Path;
use thiserror::Error;

pub const LAYOUT_TEMPLATE: &str = "layout.html";
pub const INDEX_TEMPLATE: &str = "parts/index.html";
pub const TAG_TEMPLATE: &str = "parts/tag.html";

const DISPLAY_DATE: &str = "%B %-d, %Y";

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

/// Layout inputs that vary per page.
struct Page<'a> {
    title: String,
    content: String,
    hero: Markup,
    show_sidebar: bool,
    tag: Option<&'a str>,
}

pub struct Composer {
    env: Environment<'static>,
    site_title: String,
    css: Value,
    tags: Vec<String>,
}

impl Composer {
    pub fn new(templates_dir: &Path, site_title: &str, css: String, tags: &[&str]) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(templates_dir.to_path_buf()));
        Self {
            env,
            site_title: site_title.to_string(),
            css: Value::from_safe_string(css),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn layout(&self, page: Page<'_>) -> Result<String, ComposeError> {
        let template = self.env.get_template(LAYOUT_TEMPLATE)?;
        let html = template.render(context! {
            title => &page.title,
            site_title => &self.site_title,
            css => &self.css,
            content => Value::from_safe_string(page.content),
            hero => Value::from_safe_string(page.hero.into_string()),
            tags => &self.tags,
            show_sidebar => page.show_sidebar,
            tag => page.tag,
        })?;
        Ok(html)
    }

    /// Home page: every document, newest first, with the sidebar.
    pub fn render_home(&self, documents: &[Document]) -> Result<String, ComposeError> {
        let content = self
            .env
            .get_template(INDEX_TEMPLATE)?
            .render(context! { posts => documents })?;
        self.layout(Page {
            title: self.site_title.clone(),
            content,
            hero: html! { div id="hero" {} },
            show_sidebar: true,
            tag: None,
        })
    }

    pub fn render_post(&self, doc: &Document, highlighter: &Highlighter) -> Result<String, ComposeError> {
        let body = render_content(&doc.content, highlighter)?;
        self.layout(Page {
            title: format!("{} | {}", doc.title, self.site_title),
            content: post_article(doc, body).into_string(),
            hero: hero_image(doc.hero.as_deref()),
            show_sidebar: false,
            tag: None,
        })
    }

    pub fn render_tag(&self, tag: &str, documents: &[&Document]) -> Result<String, ComposeError> {
        let content = self
            .env
            .get_template(TAG_TEMPLATE)?
            .render(context! { tag => tag, posts => documents })?;
        self.layout(Page {
            title: format!("#{tag} | {}", self.site_title),
            content,
            hero: html! {},
            show_sidebar: false,
            tag: Some(tag),
        })
    }
}

// ============================================================================
// Fragments
// ============================================================================

fn hero_image(hero: Option<&str>) -> Markup {
    html! {
        @if let Some(src) = hero {
            img id="hero" src=(src);
        }
    }
}

fn post_article(doc: &Document, body: String) -> Markup {
    html! {
        article.post {
            header.post-header {
                h1 { (doc.title) }
                p.post-meta {
                    @if let Some(date) = doc.date {
                        time datetime=(date.to_string()) { (date.format(DISPLAY_DATE).to_string()) }
                        " · "
                    }
                    (doc.read_time) " min read"
                }
                @if !doc.tags.is_empty() {
                    ul.post-tags {
                        @for tag in &doc.tags {
                            li { a href=(tag_url(tag)) { (tag) } }
                        }
                    }
                }
            }
            div.post-body { (PreEscaped(body)) }
        }
    }
}
