//! Content rendering: document content tree → HTML fragment.
//!
//! Walks the stored pulldown-cmark events and replaces three kinds of nodes
//! before handing the stream to `push_html`:
//!
//! - fenced and indented code blocks → highlighted `div.highlight` blocks
//! - inline code → `span.highlight-inline`; `` `src_rust{let x = 1;}` ``
//!   declares a language for an inline span
//! - images whose target is a video → `<video controls>`

use crate::document::{MediaKind, media_kind};
use crate::highlight::{CodeParams, HighlightError, Highlighter};
use maud::html;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd, html::push_html};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Highlight(#[from] HighlightError),
}

/// Split `src_<lang>{<code>}` into language and code.
fn inline_source(code: &str) -> (Option<&str>, &str) {
    code.strip_prefix("src_")
        .and_then(|rest| rest.strip_suffix('}'))
        .and_then(|rest| rest.split_once('{'))
        .filter(|(lang, _)| !lang.is_empty() && !lang.contains(char::is_whitespace))
        .map(|(lang, body)| (Some(lang), body))
        .unwrap_or((None, code))
}

/// Render a content tree to an HTML fragment.
pub fn render_content(tree: &[Event<'static>], highlighter: &Highlighter) -> Result<String, RenderError> {
    let mut events: Vec<Event<'static>> = Vec::with_capacity(tree.len());
    let mut iter = tree.iter();

    while let Some(event) = iter.next() {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) => &**info,
                    CodeBlockKind::Indented => "",
                };
                let mut source = String::new();
                for inner in iter.by_ref() {
                    match inner {
                        Event::End(TagEnd::CodeBlock) => break,
                        Event::Text(text) => source.push_str(text),
                        _ => {}
                    }
                }
                let block = highlighter.highlight_block(&source, &CodeParams::from_info(info))?;
                events.push(Event::Html(CowStr::from(block.into_string())));
            }
            Event::Code(code) => {
                let (lang, body) = inline_source(code);
                let span = highlighter.highlight_inline(body, lang)?;
                events.push(Event::InlineHtml(CowStr::from(span.into_string())));
            }
            Event::Start(Tag::Image { dest_url, title, .. })
                if media_kind(dest_url) == Some(MediaKind::Video) =>
            {
                // Alt text has no place in <video>; drop it with the end tag.
                let mut depth = 1;
                for inner in iter.by_ref() {
                    match inner {
                        Event::Start(Tag::Image { .. }) => depth += 1,
                        Event::End(TagEnd::Image) => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                let title = (!title.is_empty()).then_some(&**title);
                let video = html! {
                    video controls src=(&**dest_url) title=[title] {}
                };
                events.push(Event::InlineHtml(CowStr::from(video.into_string())));
            }
            other => events.push(other.clone()),
        }
    }

    let mut html = String::with_capacity(tree.len() * 16);
    push_html(&mut html, events.into_iter());
    Ok(html)
}
