//! Document parsing and listing.
//!
//! First stage of the build. Every `*.md` file directly inside the posts
//! directory becomes a [`Document`].
//!
//! ## Source Format
//!
//! A document is Markdown preceded by a keyword header:
//!
//! ```text
//! #+TITLE: Shipping a tiny blog engine
//! #+DESCRIPTION: Notes from a weekend project
//! #+DATE: 2024-03-09T10:30:00
//! #+SLUG: tiny-blog-engine
//! #+TAGS: rust, web
//! #+HERO: images/cover.jpg
//!
//! The body starts here. ![diagram](images/pipeline.png)
//! ```
//!
//! Keys are case-insensitive and values are trimmed. The header ends at the
//! first line that is neither blank nor `#+KEY: value`.
//!
//! ## Media Links
//!
//! Image and video link targets are rewritten under `/medias/` while parsing
//! (`images/cover.jpg` → `/medias/images/cover.jpg`). The media materializer
//! mirrors the posts tree into `<output>/medias/` with the same rule, so the
//! rendered HTML and the output tree agree on every media URL.
//!
//! Plain links are rewritten only when their target has one of the
//! materialized extensions ([`MEDIA_EXTENSIONS`]). Image targets are always
//! rewritten, so an embedded `.gif` or `.svg` points under `/medias/` but
//! nothing is linked there for it; keep such files in `static/` instead.

use crate::output::{BuildEvent, Reporter};
use crate::assets::MEDIA_EXTENSIONS;
use crate::types::{ContentTree, Document, date_timestamp, is_safe_file_stem, post_url};
use chrono::NaiveDate;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// URL prefix every media reference is rooted under.
pub const MEDIA_PREFIX: &str = "/medias/";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TAG_SEPARATOR: &str = ", ";
const WORDS_PER_MINUTE: usize = 200;
const NO_HERO: &str = "none";

const VIDEO_EXTENSIONS: &[&str] = &["mp4"];

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: missing SLUG")]
    MissingSlug { path: PathBuf },
    #[error("{path}: SLUG '{slug}' is not a plain file name")]
    InvalidSlug { path: PathBuf, slug: String },
}

impl ParseError {
    pub fn path(&self) -> &Path {
        match self {
            ParseError::Io { path, .. }
            | ParseError::MissingSlug { path }
            | ParseError::InvalidSlug { path, .. } => path,
        }
    }
}

/// Fatal errors while listing the posts directory.
#[derive(Error, Debug)]
pub enum ListError {
    #[error("cannot read posts directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("slug '{slug}' used by both {first} and {second}")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Classify a link target by its file extension.
pub fn media_kind(target: &str) -> Option<MediaKind> {
    // Ignore query strings and fragments
    let path = target.split(['?', '#']).next().unwrap_or_default();
    let ext = Path::new(path)
        .extension()?
        .to_string_lossy()
        .to_ascii_lowercase();
    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else if MEDIA_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else {
        None
    }
}

/// Root a relative media path under [`MEDIA_PREFIX`].
///
/// - `images/a.png` → `/medias/images/a.png`
/// - `./a.png` → `/medias/a.png`
/// - `/a.png` → `/medias/a.png`
pub fn media_url(raw: &str) -> String {
    let mut rel = raw.trim();
    loop {
        if let Some(rest) = rel.strip_prefix("./") {
            rel = rest;
        } else if let Some(rest) = rel.strip_prefix('/') {
            rel = rest;
        } else {
            break;
        }
    }
    format!("{MEDIA_PREFIX}{rel}")
}

/// True for targets that point off-site (`https://…`, `data:…`, `//host/…`).
fn is_external(target: &str) -> bool {
    if target.starts_with("//") {
        return true;
    }
    match target.find(':') {
        Some(colon) => {
            let scheme = &target[..colon];
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// The rewritten target for a media link, or `None` to leave it alone.
fn rewrite_target(target: &str) -> Option<String> {
    if target.is_empty()
        || target.starts_with('#')
        || target.starts_with(MEDIA_PREFIX)
        || is_external(target)
    {
        return None;
    }
    Some(media_url(target))
}

fn rewrite_media_links(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => {
            let dest_url = rewrite_target(&dest_url)
                .map(CowStr::from)
                .unwrap_or(dest_url);
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            })
        }
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if media_kind(&dest_url).is_some() => {
            let dest_url = rewrite_target(&dest_url)
                .map(CowStr::from)
                .unwrap_or(dest_url);
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            })
        }
        other => other,
    }
}

/// Parse a Markdown body into an owned content tree with media links rewritten.
pub fn parse_content(body: &str) -> ContentTree {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES;
    Parser::new_ext(body, options)
        .map(rewrite_media_links)
        .map(Event::into_static)
        .collect()
}

/// Split the keyword header from the body.
///
/// Returns upper-cased keys mapped to trimmed values, and the body text.
/// A repeated key keeps its last value.
fn split_header(raw: &str) -> (HashMap<String, String>, &str) {
    let mut fields = HashMap::new();
    let mut offset = 0;
    for line in raw.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            offset += line.len();
            continue;
        }
        let Some((key, value)) = trimmed
            .strip_prefix("#+")
            .and_then(|rest| rest.split_once(':'))
        else {
            break;
        };
        fields.insert(key.trim().to_ascii_uppercase(), value.trim().to_string());
        offset += line.len();
    }
    (fields, &raw[offset..])
}

/// Parse the date portion of a DATE field; any time suffix after `T` is dropped.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.split('T').next().unwrap_or_default();
    NaiveDate::parse_from_str(date_part.trim(), DATE_FORMAT).ok()
}

fn parse_tags(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(TAG_SEPARATOR).map(str::to_string).collect()
}

/// The hero URL, or `None` when the field is empty, `none`, or names the
/// media root itself once rooted.
fn parse_hero(raw: &str) -> Option<String> {
    let url = media_url(raw);
    let rel = &url[MEDIA_PREFIX.len()..];
    (!rel.is_empty() && rel != NO_HERO).then_some(url)
}

/// Minutes to read at [`WORDS_PER_MINUTE`], saturating at `u8::MAX`.
fn read_time(raw: &str) -> u8 {
    let words = raw.split_whitespace().count();
    u8::try_from(words / WORDS_PER_MINUTE).unwrap_or(u8::MAX)
}

/// Parse document source text. `path` is recorded as the document's source.
pub fn parse_source(raw: &str, path: &Path) -> Result<Document, ParseError> {
    let (fields, body) = split_header(raw);
    let field = |key: &str| fields.get(key).map(String::as_str).unwrap_or_default();

    let slug = field("SLUG").to_string();
    if slug.is_empty() {
        return Err(ParseError::MissingSlug {
            path: path.to_path_buf(),
        });
    }
    if !is_safe_file_stem(&slug) {
        return Err(ParseError::InvalidSlug {
            path: path.to_path_buf(),
            slug,
        });
    }

    let date = parse_date(field("DATE"));

    Ok(Document {
        title: field("TITLE").to_string(),
        url: post_url(&slug),
        slug,
        tags: parse_tags(field("TAGS")),
        description: field("DESCRIPTION").to_string(),
        date,
        timestamp: date.map(date_timestamp),
        source: path.to_path_buf(),
        content: parse_content(body),
        read_time: read_time(raw),
        hero: parse_hero(field("HERO")),
    })
}

/// Read and parse one document file.
pub fn parse_document(path: &Path) -> Result<Document, ParseError> {
    let raw = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_source(&raw, path)
}

fn is_document(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("md"))
            .unwrap_or(false)
}

/// Keep the `*.md` files from a directory listing, in name order.
/// Entries that cannot be read are reported against the directory.
fn document_paths(
    entries: impl Iterator<Item = std::io::Result<PathBuf>>,
    posts_dir: &Path,
    reporter: &mut Reporter,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if is_document(&path) => paths.push(path),
            Ok(_) => {}
            Err(err) => reporter.record(BuildEvent::DocumentSkipped {
                path: posts_dir.to_path_buf(),
                reason: format!("unreadable directory entry: {err}"),
            }),
        }
    }
    paths.sort();
    paths
}

/// List, parse, and sort every document in the posts directory.
///
/// Unparseable documents are reported and left out. The result is sorted
/// newest first; undated documents come last, and ties keep file-name order.
pub fn list_documents(posts_dir: &Path, reporter: &mut Reporter) -> Result<Vec<Document>, ListError> {
    let list_err = |source| ListError::Io {
        path: posts_dir.to_path_buf(),
        source,
    };
    let entries = fs::read_dir(posts_dir)
        .map_err(list_err)?
        .map(|entry| entry.map(|e| e.path()));
    let paths = document_paths(entries, posts_dir, reporter);

    let mut documents = Vec::with_capacity(paths.len());
    for path in &paths {
        match parse_document(path) {
            Ok(doc) => documents.push(doc),
            Err(err) => reporter.record(BuildEvent::DocumentSkipped {
                path: err.path().to_path_buf(),
                reason: err.to_string(),
            }),
        }
    }

    documents.sort_by(Document::cmp_newest_first);
    check_unique_slugs(&documents)?;
    Ok(documents)
}

fn check_unique_slugs(documents: &[Document]) -> Result<(), ListError> {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for doc in documents {
        if let Some(first) = seen.insert(&doc.slug, &doc.source) {
            return Err(ListError::DuplicateSlug {
                slug: doc.slug.clone(),
                first: first.to_path_buf(),
                second: doc.source.clone(),
            });
        }
    }
    Ok(())
}
