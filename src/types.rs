//! Shared types read by every stage after listing.
//!
//! A [`Document`] is built once per source file by [`crate::document`] and is
//! immutable afterwards. Renderers only ever see documents through shared
//! references.

use chrono::{NaiveDate, NaiveTime};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use pulldown_cmark::Event;
use serde::Serialize;
use std::cmp::Ordering;
use std::path::{Component, Path, PathBuf};

/// Characters escaped in a URL path segment. Matches minijinja's
/// `urlencode` filter for plain names, so templates and Rust agree.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Parsed body of a document: the pulldown-cmark event stream with media
/// links already rewritten. Only [`crate::render`] looks inside.
pub type ContentTree = Vec<Event<'static>>;

/// A blog post.
///
/// Serializes to the fields templates may use (`title`, `slug`, `tags`,
/// `description`, `date`, `url`, `read_time`, `hero`). The content tree and
/// source path stay out of template context.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub title: String,
    pub slug: String,
    pub tags: Vec<String>,
    pub description: String,
    /// `None` when the DATE field is missing or malformed.
    pub date: Option<NaiveDate>,
    /// Seconds since the Unix epoch at midnight UTC of `date`.
    #[serde(skip)]
    pub timestamp: Option<i64>,
    #[serde(skip)]
    pub source: PathBuf,
    /// Site-relative URL of the rendered page: `/posts/<slug>.html`.
    pub url: String,
    #[serde(skip)]
    pub content: ContentTree,
    /// Estimated minutes to read.
    pub read_time: u8,
    /// Site-relative hero image path under `/medias/`.
    pub hero: Option<String>,
}

impl Document {
    /// Newest-first ordering. Undated documents sort after every dated one.
    pub fn cmp_newest_first(&self, other: &Self) -> Ordering {
        // `None < Some(_)`, so reversing the ascending order puts them last.
        other.timestamp.cmp(&self.timestamp)
    }
}

/// Unix timestamp for midnight UTC of a calendar date.
pub fn date_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Output URL path for a slug.
pub fn post_url(slug: &str) -> String {
    format!("/posts/{slug}.html")
}

/// Output URL path for a tag page. The tag is percent-encoded, so `c#`
/// links to `/tags/c%23.html`.
pub fn tag_url(tag: &str) -> String {
    format!("/tags/{}.html", utf8_percent_encode(tag, SEGMENT))
}

/// True when `name` can be used as-is as one file name under an output
/// directory: a single normal path component with no separators.
pub fn is_safe_file_stem(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(first)), None) if first == name
    )
}
