//! Build reporting.
//!
//! Every outcome of a build is a [`BuildEvent`]. The orchestrator never
//! prints; it hands events to a [`Reporter`] owned by the caller. The
//! reporter keeps them for inspection (tests assert on them) and, unless
//! quiet, echoes each one as a log line.
//!
//! # Output Format
//!
//! ```text
//! ==> Listing documents
//!     ! Skipped posts/draft.md: posts/draft.md: missing SLUG
//!     3 documents
//! ==> Compiling styles
//!     CSS compiled (2048 bytes)
//! ==> Rendering posts
//!     Wrote build/posts/hello-world.html
//! ...
//! ==> Materializing media
//!     Linked posts/images/cover.jpg → build/medias/images/cover.jpg
//!     Media build/medias/clip.mp4 already handled
//!
//! Built 3 posts, 2 tag pages, linked 4 media (1 skipped), 1 document skipped
//! ```
//!
//! Format functions are pure; [`Reporter::record`] is the only place that
//! writes to stdout.

use std::fmt;
use std::path::PathBuf;

/// Build phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    ListDocuments,
    IndexTags,
    CompileStyles,
    RenderPosts,
    RenderHome,
    CopyStatic,
    RenderTags,
    MaterializeMedia,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::ListDocuments => "Listing documents",
            Phase::IndexTags => "Indexing tags",
            Phase::CompileStyles => "Compiling styles",
            Phase::RenderPosts => "Rendering posts",
            Phase::RenderHome => "Rendering home page",
            Phase::CopyStatic => "Copying static assets",
            Phase::RenderTags => "Rendering tag pages",
            Phase::MaterializeMedia => "Materializing media",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Home,
    Post,
    Tag,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    PhaseStarted(Phase),
    DocumentsListed { count: usize },
    DocumentSkipped { path: PathBuf, reason: String },
    TagsIndexed { count: usize },
    StylesCompiled { bytes: usize },
    PageWritten { kind: PageKind, path: PathBuf },
    PageFailed { kind: PageKind, path: PathBuf, reason: String },
    StaticCopied { files: usize },
    MediaLinked { from: PathBuf, to: PathBuf },
    MediaSkipped { path: PathBuf },
    MediaFailed { path: PathBuf, reason: String },
}

/// Format one event as a log line.
pub fn format_event(event: &BuildEvent) -> String {
    match event {
        BuildEvent::PhaseStarted(phase) => format!("==> {phase}"),
        BuildEvent::DocumentsListed { count } => format!("    {count} documents"),
        BuildEvent::DocumentSkipped { path, reason } => {
            format!("    ! Skipped {}: {reason}", path.display())
        }
        BuildEvent::TagsIndexed { count } => format!("    {count} tags"),
        BuildEvent::StylesCompiled { bytes } => format!("    CSS compiled ({bytes} bytes)"),
        BuildEvent::PageWritten { path, .. } => format!("    Wrote {}", path.display()),
        BuildEvent::PageFailed { path, reason, .. } => {
            format!("    ! Failed {}: {reason}", path.display())
        }
        BuildEvent::StaticCopied { files } => format!("    Copied {files} static files"),
        BuildEvent::MediaLinked { from, to } => {
            format!("    Linked {} → {}", from.display(), to.display())
        }
        BuildEvent::MediaSkipped { path } => {
            format!("    Media {} already handled", path.display())
        }
        BuildEvent::MediaFailed { path, reason } => {
            format!("    ! Failed to handle media {}: {reason}", path.display())
        }
    }
}

/// Collects build events and optionally echoes them.
#[derive(Debug, Default)]
pub struct Reporter {
    events: Vec<BuildEvent>,
    echo: bool,
}

impl Reporter {
    /// A reporter that prints every event as it arrives.
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            echo: true,
        }
    }

    /// A reporter that only records.
    pub fn quiet() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: BuildEvent) {
        if self.echo {
            println!("{}", format_event(&event));
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[BuildEvent] {
        &self.events
    }
}

/// Per-build tallies, derived from the recorded events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildSummary {
    pub documents: usize,
    pub documents_skipped: usize,
    pub tags: usize,
    pub posts_written: usize,
    pub tag_pages_written: usize,
    pub pages_failed: usize,
    pub static_files: usize,
    pub media_linked: usize,
    pub media_skipped: usize,
    pub media_failed: usize,
}

impl BuildSummary {
    pub fn from_events(events: &[BuildEvent]) -> Self {
        let mut summary = Self::default();
        for event in events {
            match event {
                BuildEvent::DocumentsListed { count } => summary.documents = *count,
                BuildEvent::DocumentSkipped { .. } => summary.documents_skipped += 1,
                BuildEvent::TagsIndexed { count } => summary.tags = *count,
                BuildEvent::PageWritten {
                    kind: PageKind::Post,
                    ..
                } => summary.posts_written += 1,
                BuildEvent::PageWritten {
                    kind: PageKind::Tag,
                    ..
                } => summary.tag_pages_written += 1,
                BuildEvent::PageFailed { .. } => summary.pages_failed += 1,
                BuildEvent::StaticCopied { files } => summary.static_files = *files,
                BuildEvent::MediaLinked { .. } => summary.media_linked += 1,
                BuildEvent::MediaSkipped { .. } => summary.media_skipped += 1,
                BuildEvent::MediaFailed { .. } => summary.media_failed += 1,
                _ => {}
            }
        }
        summary
    }
}

/// One-line summary printed at the end of a build.
pub fn format_summary(summary: &BuildSummary) -> String {
    let mut line = format!(
        "Built {} posts, {} tag pages, linked {} media",
        summary.posts_written, summary.tag_pages_written, summary.media_linked
    );
    if summary.media_skipped > 0 {
        line.push_str(&format!(" ({} skipped)", summary.media_skipped));
    }
    let problems = [
        (summary.documents_skipped, "document skipped", "documents skipped"),
        (summary.pages_failed, "page failed", "pages failed"),
        (summary.media_failed, "media failed", "media failed"),
    ];
    for (count, one, many) in problems {
        match count {
            0 => {}
            1 => line.push_str(&format!(", 1 {one}")),
            n => line.push_str(&format!(", {n} {many}")),
        }
    }
    line
}

/// Summary printed by `check`, which builds nothing.
pub fn format_check_summary(summary: &BuildSummary) -> String {
    let mut line = format!(
        "Checked {} documents, {} tags, styles compile",
        summary.documents, summary.tags
    );
    match summary.documents_skipped {
        0 => {}
        1 => line.push_str(", 1 document skipped"),
        n => line.push_str(&format!(", {n} documents skipped")),
    }
    line
}
