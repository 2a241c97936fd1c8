//! Build orchestration.
//!
//! One strictly sequential pass over the site:
//!
//! ```text
//! list documents → index tags → compile styles → render posts
//!   → render home → copy static → render tag pages → materialize media
//! ```
//!
//! | Phase            | On failure                                  |
//! |------------------|---------------------------------------------|
//! | list documents   | fatal (unreadable posts dir, duplicate slug)|
//! | compile styles   | fatal                                       |
//! | render posts     | page reported and skipped                   |
//! | render home      | fatal                                       |
//! | copy static      | fatal                                       |
//! | render tag pages | page reported and skipped                   |
//! | materialize media| fatal only when a directory can't be created|
//!
//! There is no rollback: a fatal error leaves whatever was already written.

use crate::assets::{AssetError, copy_static, materialize_media};
use crate::compose::{ComposeError, Composer};
use crate::config::{SiteConfig, SitePaths};
use crate::document::{ListError, list_documents};
use crate::highlight::{HighlightError, Highlighter};
use crate::output::{BuildEvent, BuildSummary, PageKind, Phase, Reporter};
use crate::styles::{StyleError, compile_styles};
use crate::tags::TagIndex;
use crate::types::{Document, is_safe_file_stem};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("listing documents failed: {0}")]
    List(#[from] ListError),
    #[error("compiling styles failed: {0}")]
    Styles(#[from] StyleError),
    #[error("setting up highlighting failed: {0}")]
    Highlight(#[from] HighlightError),
    #[error("rendering home page failed: {0}")]
    Home(#[source] ComposeError),
    #[error("writing {path} failed: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("copying static assets failed: {0}")]
    Static(#[source] AssetError),
    #[error("materializing media failed: {0}")]
    Media(#[source] AssetError),
}

fn write_page(path: &Path, html: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)
}

/// Record a best-effort page outcome.
fn record_page(
    reporter: &mut Reporter,
    kind: PageKind,
    path: PathBuf,
    result: Result<String, ComposeError>,
) {
    let outcome = result
        .map_err(|e| e.to_string())
        .and_then(|html| write_page(&path, &html).map_err(|e| e.to_string()));
    match outcome {
        Ok(()) => reporter.record(BuildEvent::PageWritten { kind, path }),
        Err(reason) => reporter.record(BuildEvent::PageFailed { kind, path, reason }),
    }
}

fn list_phase(posts: &Path, reporter: &mut Reporter) -> Result<Vec<Document>, BuildError> {
    reporter.record(BuildEvent::PhaseStarted(Phase::ListDocuments));
    let documents = list_documents(posts, reporter)?;
    reporter.record(BuildEvent::DocumentsListed {
        count: documents.len(),
    });
    Ok(documents)
}

fn index_phase<'a>(documents: &'a [Document], reporter: &mut Reporter) -> TagIndex<'a> {
    reporter.record(BuildEvent::PhaseStarted(Phase::IndexTags));
    let tags = TagIndex::build(documents);
    reporter.record(BuildEvent::TagsIndexed { count: tags.len() });
    tags
}

fn styles_phase(styles: &Path, reporter: &mut Reporter) -> Result<String, BuildError> {
    reporter.record(BuildEvent::PhaseStarted(Phase::CompileStyles));
    let css = compile_styles(styles)?;
    reporter.record(BuildEvent::StylesCompiled { bytes: css.len() });
    Ok(css)
}

/// Run everything up to rendering without writing: highlight theme,
/// documents, tags, styles.
pub fn check_site(
    paths: &SitePaths,
    config: &SiteConfig,
    reporter: &mut Reporter,
) -> Result<BuildSummary, BuildError> {
    Highlighter::new(&config.highlight.theme)?;
    let documents = list_phase(&paths.posts, reporter)?;
    index_phase(&documents, reporter);
    styles_phase(&paths.styles, reporter)?;
    Ok(BuildSummary::from_events(reporter.events()))
}

/// Run a full build. Returns the tallies of everything the reporter saw.
pub fn build_site(
    paths: &SitePaths,
    config: &SiteConfig,
    reporter: &mut Reporter,
) -> Result<BuildSummary, BuildError> {
    let highlighter = Highlighter::new(&config.highlight.theme)?;
    let documents = list_phase(&paths.posts, reporter)?;
    let tags = index_phase(&documents, reporter);
    let css = styles_phase(&paths.styles, reporter)?;

    let composer = Composer::new(&paths.templates, &config.site.title, css, tags.tags());

    reporter.record(BuildEvent::PhaseStarted(Phase::RenderPosts));
    for doc in &documents {
        let path = paths.output.join("posts").join(format!("{}.html", doc.slug));
        let result = composer.render_post(doc, &highlighter);
        record_page(reporter, PageKind::Post, path, result);
    }

    reporter.record(BuildEvent::PhaseStarted(Phase::RenderHome));
    let home = composer.render_home(&documents).map_err(BuildError::Home)?;
    let home_path = paths.output.join("index.html");
    write_page(&home_path, &home).map_err(|source| BuildError::Write {
        path: home_path.clone(),
        source,
    })?;
    reporter.record(BuildEvent::PageWritten {
        kind: PageKind::Home,
        path: home_path,
    });

    reporter.record(BuildEvent::PhaseStarted(Phase::CopyStatic));
    let files = copy_static(&paths.static_dir, &paths.output).map_err(BuildError::Static)?;
    reporter.record(BuildEvent::StaticCopied { files });

    reporter.record(BuildEvent::PhaseStarted(Phase::RenderTags));
    let tags_dir = paths.output.join("tags");
    for (tag, posts) in tags.iter() {
        if !is_safe_file_stem(tag) {
            reporter.record(BuildEvent::PageFailed {
                kind: PageKind::Tag,
                path: tags_dir.clone(),
                reason: format!("tag '{tag}' is not a plain file name"),
            });
            continue;
        }
        let path = tags_dir.join(format!("{tag}.html"));
        let result = composer.render_tag(tag, posts);
        record_page(reporter, PageKind::Tag, path, result);
    }

    reporter.record(BuildEvent::PhaseStarted(Phase::MaterializeMedia));
    materialize_media(&paths.posts, &paths.medias(), reporter).map_err(BuildError::Media)?;

    Ok(BuildSummary::from_events(reporter.events()))
}
