//! Shared test utilities for the inkpost test suite.
//!
//! Provides an isolated copy of the fixture site plus the facts tests assert
//! against it.
//!
//! # Fixture Site
//!
//! ```text
//! fixtures/site/
//! ├── site.toml
//! ├── posts/
//! │   ├── hello-world.md      # 2024-03-09, tags "go, web", hero
//! │   ├── go-notes.md         # 2023-11-05, tag "go", HERO none
//! │   ├── someday.md          # malformed DATE, no tags
//! │   ├── broken.md           # no SLUG: skipped
//! │   ├── images/cover.{jpg,png}
//! │   ├── clips/demo.mp4
//! │   └── attachments/notes.txt
//! ├── styles/main.scss        # imports partials/
//! ├── templates/
//! └── static/
//! ```
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let config = SiteConfig::default();
//! build_site(&config.resolve(tmp.path()), &config, &mut Reporter::quiet()).unwrap();
//! assert!(read_output(tmp.path(), "posts/hello-world.html").contains("Hello"));
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Documents that parse successfully, newest first.
pub const FIXTURE_SLUGS: &[&str] = &["hello-world", "go-notes", "someday"];
pub const FIXTURE_DOCUMENTS: usize = FIXTURE_SLUGS.len();
/// Tags in first-seen order.
pub const FIXTURE_TAGS: &[&str] = &["go", "web"];
/// Media paths relative to the posts root.
pub const FIXTURE_MEDIA: &[&str] = &["clips/demo.mp4", "images/cover.jpg", "images/cover.png"];

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Output lookups
// =========================================================================

/// Read a file from `<root>/build/`.
pub fn read_output(root: &Path, rel: &str) -> String {
    let path = root.join("build").join(rel);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

/// Byte offsets of each needle in `haystack`; panics if one is missing.
pub fn positions(haystack: &str, needles: &[&str]) -> Vec<usize> {
    needles
        .iter()
        .map(|n| {
            haystack
                .find(n)
                .unwrap_or_else(|| panic!("{n:?} not found in output"))
        })
        .collect()
}
