//! Static assets and media materialization.
//!
//! Two jobs, both writing into the output tree:
//!
//! - **Static copy**: the static directory is copied verbatim into the
//!   output root. Structure and permissions are preserved; any I/O error is
//!   fatal.
//! - **Media**: every media file under the posts tree is hard-linked to
//!   `<output>/medias/<same relative path>`, matching the `/medias/` URLs the
//!   document parser wrote into the content.
//!
//! ## Media Walk
//!
//! Traversal and selection are separate predicates:
//!
//! - [`is_eligible_directory`]: descend into a directory unless it is hidden
//! - [`is_media_file`]: link a regular file whose extension is allow-listed
//!
//! A destination that already exists is never rewritten, so re-running is
//! cheap and leaves existing links untouched. Nothing checks for staleness:
//! changed content under the same path keeps the old output.

use crate::output::{BuildEvent, Reporter};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions (lowercase) materialized from the posts tree.
pub const MEDIA_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "mp4"];

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("cannot walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("cannot copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot set permissions on {path}: {source}")]
    Permissions {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn create_dir(path: &Path) -> Result<(), AssetError> {
    fs::create_dir_all(path).map_err(|source| AssetError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// Static copy
// ============================================================================

/// Copy the `src` tree into `dst`. Returns the number of files copied.
pub fn copy_static(src: &Path, dst: &Path) -> Result<usize, AssetError> {
    let mut files = 0;
    let mut dirs = Vec::new();

    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|source| AssetError::Walk {
            path: src.to_path_buf(),
            source,
        })?;
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            create_dir(&target)?;
            dirs.push((entry.into_path(), target));
        } else {
            fs::copy(entry.path(), &target).map_err(|source| AssetError::Copy {
                from: entry.path().to_path_buf(),
                to: target.clone(),
                source,
            })?;
            files += 1;
        }
    }

    // Deepest first, after contents are in place: a read-only source
    // directory must not block its own children from being written.
    for (from, to) in dirs.into_iter().rev() {
        let permissions = fs::metadata(&from)
            .map_err(|source| AssetError::Permissions {
                path: from.clone(),
                source,
            })?
            .permissions();
        fs::set_permissions(&to, permissions)
            .map_err(|source| AssetError::Permissions { path: to, source })?;
    }

    Ok(files)
}

// ============================================================================
// Media
// ============================================================================

/// Regular file with an allow-listed extension (case-insensitive).
pub fn is_media_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| MEDIA_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
}

/// Directory the media walk may descend into: anything not hidden.
pub fn is_eligible_directory(path: &Path) -> bool {
    path.is_dir()
        && !path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('.'))
            .unwrap_or(false)
}

/// `<posts>/a/b.png` → `<medias>/a/b.png`. `None` outside the posts root.
pub fn media_destination(source: &Path, posts_root: &Path, medias_root: &Path) -> Option<PathBuf> {
    let relative = source.strip_prefix(posts_root).ok()?;
    Some(medias_root.join(relative))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaStats {
    pub linked: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Hard-link every media file under `posts_root` into `medias_root`.
///
/// Only directory creation is fatal. Existing destinations are reported as
/// skips; a failed link or unreadable entry is reported and the walk goes on.
pub fn materialize_media(
    posts_root: &Path,
    medias_root: &Path,
    reporter: &mut Reporter,
) -> Result<MediaStats, AssetError> {
    create_dir(medias_root)?;
    let mut stats = MediaStats::default();

    let walker = WalkDir::new(posts_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || (is_eligible_directory(e.path()) && !e.path().starts_with(medias_root))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                reporter.record(BuildEvent::MediaFailed {
                    path: err.path().unwrap_or(posts_root).to_path_buf(),
                    reason: err.to_string(),
                });
                stats.failed += 1;
                continue;
            }
        };
        let source = entry.path();
        if !is_media_file(source) {
            continue;
        }
        let Some(dest) = media_destination(source, posts_root, medias_root) else {
            continue;
        };
        if let Some(parent) = dest.parent() {
            create_dir(parent)?;
        }

        if dest.exists() {
            reporter.record(BuildEvent::MediaSkipped { path: dest });
            stats.skipped += 1;
            continue;
        }
        match fs::hard_link(source, &dest) {
            Ok(()) => {
                reporter.record(BuildEvent::MediaLinked {
                    from: source.to_path_buf(),
                    to: dest,
                });
                stats.linked += 1;
            }
            Err(e) => {
                reporter.record(BuildEvent::MediaFailed {
                    path: source.to_path_buf(),
                    reason: e.to_string(),
                });
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    // =========================================================================
    // copy_static
    // =========================================================================

    #[test]
    fn copy_static_preserves_structure() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("static");
        let dst = tmp.path().join("build");
        touch(&src, "favicon.ico", "ico");
        touch(&src, "fonts/serif.woff2", "font");
        touch(&src, "js/vendor/lib.js", "js");

        let files = copy_static(&src, &dst).unwrap();

        assert_eq!(files, 3);
        assert_eq!(fs::read_to_string(dst.join("favicon.ico")).unwrap(), "ico");
        assert_eq!(fs::read_to_string(dst.join("fonts/serif.woff2")).unwrap(), "font");
        assert!(dst.join("js/vendor/lib.js").is_file());
    }

    #[test]
    fn copy_static_overwrites_previous_output() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("static");
        let dst = tmp.path().join("build");
        touch(&src, "robots.txt", "new");
        touch(&dst, "robots.txt", "old");

        copy_static(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(dst.join("robots.txt")).unwrap(), "new");
    }

    #[test]
    fn copy_static_missing_source_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = copy_static(&tmp.path().join("absent"), &tmp.path().join("build"));
        assert!(matches!(result, Err(AssetError::Walk { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn copy_static_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("static");
        let dst = tmp.path().join("build");
        touch(&src, "bin/run.sh", "#!/bin/sh");
        fs::set_permissions(src.join("bin/run.sh"), fs::Permissions::from_mode(0o755)).unwrap();
        fs::set_permissions(src.join("bin"), fs::Permissions::from_mode(0o750)).unwrap();

        copy_static(&src, &dst).unwrap();

        let file_mode = fs::metadata(dst.join("bin/run.sh")).unwrap().permissions().mode();
        let dir_mode = fs::metadata(dst.join("bin")).unwrap().permissions().mode();
        assert_eq!(file_mode & 0o777, 0o755);
        assert_eq!(dir_mode & 0o777, 0o750);
    }

    // =========================================================================
    // Predicates
    // =========================================================================

    #[test]
    fn media_file_predicate() {
        let tmp = TempDir::new().unwrap();
        for name in ["a.jpg", "b.JPEG", "c.png", "d.mp4", "e.txt", "f.gif", "noext"] {
            touch(tmp.path(), name, "");
        }
        let media = |name: &str| is_media_file(&tmp.path().join(name));

        assert!(media("a.jpg"));
        assert!(media("b.JPEG"));
        assert!(media("c.png"));
        assert!(media("d.mp4"));
        assert!(!media("e.txt"));
        assert!(!media("f.gif"));
        assert!(!media("noext"));
        assert!(!media("missing.png"));
    }

    #[test]
    fn directory_named_like_media_is_not_media() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("album.png")).unwrap();
        assert!(!is_media_file(&tmp.path().join("album.png")));
        assert!(is_eligible_directory(&tmp.path().join("album.png")));
    }

    #[test]
    fn hidden_directories_not_eligible() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(".git")).unwrap();
        fs::create_dir(tmp.path().join("images")).unwrap();
        touch(tmp.path(), "file.png", "");

        assert!(!is_eligible_directory(&tmp.path().join(".git")));
        assert!(is_eligible_directory(&tmp.path().join("images")));
        assert!(!is_eligible_directory(&tmp.path().join("file.png")));
    }

    #[test]
    fn destination_substitutes_root() {
        let dest = media_destination(
            Path::new("/site/posts/trip/a.jpg"),
            Path::new("/site/posts"),
            Path::new("/site/build/medias"),
        );
        assert_eq!(dest, Some(PathBuf::from("/site/build/medias/trip/a.jpg")));
        assert_eq!(
            media_destination(Path::new("/elsewhere/a.jpg"), Path::new("/site/posts"), Path::new("/m")),
            None
        );
    }

    // =========================================================================
    // materialize_media
    // =========================================================================

    fn media_tree() -> (TempDir, PathBuf, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("posts");
        let medias = tmp.path().join("build/medias");
        touch(&posts, "hello.md", "#+SLUG: hello");
        touch(&posts, "images/cover.jpg", "jpg");
        touch(&posts, "images/cover.png", "png");
        touch(&posts, "clips/demo.mp4", "mp4");
        touch(&posts, "notes.txt", "txt");
        touch(&posts, ".drafts/secret.png", "hidden");
        (tmp, posts, medias)
    }

    #[test]
    fn materialize_links_allowed_media_only() {
        let (_tmp, posts, medias) = media_tree();
        let mut reporter = Reporter::quiet();

        let stats = materialize_media(&posts, &medias, &mut reporter).unwrap();

        assert_eq!(stats, MediaStats { linked: 3, skipped: 0, failed: 0 });
        assert_eq!(fs::read_to_string(medias.join("images/cover.jpg")).unwrap(), "jpg");
        assert_eq!(fs::read_to_string(medias.join("images/cover.png")).unwrap(), "png");
        assert!(medias.join("clips/demo.mp4").is_file());
        assert!(!medias.join("notes.txt").exists());
        assert!(!medias.join("hello.md").exists());
        assert!(!medias.join(".drafts").exists());
    }

    #[test]
    fn materialize_reports_each_link() {
        let (_tmp, posts, medias) = media_tree();
        let mut reporter = Reporter::quiet();
        materialize_media(&posts, &medias, &mut reporter).unwrap();

        let linked: Vec<&PathBuf> = reporter
            .events()
            .iter()
            .filter_map(|e| match e {
                BuildEvent::MediaLinked { to, .. } => Some(to),
                _ => None,
            })
            .collect();
        assert_eq!(linked.len(), 3);
        assert!(linked.contains(&&medias.join("clips/demo.mp4")));
    }

    #[test]
    fn materialize_twice_skips_existing() {
        let (_tmp, posts, medias) = media_tree();
        materialize_media(&posts, &medias, &mut Reporter::quiet()).unwrap();

        let mut reporter = Reporter::quiet();
        let stats = materialize_media(&posts, &medias, &mut reporter).unwrap();

        assert_eq!(stats, MediaStats { linked: 0, skipped: 3, failed: 0 });
        assert!(reporter
            .events()
            .iter()
            .all(|e| matches!(e, BuildEvent::MediaSkipped { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn materialize_twice_keeps_inodes() {
        use std::os::unix::fs::MetadataExt;

        let (_tmp, posts, medias) = media_tree();
        materialize_media(&posts, &medias, &mut Reporter::quiet()).unwrap();
        let dest = medias.join("images/cover.jpg");
        let before = fs::metadata(&dest).unwrap();
        assert_eq!(before.ino(), fs::metadata(posts.join("images/cover.jpg")).unwrap().ino());

        materialize_media(&posts, &medias, &mut Reporter::quiet()).unwrap();
        let after = fs::metadata(&dest).unwrap();
        assert_eq!(before.ino(), after.ino());
        assert_eq!(before.mtime(), after.mtime());
    }

    #[test]
    fn stale_destination_is_kept() {
        let (_tmp, posts, medias) = media_tree();
        touch(&medias, "images/cover.jpg", "old");

        let stats = materialize_media(&posts, &medias, &mut Reporter::quiet()).unwrap();

        assert_eq!(stats.skipped, 1);
        assert_eq!(fs::read_to_string(medias.join("images/cover.jpg")).unwrap(), "old");
    }

    #[test]
    fn medias_root_inside_posts_is_not_walked() {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("posts");
        let medias = posts.join("out/medias");
        touch(&posts, "a.png", "png");

        materialize_media(&posts, &medias, &mut Reporter::quiet()).unwrap();
        let stats = materialize_media(&posts, &medias, &mut Reporter::quiet()).unwrap();

        assert_eq!(stats, MediaStats { linked: 0, skipped: 1, failed: 0 });
        assert!(!medias.join("out").exists());
    }
}
