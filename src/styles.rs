//! Stylesheet compilation.
//!
//! `<styles root>/main.scss` and everything it imports compile to a single
//! expanded CSS string. The compiler only sees the styles tree: every path it
//! asks for is canonicalized to an absolute path under the styles root
//! (`..` never climbs above it) and read from `<styles root>/<resolved>`.
//!
//! Compilation is all-or-nothing. An unreadable import fails the build;
//! there is no partial stylesheet.
//!
//! A [`StyleSession`] is opened on a styles root and consumed by its single
//! [`StyleSession::compile`] call, so the compiler state it holds is dropped
//! on every exit path.

use grass::{Fs, Options, OutputStyle};
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Root stylesheet, relative to the styles directory.
pub const ENTRY: &str = "main.scss";

#[derive(Error, Debug)]
pub enum StyleError {
    #[error("styles directory not found: {0}")]
    MissingRoot(PathBuf),
    #[error("root stylesheet not found: {0}")]
    MissingEntry(PathBuf),
    #[error("SCSS compilation failed: {0}")]
    Compile(String),
}

/// Lexically canonicalize an import path to an absolute path under `/`.
///
/// `.` is dropped and `..` pops a component but never leaves the root.
pub fn canonicalize_import(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::ParentDir => {
                resolved.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    resolved
}

/// Filesystem view confined to one directory.
#[derive(Debug)]
struct RootedFs {
    root: PathBuf,
}

impl RootedFs {
    fn resolve(&self, path: &Path) -> PathBuf {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let absolute = canonicalize_import(relative);
        self.root
            .join(absolute.strip_prefix("/").unwrap_or(&absolute))
    }
}

impl Fs for RootedFs {
    fn is_dir(&self, path: &Path) -> bool {
        self.resolve(path).is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let resolved = self.resolve(path);
        std::fs::read(&resolved).map_err(|e| {
            io::Error::new(e.kind(), format!("cannot read {}: {e}", resolved.display()))
        })
    }
}

pub struct StyleSession {
    fs: RootedFs,
}

impl StyleSession {
    pub fn open(root: &Path) -> Result<Self, StyleError> {
        if !root.is_dir() {
            return Err(StyleError::MissingRoot(root.to_path_buf()));
        }
        Ok(Self {
            fs: RootedFs {
                root: root.to_path_buf(),
            },
        })
    }

    /// Compile `entry` (relative to the styles root) and close the session.
    pub fn compile(self, entry: &str) -> Result<String, StyleError> {
        let entry_path = self.fs.root.join(entry);
        if !self.fs.is_file(&entry_path) {
            return Err(StyleError::MissingEntry(entry_path));
        }
        let options = Options::default()
            .fs(&self.fs)
            .style(OutputStyle::Expanded);
        grass::from_path(&entry_path, &options).map_err(|e| StyleError::Compile(e.to_string()))
    }
}

/// Compile `<root>/main.scss` in a one-shot session.
pub fn compile_styles(root: &Path) -> Result<String, StyleError> {
    StyleSession::open(root)?.compile(ENTRY)
}
