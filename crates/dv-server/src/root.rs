//! Content root and request path parsing.
//!
//! Every filesystem access made on behalf of a request goes through
//! [`ContentRoot::resolve`], which refuses paths that leave the root.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Separator between an archive path and a member inside it.
pub(crate) const ARCHIVE_DELIMITER: &str = ":/";

/// Canonicalized directory all requests are served from.
#[derive(Clone, Debug)]
pub(crate) struct ContentRoot {
    base: PathBuf,
}

impl ContentRoot {
    /// Canonicalize `path` and use it as the root.
    pub(crate) fn new(path: &Path) -> io::Result<Self> {
        Ok(Self {
            base: path.canonicalize()?,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.base
    }

    /// Join a request path onto the root.
    ///
    /// Returns `None` if the path does not exist, contains `..` or a root
    /// component, or resolves (through symlinks) outside the root. The
    /// returned path keeps the requested file name, so classification sees
    /// what the user asked for rather than a symlink target.
    pub(crate) fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let mut joined = self.base.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(segment) => joined.push(segment),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        let canonical = joined.canonicalize().ok()?;
        canonical.starts_with(&self.base).then_some(joined)
    }
}

/// A request path split at the first [`ARCHIVE_DELIMITER`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RequestPath<'a> {
    /// Filesystem part, relative to the content root.
    pub(crate) path: &'a str,
    /// Member path inside an archive, if the delimiter was present.
    pub(crate) inner: Option<&'a str>,
}

impl<'a> RequestPath<'a> {
    pub(crate) fn parse(raw: &'a str) -> Self {
        let raw = raw.trim_start_matches('/');
        match raw.split_once(ARCHIVE_DELIMITER) {
            Some((path, inner)) => Self {
                path,
                inner: Some(inner),
            },
            None => Self {
                path: raw,
                inner: None,
            },
        }
    }
}
