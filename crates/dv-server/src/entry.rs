//! Virtual path model.
//!
//! Directory listings show filesystem entries and archive members through one
//! interface, so the listing template does not care where an entry lives.

use std::io;
use std::path::Path;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Serialize;

use crate::root::ARCHIVE_DELIMITER;

/// Characters escaped in generated links. `/` and `:` are kept so that
/// nested paths and archive delimiters survive; the result is safe to place
/// in a double-quoted attribute without further escaping.
const PATH_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode a request path for use in an `href`.
pub(crate) fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ESCAPE).to_string()
}

/// Something that can appear in a listing.
pub(crate) trait VirtualPath {
    /// Absolute URL path of the entry.
    fn uri(&self) -> String;
    /// Display name.
    fn filename(&self) -> &str;
    fn is_dir(&self) -> bool;
}

/// Template-facing view of a listing entry.
#[derive(Debug, Serialize)]
pub(crate) struct EntryView {
    pub(crate) uri: String,
    pub(crate) filename: String,
    pub(crate) is_dir: bool,
}

impl EntryView {
    pub(crate) fn from_entry(entry: &impl VirtualPath) -> Self {
        Self {
            uri: entry.uri(),
            filename: entry.filename().to_owned(),
            is_dir: entry.is_dir(),
        }
    }
}

/// A file or directory under the content root.
#[derive(Debug)]
pub(crate) struct FsEntry {
    prefix: String,
    filename: String,
    is_dir: bool,
}

impl FsEntry {
    /// Entry for `path`, linked under the request path `prefix`.
    pub(crate) fn new(path: &Path, prefix: &str) -> Self {
        Self {
            prefix: prefix.trim_matches('/').to_owned(),
            filename: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            is_dir: path.is_dir(),
        }
    }
}

impl VirtualPath for FsEntry {
    fn uri(&self) -> String {
        if self.prefix.is_empty() {
            format!("/{}", encode_path(&self.filename))
        } else {
            format!("/{}/{}", encode_path(&self.prefix), encode_path(&self.filename))
        }
    }

    fn filename(&self) -> &str {
        &self.filename
    }

    fn is_dir(&self) -> bool {
        self.is_dir
    }
}

/// A member of an archive.
#[derive(Debug)]
pub(crate) struct ArchiveEntry {
    archive: String,
    member: String,
}

impl ArchiveEntry {
    pub(crate) fn new(archive: &str, member: &str) -> Self {
        Self {
            archive: archive.trim_matches('/').to_owned(),
            member: member.to_owned(),
        }
    }
}

impl VirtualPath for ArchiveEntry {
    fn uri(&self) -> String {
        format!(
            "/{}{ARCHIVE_DELIMITER}{}",
            encode_path(&self.archive),
            encode_path(&self.member)
        )
    }

    fn filename(&self) -> &str {
        &self.member
    }

    fn is_dir(&self) -> bool {
        false
    }
}

/// Immediate children of `dir`, sorted by file name.
pub(crate) fn list_directory(dir: &Path, prefix: &str) -> io::Result<Vec<FsEntry>> {
    let mut entries = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| FsEntry::new(&e.path(), prefix)))
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fs_entry_uri_at_root() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "").unwrap();

        let entry = FsEntry::new(&path, "");
        assert_eq!(entry.uri(), "/notes.md");
        assert_eq!(entry.filename(), "notes.md");
        assert!(!entry.is_dir());
    }

    #[test]
    fn test_fs_entry_uri_with_prefix_and_spaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("my notes.md");
        fs::write(&path, "").unwrap();

        let entry = FsEntry::new(&path, "docs/2024/");
        assert_eq!(entry.uri(), "/docs/2024/my%20notes.md");
    }

    #[test]
    fn test_fs_entry_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub");
        fs::create_dir(&path).unwrap();

        assert!(FsEntry::new(&path, "").is_dir());
    }

    #[test]
    fn test_archive_entry() {
        let entry = ArchiveEntry::new("lib/app.jar", "WEB-INF/web.xml");
        assert_eq!(entry.uri(), "/lib/app.jar:/WEB-INF/web.xml");
        assert_eq!(entry.filename(), "WEB-INF/web.xml");
        assert!(!entry.is_dir());
    }

    #[test]
    fn test_entry_view() {
        let view = EntryView::from_entry(&ArchiveEntry::new("a.jar", "x#1.txt"));
        assert_eq!(view.uri, "/a.jar:/x%231.txt");
        assert_eq!(view.filename, "x#1.txt");
        assert!(!view.is_dir);
    }

    #[test]
    fn test_list_directory_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join("a.md"), "").unwrap();
        fs::create_dir(dir.path().join("c")).unwrap();

        let names: Vec<_> = list_directory(dir.path(), "")
            .unwrap()
            .iter()
            .map(|e| e.filename().to_owned())
            .collect();
        assert_eq!(names, vec!["a.md", "b.txt", "c"]);
    }
}
