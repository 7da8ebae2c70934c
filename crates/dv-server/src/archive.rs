//! Read-only access to zip-based archives (`jar`, `war`, `ear`).
//!
//! Archives are opened per call and closed when the handle drops, on every
//! exit path.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use zip::ZipArchive;
use zip::result::ZipError;

/// Errors reading an archive or one of its members.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// File is not a readable zip archive.
    #[error("Cannot open archive {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: ZipError,
    },

    /// Member is missing or cannot be decompressed.
    #[error("Cannot read archive member {name}")]
    Member {
        name: String,
        #[source]
        source: ZipError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Whether a member name denotes a directory.
pub(crate) fn is_directory_member(name: &str) -> bool {
    name.ends_with('/')
}

fn open(path: &Path) -> Result<ZipArchive<File>, ArchiveError> {
    let file = File::open(path)?;
    ZipArchive::new(file).map_err(|source| ArchiveError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Names of all file members, sorted. Directory members are skipped.
pub(crate) fn list_members(path: &Path) -> Result<Vec<String>, ArchiveError> {
    let archive = open(path)?;
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| !is_directory_member(name))
        .map(str::to_owned)
        .collect();
    names.sort();
    Ok(names)
}

/// Decompressed bytes of one member.
pub(crate) fn read_member(path: &Path, name: &str) -> Result<Vec<u8>, ArchiveError> {
    let mut archive = open(path)?;
    let mut member = archive.by_name(name).map_err(|source| ArchiveError::Member {
        name: name.to_owned(),
        source,
    })?;
    let mut bytes = Vec::with_capacity(usize::try_from(member.size()).unwrap_or_default());
    member.read_to_end(&mut bytes)?;
    Ok(bytes)
}
