//! File content as read from disk.

use std::borrow::Cow;
use std::io;
use std::path::Path;

/// File bytes, decoded as UTF-8 when possible.
#[derive(Debug)]
pub(crate) enum FileContent {
    Text(String),
    Binary(Vec<u8>),
}

impl FileContent {
    /// Read `path`, keeping the raw bytes when they are not valid UTF-8.
    pub(crate) fn read(path: &Path) -> io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => Self::Text(text),
            Err(err) => Self::Binary(err.into_bytes()),
        })
    }

    pub(crate) fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Content as text, replacing invalid sequences.
    pub(crate) fn text_lossy(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::Binary(bytes) => String::from_utf8_lossy(bytes),
        }
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.into_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }
}
