//! File extension helpers.
//!
//! Extensions are always compared lowercase and without the leading dot.

use std::path::Path;

/// Extensions served verbatim unless another view is requested.
pub const STATIC_EXTENSIONS: &[&str] = &["html", "css", "js"];

/// Base file name of `path`, or an empty string for paths like `/` or `..`.
pub fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

/// Final dot-suffix of the base file name, lowercased.
///
/// Returns `None` when the name contains no dot or ends with one.
pub fn extension(path: &Path) -> Option<String> {
    let (_, ext) = file_name(path).rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Whether `path` has a static-passthrough extension.
pub fn is_static(path: &Path) -> bool {
    extension(path).is_some_and(|ext| STATIC_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether the extension of `path` is one of `extensions`.
pub fn has_extension(path: &Path, extensions: &[impl AsRef<str>]) -> bool {
    extension(path).is_some_and(|ext| extensions.iter().any(|e| e.as_ref() == ext))
}
