//! Slide deck splitting.

/// Split rendered markdown into slides at horizontal rules.
///
/// Fragments that are empty or whitespace-only are dropped, so leading and
/// trailing rules do not produce blank slides.
pub fn split_slides(html: &str) -> Vec<String> {
    html.split("<hr />")
        .flat_map(|part| part.split("<hr>"))
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_owned)
        .collect()
}
