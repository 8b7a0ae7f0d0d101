/// Image URL handling
///
/// This module handles:
/// - Splitting the comma-separated photo cell into URLs
/// - Rewriting Google Drive share links into direct thumbnail URLs
///
/// The rewrite is best-effort: anything that does not look like a known
/// Drive link is returned unchanged so plain image URLs keep working.
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Path-embedded ids and the classic query forms
    static ref DRIVE_LINK: Regex = Regex::new(
        r"https?://drive\.google\.com/(?:file/d/|open\?id=|uc\?id=|thumbnail\?id=)([a-zA-Z0-9_-]+)"
    )
    .expect("valid Drive link pattern");

    /// Any other Drive URL carrying an `id=` query parameter
    static ref DRIVE_QUERY_ID: Regex =
        Regex::new(r"https?://drive\.google\.com/[^?#]*\?(?:[^#]*&)?id=([a-zA-Z0-9_-]+)")
            .expect("valid Drive query pattern");
}

/// Extract the Drive file id from a share link
pub fn drive_file_id(url: &str) -> Option<&str> {
    DRIVE_LINK
        .captures(url)
        .or_else(|| DRIVE_QUERY_ID.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Direct-fetch URL for `url`, requesting a thumbnail `size` pixels wide
pub fn resolve_image_url(url: &str, size: u32) -> String {
    match drive_file_id(url) {
        Some(id) => format!("https://lh3.googleusercontent.com/d/{}=w{}", id, size),
        None => url.to_string(),
    }
}

/// Split a photo cell on commas, trimming and dropping empty entries
pub fn split_photo_urls(cell: &str) -> Vec<String> {
    cell.split(',').map(str::trim).filter(|u| !u.is_empty()).map(str::to_string).collect()
}
