//! Path utilities for deciding which files the scanner should yield.

use std::path::Path;

/// Extensions scanned when configuration does not say otherwise.
pub const DEFAULT_EXTENSIONS: &[&str] = &["mkv"];

/// Suffixes left behind by download clients and partial copies.
const PARTIAL_SUFFIXES: &[&str] = &[".part", ".tmp", ".partial", ".!qb", ".crdownload"];

/// Check if a path has one of the given extensions (case-insensitive).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use cinedex_common::paths::has_extension;
///
/// assert!(has_extension(Path::new("/lib/Movie (2020).mkv"), &["mkv"]));
/// assert!(!has_extension(Path::new("/lib/Movie (2020).mp4"), &["mkv"]));
/// ```
pub fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.as_ref().eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Check if a file name looks like an in-progress download.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use cinedex_common::paths::is_partial_download;
///
/// assert!(is_partial_download(Path::new("movie.mkv.part")));
/// assert!(!is_partial_download(Path::new("movie.mkv")));
/// ```
pub fn is_partial_download(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    PARTIAL_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// File name of a path as an owned string, or empty if it has none.
pub fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
