//! Media library scanner.
//!
//! Walks a watched directory and yields the media files the ingestion
//! pipeline should look at. Scanning has no side effects and keeps no state
//! between calls, so a scan can be repeated at any time.

use std::path::{Path, PathBuf};

use cinedex_common::paths::{has_extension, is_partial_download};
use cinedex_common::DirectoryId;
use cinedex_db::models::Directory;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A file discovered by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    /// The watched directory the file was found under, if any.
    pub directory_id: Option<DirectoryId>,
}

impl MediaFile {
    pub fn new(path: PathBuf, directory_id: Option<DirectoryId>) -> Self {
        Self { path, directory_id }
    }
}

/// Scanner for discovering media files under watched directories.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    extensions: Vec<String>,
}

impl DirectoryScanner {
    /// Create a scanner accepting the given extensions (without dots).
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    /// Lazily list the media files of a watched directory.
    ///
    /// Files are yielded in file-name order within each directory. A root
    /// that does not exist yields nothing.
    pub fn scan<'a>(&'a self, directory: &Directory) -> impl Iterator<Item = MediaFile> + 'a {
        let directory_id = directory.id;
        self.walk(Path::new(&directory.path), directory.recursive, directory.depth)
            .map(move |path| MediaFile::new(path, Some(directory_id)))
    }

    /// Lazily list media files under an arbitrary root.
    pub fn walk<'a>(
        &'a self,
        root: &Path,
        recursive: bool,
        depth: Option<u32>,
    ) -> impl Iterator<Item = PathBuf> + 'a {
        if !root.is_dir() {
            warn!(path = %root.display(), "Scan root does not exist or is not a directory");
        }

        let mut walker = WalkDir::new(root)
            .follow_links(true)
            .min_depth(1)
            .sort_by_file_name();
        if let Some(max_depth) = max_walk_depth(recursive, depth) {
            walker = walker.max_depth(max_depth);
        }

        walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(move |path| self.accepts(path))
    }

    /// Whether a path is a media file this scanner yields.
    pub fn accepts(&self, path: &Path) -> bool {
        has_extension(path, &self.extensions) && !is_partial_download(path)
    }
}

/// Walk depth in walkdir terms, where the root's children are depth 1.
///
/// `depth` counts levels below the root, so depth 0 is the top level only.
fn max_walk_depth(recursive: bool, depth: Option<u32>) -> Option<usize> {
    match (recursive, depth) {
        (false, _) => Some(1),
        (true, Some(depth)) => Some(depth as usize + 1),
        (true, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scanner() -> DirectoryScanner {
        DirectoryScanner::new(vec!["mkv".to_string()])
    }

    /// Layout:
    /// ```text
    /// root/b.mkv, root/a.MKV, root/notes.txt, root/c.mkv.part
    /// root/one/d.mkv
    /// root/one/two/e.mkv
    /// ```
    fn library() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("one/two")).unwrap();
        for file in [
            "b.mkv",
            "a.MKV",
            "notes.txt",
            "c.mkv.part",
            "one/d.mkv",
            "one/two/e.mkv",
        ] {
            fs::write(root.join(file), b"x").unwrap();
        }
        dir
    }

    fn names(paths: impl Iterator<Item = PathBuf>) -> Vec<String> {
        paths
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    fn directory(path: &Path, recursive: bool, depth: Option<u32>) -> Directory {
        Directory {
            id: DirectoryId::new(),
            path: path.to_string_lossy().into_owned(),
            recursive,
            depth,
        }
    }

    #[test]
    fn test_non_recursive_lists_top_level_sorted() {
        let lib = library();
        let found = names(scanner().walk(lib.path(), false, Some(5)));
        assert_eq!(found, vec!["a.MKV", "b.mkv"]);
    }

    #[test]
    fn test_recursive_depth_zero_is_top_level() {
        let lib = library();
        let found = names(scanner().walk(lib.path(), true, Some(0)));
        assert_eq!(found, vec!["a.MKV", "b.mkv"]);
    }

    #[test]
    fn test_recursive_depth_bounds() {
        let lib = library();
        assert_eq!(
            names(scanner().walk(lib.path(), true, Some(1))),
            vec!["a.MKV", "b.mkv", "d.mkv"]
        );
        assert_eq!(
            names(scanner().walk(lib.path(), true, None)),
            vec!["a.MKV", "b.mkv", "d.mkv", "e.mkv"]
        );
    }

    #[test]
    fn test_scan_tags_directory_and_is_restartable() {
        let lib = library();
        let dir = directory(lib.path(), false, None);
        let scanner = scanner();

        let first: Vec<MediaFile> = scanner.scan(&dir).collect();
        let second: Vec<MediaFile> = scanner.scan(&dir).collect();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|f| f.directory_id == Some(dir.id)));
        assert!(first.iter().all(|f| f.path.starts_with(lib.path())));
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = directory(Path::new("/definitely/not/here"), true, None);
        assert_eq!(scanner().scan(&dir).count(), 0);
    }

    #[test]
    fn test_accepts_configured_extensions_only() {
        let scanner = DirectoryScanner::new(vec!["mkv".into(), "mp4".into()]);
        assert!(scanner.accepts(Path::new("/lib/Movie (2020).mp4")));
        assert!(!scanner.accepts(Path::new("/lib/Movie (2020).avi")));
        assert!(!scanner.accepts(Path::new("/lib/Movie (2020).mkv.crdownload")));
    }
}
