//! Fault-tolerant directory walker
//!
//! Enumeration happens in two phases: first every reachable directory below
//! the root, then the matching files of each directory on its own. A
//! directory that can not be read contributes no files, while its siblings
//! are still enumerated.

use std::collections::BTreeSet;
use std::io;
use std::iter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::report::Reporter;

/// Longest path the platform accepts
#[cfg(windows)]
pub const MAX_PATH_LEN: usize = 260;
#[cfg(not(windows))]
pub const MAX_PATH_LEN: usize = 4096;

/// Walks a directory tree for music files with the given extensions
pub struct DirectoryWalker<'a> {
    extensions: &'a BTreeSet<String>,
    reporter: &'a dyn Reporter,
    max_path_len: usize,
}

impl<'a> DirectoryWalker<'a> {
    /// Create a walker that reports skipped long paths to `reporter`
    pub fn new(extensions: &'a BTreeSet<String>, reporter: &'a dyn Reporter) -> Self {
        Self {
            extensions,
            reporter,
            max_path_len: MAX_PATH_LEN,
        }
    }

    /// Override the path length limit
    pub fn with_max_path_len(mut self, max_path_len: usize) -> Self {
        self.max_path_len = max_path_len;
        self
    }

    /// Lazily enumerate all directories below `root`, excluding `root` itself
    ///
    /// Unreadable directories are skipped silently, overlong paths with a
    /// warning. Siblings are sorted by name so that one run is reproducible.
    pub fn enumerate_directories(&self, root: &Path) -> impl Iterator<Item = PathBuf> + 'a {
        let reporter = self.reporter;
        let max_path_len = self.max_path_len;
        let mut entries = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        iter::from_fn(move || loop {
            match entries.next()? {
                Ok(entry) => {
                    if !entry.file_type().is_dir() {
                        continue;
                    }
                    if entry.path().as_os_str().len() > max_path_len {
                        reporter.warn(&format!("Path too long: {}", entry.path().display()));
                        entries.skip_current_dir();
                        continue;
                    }
                    return Some(entry.into_path());
                }
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    skip_unreadable(reporter, &path, err.io_error().map(io::Error::kind));
                }
            }
        })
    }

    /// `root` followed by every directory below it
    pub fn accessible_directories(&self, root: &Path) -> impl Iterator<Item = PathBuf> + 'a {
        iter::once(root.to_path_buf()).chain(self.enumerate_directories(root))
    }

    /// Matching files directly inside `dir`, sorted by name
    ///
    /// Symlinked tracks are included. Returns nothing if the directory can
    /// not be read.
    pub fn enumerate_files(&self, dir: &Path) -> impl Iterator<Item = PathBuf> + 'a {
        if dir.as_os_str().len() > self.max_path_len {
            self.reporter
                .warn(&format!("Filename and path too long: {}", dir.display()));
            return Vec::new().into_iter();
        }

        let mut files = Vec::new();
        let entries = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();
        for entry in entries {
            match entry {
                Ok(entry) => {
                    // Follows symlinks, unlike `entry.file_type()`
                    if entry.path().is_file() && self.has_music_extension(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(err) => {
                    let path = err.path().unwrap_or(dir).to_path_buf();
                    skip_unreadable(self.reporter, &path, err.io_error().map(io::Error::kind));
                }
            }
        }
        files.into_iter()
    }

    /// Count the matching files of all directories below and including `root`
    ///
    /// Skips are not reported, the streaming walk reports them.
    pub fn count_files(&self, root: &Path) -> u64 {
        let silent = DirectoryWalker {
            extensions: self.extensions,
            reporter: &SilentReporter,
            max_path_len: self.max_path_len,
        };
        silent
            .accessible_directories(root)
            .map(|dir| silent.enumerate_files(&dir).count() as u64)
            .sum()
    }

    /// Check if a path carries one of the configured extensions
    pub fn has_music_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }
}

struct SilentReporter;

impl Reporter for SilentReporter {
    fn write_line(&self, _text: &str) {}

    fn write_progress(&self, _current: u64, _total: u64) {}
}

fn skip_unreadable(reporter: &dyn Reporter, path: &Path, kind: Option<io::ErrorKind>) {
    match kind {
        Some(io::ErrorKind::PermissionDenied) => {
            log::debug!("Skipping inaccessible directory {}", path.display());
        }
        _ => {
            log::debug!("Skipping unreadable directory {} ({kind:?})", path.display());
            reporter.warn(&format!("Can not read directory: {}", path.display()));
        }
    }
}
