//! Directory listing primitives used by the traversal cursor.
//!
//! Both listings return paths already pruned (hidden/system entries removed)
//! and sorted with [`sort_paths`]. A listing that fails for any reason comes
//! back empty: the cursor treats an unreadable directory as an empty one.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::filter::ExtensionFilter;

/// Source of directory listings for [`TreeCursor`](crate::cursor::TreeCursor).
pub trait DirectorySource {
    /// Immediate visible subdirectories of `dir`, sorted.
    fn subdirectories(&self, dir: &Path) -> Vec<PathBuf>;

    /// Immediate visible files of `dir` accepted by `filter`, sorted.
    fn files(&self, dir: &Path, filter: &ExtensionFilter) -> Vec<PathBuf>;
}

/// Lists the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl DirectorySource for FsSource {
    fn subdirectories(&self, dir: &Path) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = list_visible(dir)
            .into_iter()
            .filter(|e| e.file_type().is_dir())
            .map(DirEntry::into_path)
            .collect();
        sort_paths(&mut dirs);
        dirs
    }

    fn files(&self, dir: &Path, filter: &ExtensionFilter) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = list_visible(dir)
            .into_iter()
            .filter(is_file_like)
            .map(DirEntry::into_path)
            .filter(|p| filter.matches(p))
            .collect();
        sort_paths(&mut files);
        files
    }
}

/// Ordering key: the full path, lowercased, compared ordinally.
#[must_use]
pub fn sort_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// Sort `paths` in traversal order.
pub fn sort_paths(paths: &mut [PathBuf]) {
    paths.sort_by_cached_key(|p| sort_key(p));
}

fn list_visible(dir: &Path) -> Vec<DirEntry> {
    let mut out = Vec::new();
    // Links are not followed so a symlinked directory can never form a cycle.
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(false) {
        match entry {
            Ok(entry) => {
                if !is_hidden(&entry) {
                    out.push(entry);
                }
            }
            Err(err) => {
                debug!(dir = %dir.display(), error = %err, "listing: entry unreadable; skipping");
            }
        }
    }
    out
}

/// Regular files, plus symlinks that resolve to a regular file.
fn is_file_like(entry: &DirEntry) -> bool {
    let ft = entry.file_type();
    if ft.is_file() {
        return true;
    }
    ft.is_symlink() && fs::metadata(entry.path()).is_ok_and(|m| m.is_file())
}

fn is_hidden(entry: &DirEntry) -> bool {
    let dotted = entry
        .file_name()
        .to_str()
        .is_some_and(|n| n.starts_with('.'));
    dotted || has_hidden_attributes(entry)
}

#[cfg(windows)]
fn has_hidden_attributes(entry: &DirEntry) -> bool {
    use std::os::windows::fs::MetadataExt;

    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;
    entry.metadata().is_ok_and(|m| {
        m.file_attributes() & (FILE_ATTRIBUTE_HIDDEN | FILE_ATTRIBUTE_SYSTEM) != 0
    })
}

#[cfg(not(windows))]
fn has_hidden_attributes(_entry: &DirEntry) -> bool {
    false
}
