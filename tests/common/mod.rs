#![allow(dead_code)]

use slide_disc::filter::ExtensionFilter;
use slide_disc::listing::{DirectorySource, sort_paths};
use slide_disc::TreeCursor;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Create files (and `dir/` entries) relative to `root`.
pub fn build_tree(root: &Path, entries: &[&str]) {
    for entry in entries {
        let path = root.join(entry.trim_end_matches('/'));
        if entry.ends_with('/') {
            fs::create_dir_all(&path).unwrap();
        } else {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, b"x").unwrap();
        }
    }
}

/// Paths relative to `root`, with `/` separators.
pub fn rel(root: &Path, paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect()
}

/// Every file from before the start to the end, without wrapping.
pub fn collect_forward<S: DirectorySource>(cursor: &mut TreeCursor<S>) -> Vec<PathBuf> {
    cursor.reset();
    let mut out = Vec::new();
    while cursor.step_forward(false) {
        out.push(cursor.current().unwrap().to_path_buf());
    }
    out
}

/// Every file from after the end back to the start, in the order visited.
pub fn collect_backward<S: DirectorySource>(cursor: &mut TreeCursor<S>) -> Vec<PathBuf> {
    cursor.reset();
    while cursor.step_forward(false) {}
    let mut out = Vec::new();
    while cursor.step_backward(false) {
        out.push(cursor.current().unwrap().to_path_buf());
    }
    out
}

/// Directory tree held in memory; directories marked failing list as empty.
#[derive(Debug, Default)]
pub struct MemSource {
    dirs: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    files: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    failing: BTreeSet<PathBuf>,
    /// Directories whose files were listed, in call order.
    pub file_listings: RefCell<Vec<PathBuf>>,
}

impl MemSource {
    /// Build from absolute file paths; a trailing `/` adds an empty directory.
    pub fn new(entries: &[&str]) -> Self {
        let mut source = Self::default();
        for entry in entries {
            let is_dir = entry.ends_with('/');
            let path = PathBuf::from(entry.trim_end_matches('/'));
            if is_dir {
                source.add_dir(&path);
            } else {
                let parent = path.parent().unwrap().to_path_buf();
                source.add_dir(&parent);
                source.files.entry(parent).or_default().insert(path);
            }
        }
        source
    }

    fn add_dir(&mut self, dir: &Path) {
        let mut child = dir.to_path_buf();
        while let Some(parent) = child.parent() {
            if parent.as_os_str().is_empty() {
                break;
            }
            self.dirs
                .entry(parent.to_path_buf())
                .or_default()
                .insert(child.clone());
            child = parent.to_path_buf();
        }
    }

    pub fn failing(mut self, dir: &str) -> Self {
        self.failing.insert(PathBuf::from(dir));
        self
    }
}

impl DirectorySource for MemSource {
    fn subdirectories(&self, dir: &Path) -> Vec<PathBuf> {
        if self.failing.contains(dir) {
            return Vec::new();
        }
        let mut out: Vec<PathBuf> = self
            .dirs
            .get(dir)
            .map(|d| d.iter().cloned().collect())
            .unwrap_or_default();
        sort_paths(&mut out);
        out
    }

    fn files(&self, dir: &Path, filter: &ExtensionFilter) -> Vec<PathBuf> {
        self.file_listings.borrow_mut().push(dir.to_path_buf());
        if self.failing.contains(dir) {
            return Vec::new();
        }
        let mut out: Vec<PathBuf> = self
            .files
            .get(dir)
            .map(|f| f.iter().filter(|p| filter.matches(p)).cloned().collect())
            .unwrap_or_default();
        sort_paths(&mut out);
        out
    }
}

pub fn mem_cursor(source: MemSource, roots: &[&str]) -> TreeCursor<MemSource> {
    TreeCursor::with_source(source, roots.iter().copied(), ExtensionFilter::new([".jpg"]))
}

pub fn strings(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect()
}
