//! Case-insensitive file-extension allow-list.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::Path;

/// Extensions shown by default: stills first, then the video containers.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".avi", ".wmv", ".mpg", ".mpeg", ".mp4", ".mov",
];

/// Set of extensions (stored lowercase, with the leading dot).
///
/// An empty filter matches every file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter {
    exts: BTreeSet<String>,
}

impl ExtensionFilter {
    /// Build a filter from extensions such as `".JPG"` or `"mp4"`.
    ///
    /// Blank entries are ignored; a missing leading dot is added.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let exts = extensions
            .into_iter()
            .filter_map(|ext| normalize(ext.as_ref()))
            .collect();
        Self { exts }
    }

    /// Filter that lets every file through.
    pub fn any() -> Self {
        Self::default()
    }

    /// The stock photo/video filter.
    pub fn media() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }

    pub fn is_empty(&self) -> bool {
        self.exts.is_empty()
    }

    /// Extensions in sorted order, lowercase with leading dot.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.exts.iter().map(String::as_str)
    }

    /// Whether `path` passes the filter.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        if self.exts.is_empty() {
            return true;
        }
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| self.exts.contains(&format!(".{}", ext.to_lowercase())))
    }
}

fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if bare.is_empty() {
        return None;
    }
    Some(format!(".{}", bare.to_lowercase()))
}
