//! Ordered, reversible traversal over the media files beneath a set of roots.
//!
//! The virtual sequence is: for each root in order, the directory's own files
//! (sorted), then each subdirectory (sorted) recursively, depth-first. The
//! cursor never materialises that sequence. It keeps one [`DirectoryFrame`]
//! per level on an explicit stack and lists directories only when a step
//! crosses into them.
//!
//! ```text
//! stack: [ roots{idx} ][ subdirs of root{idx} ] ...   frame: [ siblings{idx} ]
//!                                                      files: files of frame[idx]
//! ```

use std::mem;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::filter::ExtensionFilter;
use crate::listing::{DirectorySource, FsSource, sort_key};

/// One directory level: sorted sibling directories and the one being visited.
#[derive(Debug, Clone, Default)]
struct DirectoryFrame {
    dirs: Vec<PathBuf>,
    index: usize,
}

impl DirectoryFrame {
    fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs, index: 0 }
    }

    fn current(&self) -> Option<&Path> {
        self.dirs.get(self.index).map(PathBuf::as_path)
    }

    fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    fn last_index(&self) -> usize {
        self.dirs.len().saturating_sub(1)
    }
}

/// Live traversal state while the cursor sits on a file.
#[derive(Debug, Clone)]
struct Walk {
    /// Ancestors of `frame`, root frame at the bottom.
    stack: Vec<DirectoryFrame>,
    frame: DirectoryFrame,
    /// Qualifying files of `frame.current()`.
    files: Vec<PathBuf>,
    index: usize,
}

impl Walk {
    fn at(frame: DirectoryFrame) -> Self {
        Self {
            stack: Vec::new(),
            frame,
            files: Vec::new(),
            index: 0,
        }
    }

    fn current(&self) -> Option<&Path> {
        self.files.get(self.index).map(PathBuf::as_path)
    }
}

#[derive(Debug, Clone, Default)]
enum CursorState {
    #[default]
    BeforeStart,
    AfterEnd,
    Positioned(Walk),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stride {
    File,
    Folder,
}

/// Bidirectional cursor over the qualifying files beneath a set of roots.
///
/// Steps report whether they landed on a file; reaching either end of the
/// sequence, an empty tree, or an empty root list are all plain `false`.
/// Unreadable directories are treated as empty and never abort a step.
#[derive(Debug)]
pub struct TreeCursor<S = FsSource> {
    source: S,
    roots: Vec<PathBuf>,
    filter: ExtensionFilter,
    reverse_from_start: bool,
    state: CursorState,
}

impl TreeCursor<FsSource> {
    /// Cursor over the real filesystem.
    pub fn new<I, P>(roots: I, filter: ExtensionFilter) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self::with_source(FsSource, roots, filter)
    }
}

impl<S: DirectorySource> TreeCursor<S> {
    pub fn with_source<I, P>(source: S, roots: I, filter: ExtensionFilter) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            source,
            roots: normalize_roots(roots),
            filter,
            reverse_from_start: false,
            state: CursorState::BeforeStart,
        }
    }

    /// Let `step_backward(true)` from before the start land on the last file.
    ///
    /// Off by default: stepping backward from before the start reports `false`
    /// whatever `wrap` says.
    #[must_use]
    pub fn reverse_from_start(mut self, enabled: bool) -> Self {
        self.reverse_from_start = enabled;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn extension_filter(&self) -> &ExtensionFilter {
        &self.filter
    }

    /// Replace the root directories and rewind to before the start.
    pub fn set_roots<I, P>(&mut self, roots: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.roots = normalize_roots(roots);
        self.reset();
    }

    /// Replace the extension filter and rewind to before the start.
    pub fn set_extension_filter(&mut self, filter: ExtensionFilter) {
        self.filter = filter;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.state = CursorState::BeforeStart;
    }

    /// Path under the cursor, `None` before the start or after the end.
    pub fn current(&self) -> Option<&Path> {
        match &self.state {
            CursorState::Positioned(walk) => walk.current(),
            _ => None,
        }
    }

    pub fn is_before_start(&self) -> bool {
        matches!(self.state, CursorState::BeforeStart)
    }

    pub fn is_after_end(&self) -> bool {
        matches!(self.state, CursorState::AfterEnd)
    }

    /// Move to the next file.
    ///
    /// From before the start this finds the first file. At the end it either
    /// stops after the end (`wrap == false`) or starts over. Returns `false`
    /// without wrapping forever when the tree holds no qualifying files.
    pub fn step_forward(&mut self, wrap: bool) -> bool {
        self.advance(Stride::File, wrap)
    }

    /// Move to the previous file; the mirror image of [`step_forward`](Self::step_forward).
    pub fn step_backward(&mut self, wrap: bool) -> bool {
        self.retreat(Stride::File, wrap)
    }

    /// Skip the rest of the current directory and land on the first file of
    /// the next (or previous) directory that has any.
    ///
    /// Forward, the current directory's subdirectories are skipped along with
    /// its remaining files.
    pub fn step_folder(&mut self, forward: bool) -> bool {
        if forward {
            self.advance(Stride::Folder, false)
        } else {
            self.retreat(Stride::Folder, false)
        }
    }

    /// Position the cursor exactly on `path`.
    ///
    /// Only the directories along `path` are listed. Returns `false` and
    /// leaves the cursor untouched when `path` is not part of the sequence.
    pub fn seek_to_path(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return false;
        }
        let target = component_keys(path);
        for (idx, root) in self.roots.iter().enumerate() {
            if depth_below(&component_keys(root), &target).is_none() {
                continue;
            }
            let mut frame = DirectoryFrame::new(self.roots.clone());
            frame.index = idx;
            if let Some(walk) = self.descend_to(frame, Vec::new(), path, &target) {
                debug!(path = %path.display(), depth = walk.stack.len(), "cursor: seek hit");
                self.state = CursorState::Positioned(walk);
                return true;
            }
        }
        debug!(path = %path.display(), "cursor: seek miss");
        false
    }

    fn advance(&mut self, stride: Stride, wrap: bool) -> bool {
        if self.roots.is_empty() {
            return false;
        }
        // A folder stride leaves the current directory's subtree behind too.
        let mut skip_subtree = false;
        let (mut walk, mut fresh, mut load) = match mem::take(&mut self.state) {
            CursorState::Positioned(mut walk) => {
                match stride {
                    Stride::File => walk.index += 1,
                    Stride::Folder => {
                        walk.index = walk.files.len();
                        skip_subtree = true;
                    }
                }
                (walk, false, false)
            }
            CursorState::AfterEnd if !wrap => {
                self.state = CursorState::AfterEnd;
                return false;
            }
            CursorState::AfterEnd | CursorState::BeforeStart => (self.first_frames(), true, true),
        };

        loop {
            if load {
                walk.files = self.files_of(&walk.frame);
                walk.index = 0;
                load = false;
            }
            if walk.index < walk.files.len() {
                self.state = CursorState::Positioned(walk);
                return true;
            }
            let moved = if mem::take(&mut skip_subtree) {
                next_sibling(&mut walk)
            } else {
                self.next_frame(&mut walk)
            };
            if moved {
                load = true;
                continue;
            }
            if fresh {
                trace!("cursor: no qualifying files under roots");
                self.state = CursorState::BeforeStart;
                return false;
            }
            if !wrap {
                trace!("cursor: reached end");
                self.state = CursorState::AfterEnd;
                return false;
            }
            debug!("cursor: wrapping to first file");
            walk = self.first_frames();
            fresh = true;
            load = true;
        }
    }

    fn retreat(&mut self, stride: Stride, wrap: bool) -> bool {
        if self.roots.is_empty() {
            return false;
        }
        let (mut walk, mut pos, mut fresh, mut load) = match mem::take(&mut self.state) {
            CursorState::Positioned(walk) => {
                let pos = match stride {
                    Stride::File => walk.index.checked_sub(1),
                    Stride::Folder => None,
                };
                (walk, pos, false, false)
            }
            CursorState::BeforeStart if !(wrap && self.reverse_from_start) => return false,
            CursorState::BeforeStart | CursorState::AfterEnd => {
                (self.last_frames(), None, true, true)
            }
        };

        loop {
            if load {
                walk.files = self.files_of(&walk.frame);
                pos = match stride {
                    Stride::File => walk.files.len().checked_sub(1),
                    Stride::Folder => (!walk.files.is_empty()).then_some(0),
                };
                load = false;
            }
            if let Some(index) = pos.filter(|i| *i < walk.files.len()) {
                walk.index = index;
                self.state = CursorState::Positioned(walk);
                return true;
            }
            if self.prev_frame(&mut walk) {
                load = true;
                continue;
            }
            if fresh || !wrap {
                trace!("cursor: reached beginning");
                self.state = CursorState::BeforeStart;
                return false;
            }
            debug!("cursor: wrapping to last file");
            walk = self.last_frames();
            fresh = true;
            load = true;
        }
    }

    /// Walk positioned on the first root, files not yet loaded.
    fn first_frames(&self) -> Walk {
        Walk::at(DirectoryFrame::new(self.roots.clone()))
    }

    /// Walk positioned on the deepest last directory of the last root.
    fn last_frames(&self) -> Walk {
        let mut frame = DirectoryFrame::new(self.roots.clone());
        frame.index = frame.last_index();
        let mut walk = Walk::at(frame);
        self.descend_last(&mut walk);
        walk
    }

    /// Forward order: children of the current directory, else its next
    /// sibling, else the next sibling of the nearest ancestor that has one.
    fn next_frame(&self, walk: &mut Walk) -> bool {
        let sub = self.subframe_of(&walk.frame);
        if !sub.is_empty() {
            let parent = mem::replace(&mut walk.frame, sub);
            walk.stack.push(parent);
            return true;
        }
        next_sibling(walk)
    }

    /// Reverse order: the deepest last descendant of the previous sibling,
    /// else the parent directory, whose own files precede its children.
    fn prev_frame(&self, walk: &mut Walk) -> bool {
        if walk.frame.index == 0 {
            return match walk.stack.pop() {
                Some(parent) => {
                    walk.frame = parent;
                    true
                }
                None => false,
            };
        }
        walk.frame.index -= 1;
        self.descend_last(walk);
        true
    }

    fn descend_last(&self, walk: &mut Walk) {
        loop {
            let mut sub = self.subframe_of(&walk.frame);
            if sub.is_empty() {
                break;
            }
            sub.index = sub.last_index();
            let parent = mem::replace(&mut walk.frame, sub);
            walk.stack.push(parent);
        }
    }

    /// Rebuild the frame chain leading to `path` the way forward steps would.
    ///
    /// Folder names match case-insensitively, so several siblings may lead
    /// toward `path`; the exact spelling is tried first, then the others.
    fn descend_to(
        &self,
        frame: DirectoryFrame,
        stack: Vec<DirectoryFrame>,
        path: &Path,
        target: &[String],
    ) -> Option<Walk> {
        let dir = component_keys(frame.current()?);
        if depth_below(&dir, target)? == 1 {
            let files = self.files_of(&frame);
            let index = find_sorted(&files, path)?;
            return Some(Walk {
                stack,
                frame,
                files,
                index,
            });
        }

        let sub = self.subframe_of(&frame);
        let mut candidates: Vec<usize> = sub
            .dirs
            .iter()
            .enumerate()
            .filter(|(_, d)| depth_below(&component_keys(d), target).is_some())
            .map(|(i, _)| i)
            .collect();
        candidates.sort_by_key(|&i| !path.starts_with(&sub.dirs[i]));

        candidates.into_iter().find_map(|index| {
            let mut child = sub.clone();
            child.index = index;
            let mut stack = stack.clone();
            stack.push(frame.clone());
            self.descend_to(child, stack, path, target)
        })
    }

    fn subframe_of(&self, frame: &DirectoryFrame) -> DirectoryFrame {
        match frame.current() {
            Some(dir) => DirectoryFrame::new(self.source.subdirectories(dir)),
            None => DirectoryFrame::default(),
        }
    }

    fn files_of(&self, frame: &DirectoryFrame) -> Vec<PathBuf> {
        match frame.current() {
            Some(dir) => self.source.files(dir, &self.filter),
            None => Vec::new(),
        }
    }
}

/// Next sibling of the current directory, else of the nearest ancestor that has one.
fn next_sibling(walk: &mut Walk) -> bool {
    walk.frame.index += 1;
    if walk.frame.index < walk.frame.dirs.len() {
        return true;
    }
    while let Some(mut parent) = walk.stack.pop() {
        parent.index += 1;
        if parent.index < parent.dirs.len() {
            walk.frame = parent;
            return true;
        }
    }
    false
}

fn normalize_roots<I, P>(roots: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    roots
        .into_iter()
        .filter(|r| !r.as_ref().as_os_str().is_empty())
        // Re-collecting the components drops trailing separators.
        .map(|r| r.as_ref().components().collect())
        .collect()
}

fn component_keys(path: &Path) -> Vec<String> {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().to_lowercase())
        .collect()
}

/// How many components `path` sits below `dir`, if `dir` is a proper ancestor.
fn depth_below(dir: &[String], path: &[String]) -> Option<usize> {
    (path.len() > dir.len() && path.starts_with(dir)).then(|| path.len() - dir.len())
}

/// Binary search in a list sorted by [`sort_key`]. An exact match wins; a
/// case-insensitive match is accepted only when it is unambiguous.
fn find_sorted(files: &[PathBuf], path: &Path) -> Option<usize> {
    let key = sort_key(path);
    let start = files.partition_point(|f| sort_key(f) < key);
    let run = files[start..]
        .iter()
        .take_while(|f| sort_key(f) == key)
        .count();
    let candidates = &files[start..start + run];
    candidates
        .iter()
        .position(|f| f == path)
        .or_else(|| (candidates.len() == 1).then_some(0))
        .map(|i| start + i)
}
