//! Former/active/next slide rotation on top of [`TreeCursor`].
//!
//! The cursor always sits on the slide at the leading edge of the last move:
//! on `next` after a forward move, on `former` after a backward move. A change
//! of direction first walks the cursor back across the two slides already on
//! screen, so going back and forth undoes exactly one step at a time.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::cursor::TreeCursor;
use crate::listing::{DirectorySource, FsSource};

pub const NO_MEDIA_FOUND: &str = "No Photos or Videos found!";
pub const AT_BEGINNING: &str = "At beginning.";
pub const END_OF_COLLECTION: &str = "End of collection.";

const VIDEO_EXTENSIONS: &[&str] = &["avi", "wmv", "mpg", "mpeg", "mp4", "mov"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slide {
    Still(PathBuf),
    Video(PathBuf),
    /// Text shown instead of media.
    Placeholder(String),
}

impl Slide {
    /// Classify a media file by extension; unknown extensions are stills.
    pub fn from_path(path: PathBuf) -> Self {
        let is_video = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| {
                VIDEO_EXTENSIONS
                    .iter()
                    .any(|v| v.eq_ignore_ascii_case(ext))
            });
        if is_video {
            Self::Video(path)
        } else {
            Self::Still(path)
        }
    }

    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::Placeholder(text.into())
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Still(p) | Self::Video(p) => Some(p),
            Self::Placeholder(_) => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved,
    /// Nothing earlier to show; slides unchanged.
    AtBeginning,
    /// Nothing later to show; slides unchanged.
    AtEnd,
}

#[derive(Debug)]
pub struct Slideshow<S = FsSource> {
    cursor: TreeCursor<S>,
    wrap: bool,
    former: Option<Slide>,
    active: Option<Slide>,
    next: Option<Slide>,
    forward: bool,
}

impl<S: DirectorySource> Slideshow<S> {
    /// `wrap` decides whether the show starts over after the last file.
    pub fn new(cursor: TreeCursor<S>, wrap: bool) -> Self {
        Self {
            cursor,
            wrap,
            former: None,
            active: None,
            next: None,
            forward: true,
        }
    }

    pub fn cursor(&self) -> &TreeCursor<S> {
        &self.cursor
    }

    pub fn former(&self) -> Option<&Slide> {
        self.former.as_ref()
    }

    pub fn active(&self) -> Option<&Slide> {
        self.active.as_ref()
    }

    pub fn upcoming(&self) -> Option<&Slide> {
        self.next.as_ref()
    }

    /// Path of the slide on screen; this is what gets bookmarked.
    pub fn active_path(&self) -> Option<&Path> {
        self.active.as_ref().and_then(Slide::path)
    }

    pub fn roots(&self) -> &[PathBuf] {
        self.cursor.roots()
    }

    /// Switch folders; the show restarts from the first file.
    pub fn set_roots<I, P>(&mut self, roots: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.cursor.set_roots(roots);
        self.clear();
    }

    /// Arrange for the following [`start`](Self::start) to open on `bookmark`.
    ///
    /// Returns `false` (and leaves the show at the beginning) when the
    /// bookmark is no longer part of the collection.
    pub fn resume_at(&mut self, bookmark: &Path) -> bool {
        self.clear();
        self.cursor.reset();
        if !self.cursor.seek_to_path(bookmark) {
            info!(bookmark = %bookmark.display(), "bookmark not found; starting from the beginning");
            return false;
        }
        // Leave the cursor just before the bookmark.
        self.cursor.step_backward(false);
        true
    }

    /// Bring the first (or bookmarked) slide on screen and stage its
    /// neighbours on both sides.
    pub fn start(&mut self) {
        self.next();
        self.next();
        // After a resume the slide before the bookmark is not staged yet.
        if let Some(anchor) = self.active_path().map(Path::to_path_buf) {
            if self.cursor.seek_to_path(&anchor) {
                self.restage();
            }
        }
    }

    pub fn next(&mut self) -> Navigation {
        // The cursor cannot move past the end placeholder; keep the slots
        // in step with it.
        if self.active.is_some() && self.next.as_ref().is_some_and(Slide::is_placeholder) {
            return Navigation::AtEnd;
        }

        self.former = self.active.take();
        self.active = self.next.take();

        // Realign across the wrap point too: the slides on screen may straddle it.
        if !self.forward {
            self.cursor.step_forward(self.wrap);
            self.cursor.step_forward(self.wrap);
            self.forward = true;
        }

        self.next = Some(self.step_slide(true));
        Navigation::Moved
    }

    pub fn prev(&mut self) -> Navigation {
        if self.former.as_ref().is_none_or(Slide::is_placeholder) {
            return Navigation::AtBeginning;
        }

        self.next = self.active.take();
        self.active = self.former.take();

        if self.forward {
            self.cursor.step_backward(self.wrap);
            self.cursor.step_backward(self.wrap);
            self.forward = false;
        }

        self.former = Some(self.step_slide(false));
        Navigation::Moved
    }

    /// Put `path` on screen right away.
    ///
    /// Returns `false` and keeps the current slides when `path` is not part
    /// of the collection.
    pub fn jump_to(&mut self, path: &Path) -> bool {
        if !self.cursor.seek_to_path(path) {
            return false;
        }
        self.restage();
        true
    }

    /// Skip the rest of the active slide's folder.
    pub fn next_folder(&mut self) -> Navigation {
        self.jump_folder(true)
    }

    /// Go to the first slide of the folder before the active one.
    pub fn prev_folder(&mut self) -> Navigation {
        self.jump_folder(false)
    }

    fn jump_folder(&mut self, forward: bool) -> Navigation {
        let Some(anchor) = self.active_path().map(Path::to_path_buf) else {
            return if forward {
                self.next()
            } else {
                Navigation::AtBeginning
            };
        };
        if !self.cursor.seek_to_path(&anchor) {
            debug!(path = %anchor.display(), "active slide vanished; advancing normally");
            return if forward { self.next() } else { self.prev() };
        }
        let landed = self.cursor.step_folder(forward)
            || (forward && self.wrap && self.cursor.step_forward(true));
        if landed {
            self.restage();
            return Navigation::Moved;
        }

        // Nothing beyond this folder: put the cursor back where `next` expects it.
        self.cursor.seek_to_path(&anchor);
        self.next = Some(self.step_slide(true));
        self.forward = true;
        if forward {
            Navigation::AtEnd
        } else {
            Navigation::AtBeginning
        }
    }

    /// Rebuild all three slots around the file under the cursor.
    fn restage(&mut self) {
        let Some(anchor) = self.cursor.current().map(Path::to_path_buf) else {
            return;
        };
        self.former = Some(self.step_slide(false));
        self.cursor.seek_to_path(&anchor);
        self.active = Some(Slide::from_path(anchor));
        self.next = Some(self.step_slide(true));
        self.forward = true;
    }

    fn step_slide(&mut self, forward: bool) -> Slide {
        let moved = if forward {
            self.cursor.step_forward(self.wrap)
        } else {
            self.cursor.step_backward(false)
        };
        match self.cursor.current() {
            Some(path) if moved => Slide::from_path(path.to_path_buf()),
            _ if !forward => Slide::placeholder(AT_BEGINNING),
            _ if self.cursor.is_after_end() => Slide::placeholder(END_OF_COLLECTION),
            _ => Slide::placeholder(NO_MEDIA_FOUND),
        }
    }

    fn clear(&mut self) {
        self.former = None;
        self.active = None;
        self.next = None;
        self.forward = true;
    }
}
