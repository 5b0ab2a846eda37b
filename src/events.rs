use std::path::PathBuf;
use std::time::Duration;

use crate::slideshow::Slide;

/// Requests from the presentation layer (keys, remote, signals).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideshowCommand {
    Next,
    Prev,
    NextFolder,
    PrevFolder,
    TogglePause,
    /// Flip whether long videos are cut short; applies to a video already playing.
    ToggleTruncate,
    /// Jump to a specific file, e.g. one picked in a browser.
    SeekTo(PathBuf),
    /// The active video started playing and reported its length.
    MediaStarted { duration: Duration },
    /// The active video played to its end.
    MediaEnded,
}

/// Emitted by the navigator whenever something on screen should change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowEvent {
    /// Bring `slide` on screen; `fade` is `None` for a hard cut.
    SlideShown { slide: Slide, fade: Option<Duration> },
    /// Short status text such as "Pause".
    Notice(String),
}
