use crate::config::Configuration;
use crate::events::{ShowEvent, SlideshowCommand};
use crate::listing::DirectorySource;
use crate::settings::SettingsStore;
use crate::slideshow::{AT_BEGINNING, END_OF_COLLECTION, Navigation, Slide, Slideshow};
use anyhow::Result;
use config_model::Settings;
use std::future;
use std::time::Duration;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Timing knobs for the navigator, derived from [`Configuration`].
#[derive(Debug, Clone)]
pub struct NavigatorOptions {
    pub advance_time: Duration,
    pub delay_advance_time: Duration,
    /// `None` means slides cut instead of fading.
    pub fade: Option<Duration>,
    pub long_video_threshold: Duration,
    pub long_video_limit: Duration,
    pub truncate_video: bool,
    pub bookmark_interval: Duration,
}

impl From<&Configuration> for NavigatorOptions {
    fn from(cfg: &Configuration) -> Self {
        Self {
            advance_time: cfg.advance_time,
            delay_advance_time: cfg.delay_advance_time,
            fade: cfg.effective_fade(),
            long_video_threshold: cfg.long_video_threshold,
            long_video_limit: cfg.long_video_limit,
            truncate_video: cfg.truncate_video,
            bookmark_interval: cfg.bookmark_interval,
        }
    }
}

/// Auto-advance bookkeeping.
#[derive(Debug, Default)]
struct Pacing {
    deadline: Option<Instant>,
    paused: bool,
    /// Armed with the longer post-navigation delay.
    delayed: bool,
    /// Runtime copy of `truncate_video`.
    truncate: bool,
}

impl Pacing {
    fn arm(&mut self, after: Duration, delayed: bool) {
        self.deadline = Some(Instant::now() + after);
        self.delayed = delayed;
    }

    fn disarm(&mut self) {
        self.deadline = None;
        self.delayed = false;
    }
}

/// Drives the slideshow: auto-advance, navigation commands, bookmarking.
///
/// Rules:
/// - On start, open on the bookmark (if given and still present) and announce it.
/// - Stills advance after `advance-time`; a manual move stretches that to
///   `delay-advance-time`.
/// - Videos advance when the presentation layer reports the end, or after
///   `long-video-limit` when truncation applies.
/// - The bookmark is written every `bookmark-interval` and on shutdown,
///   together with the folder selection.
#[instrument(skip_all, fields(roots = show.roots().len()))]
pub async fn run<S>(
    mut show: Slideshow<S>,
    options: NavigatorOptions,
    bookmark: Option<std::path::PathBuf>,
    mut commands: Receiver<SlideshowCommand>,
    events: Sender<ShowEvent>,
    store: Option<SettingsStore>,
    cancel: CancellationToken,
) -> Result<()>
where
    S: DirectorySource,
{
    if let Some(path) = bookmark.as_deref() {
        show.resume_at(path);
    }
    show.start();

    let mut pacing = Pacing {
        truncate: options.truncate_video,
        ..Pacing::default()
    };
    announce(&show, &options, &events, &mut pacing, false).await;

    let mut bookmark_tick = interval_at(
        Instant::now() + options.bookmark_interval,
        options.bookmark_interval,
    );
    bookmark_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let deadline = pacing.deadline;
        select! {
            _ = cancel.cancelled() => {
                info!("cancel received; exiting navigator task");
                break;
            }

            Some(cmd) = commands.recv() => {
                debug!(?cmd, "command");
                handle_command(cmd, &mut show, &options, &events, &mut pacing).await;
            }

            _ = async {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => future::pending::<()>().await,
                }
            } => {
                pacing.disarm();
                debug!("auto-advance");
                match show.next() {
                    Navigation::Moved => announce(&show, &options, &events, &mut pacing, false).await,
                    _ => notice(&events, END_OF_COLLECTION).await,
                }
            }

            _ = bookmark_tick.tick() => {
                persist_bookmark(&show, store.as_ref());
            }
        }
    }

    persist_bookmark(&show, store.as_ref());
    if let Some(store) = store.as_ref() {
        let selection = Settings {
            paths: show
                .roots()
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            ..Settings::default()
        };
        if let Err(err) = store.save(selection) {
            warn!("failed to save settings: {err}");
        }
    }
    Ok(())
}

async fn handle_command<S: DirectorySource>(
    cmd: SlideshowCommand,
    show: &mut Slideshow<S>,
    options: &NavigatorOptions,
    events: &Sender<ShowEvent>,
    pacing: &mut Pacing,
) {
    let moved = match cmd {
        SlideshowCommand::Next => show.next(),
        SlideshowCommand::Prev => show.prev(),
        SlideshowCommand::NextFolder => show.next_folder(),
        SlideshowCommand::PrevFolder => show.prev_folder(),
        SlideshowCommand::SeekTo(path) => {
            if show.jump_to(&path) {
                Navigation::Moved
            } else {
                notice(events, "Not in collection.").await;
                return;
            }
        }
        SlideshowCommand::TogglePause => {
            if pacing.paused {
                pacing.paused = false;
                notice(events, "Play").await;
                if pacing.delayed {
                    // Resuming from a manual delay moves on right away.
                    match show.next() {
                        Navigation::Moved => announce(show, options, events, pacing, false).await,
                        _ => notice(events, END_OF_COLLECTION).await,
                    }
                } else {
                    pacing.arm(options.advance_time, false);
                }
            } else {
                pacing.paused = true;
                pacing.deadline = None;
                notice(events, "Pause").await;
            }
            return;
        }
        SlideshowCommand::ToggleTruncate => {
            pacing.truncate = !pacing.truncate;
            if !pacing.paused && matches!(show.active(), Some(Slide::Video(_))) {
                if pacing.truncate {
                    debug!("truncating the playing video");
                    pacing.arm(options.long_video_limit, false);
                } else {
                    debug!("letting the playing video run to its end");
                    pacing.disarm();
                }
            }
            let text = if pacing.truncate {
                "Truncate On"
            } else {
                "Truncate Off"
            };
            notice(events, text).await;
            return;
        }
        SlideshowCommand::MediaStarted { duration } => {
            if !pacing.paused && matches!(show.active(), Some(Slide::Video(_))) {
                if pacing.truncate && duration >= options.long_video_threshold {
                    debug!(secs = duration.as_secs(), "truncating long video");
                    pacing.arm(options.long_video_limit, false);
                } else {
                    pacing.disarm();
                }
            }
            return;
        }
        SlideshowCommand::MediaEnded => {
            if !pacing.paused && matches!(show.active(), Some(Slide::Video(_))) {
                pacing.arm(options.advance_time, false);
            }
            return;
        }
    };

    match moved {
        Navigation::Moved => announce(show, options, events, pacing, true).await,
        Navigation::AtBeginning => notice(events, AT_BEGINNING).await,
        Navigation::AtEnd => notice(events, END_OF_COLLECTION).await,
    }
}

/// Tell the presentation layer about the active slide and rearm the timer.
async fn announce<S: DirectorySource>(
    show: &Slideshow<S>,
    options: &NavigatorOptions,
    events: &Sender<ShowEvent>,
    pacing: &mut Pacing,
    manual: bool,
) {
    let Some(slide) = show.active().cloned() else {
        return;
    };
    match &slide {
        Slide::Still(path) | Slide::Video(path) => info!(path = %path.display(), "showing"),
        Slide::Placeholder(text) => info!(text = %text, "showing placeholder"),
    }

    if !pacing.paused {
        match &slide {
            Slide::Video(_) if pacing.truncate => {
                pacing.arm(options.long_video_limit, false);
            }
            Slide::Video(_) => pacing.disarm(),
            _ if manual => pacing.arm(options.delay_advance_time, true),
            _ => pacing.arm(options.advance_time, false),
        }
    }

    let _ = events
        .send(ShowEvent::SlideShown {
            slide,
            fade: options.fade,
        })
        .await;
}

async fn notice(events: &Sender<ShowEvent>, text: &str) {
    info!(text, "notice");
    let _ = events.send(ShowEvent::Notice(text.to_string())).await;
}

fn persist_bookmark<S: DirectorySource>(show: &Slideshow<S>, store: Option<&SettingsStore>) {
    let (Some(store), Some(path)) = (store, show.active_path()) else {
        return;
    };
    if let Err(err) = store.save_bookmark(path) {
        warn!(path = %path.display(), "failed to save bookmark: {err}");
    }
}
