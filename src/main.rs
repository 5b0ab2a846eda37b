use anyhow::{Context, Result};
use clap::Parser;
use humantime::format_duration;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use slide_disc::config::Configuration;
use slide_disc::events::{ShowEvent, SlideshowCommand};
use slide_disc::settings::{SettingsStore, resolve_roots};
use slide_disc::tasks::navigator::{self, NavigatorOptions};
use slide_disc::{Slide, Slideshow, TreeCursor};

#[derive(Debug, Parser)]
#[command(
    name = "slide-disc",
    version,
    about = "folder-by-folder photo and video slideshow"
)]
struct Args {
    /// Folder to show; replaces the saved folder selection
    #[arg(value_name = "ROOT")]
    root: Option<PathBuf>,
    /// Path to YAML config
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Directory holding settings.json and bookmark.txt
    #[arg(long = "settings-dir", value_name = "DIR")]
    settings_dir: Option<PathBuf>,
    /// Print the first N files in show order and exit
    #[arg(long, value_name = "N")]
    list: Option<usize>,
    /// Start from the first file instead of the bookmark
    #[arg(long = "no-resume")]
    no_resume: bool,
    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        root,
        config,
        settings_dir,
        list,
        no_resume,
        verbose,
    } = Args::parse();

    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();

    let mut cfg = match &config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Configuration::default(),
    };
    if settings_dir.is_some() {
        cfg.settings_dir = settings_dir;
    }
    let cfg = cfg.validated().context("invalid configuration values")?;

    let store = SettingsStore::new(
        cfg.resolved_settings_dir()
            .context("failed to determine settings directory")?,
    );
    let mut saved = store.load();
    let cfg = cfg.with_saved(&saved);
    tracing::info!(
        advance = %format_duration(cfg.advance_time),
        delay = %format_duration(cfg.delay_advance_time),
        fade = %format_duration(cfg.fade_time),
        settings = %store.dir().display(),
        "configuration loaded"
    );

    let roots = resolve_roots(root.as_deref(), &mut saved, &cfg.roots);
    if roots.is_empty() {
        tracing::warn!("no folders to show");
    }
    for root in &roots {
        tracing::info!(root = %root.display(), "showing folder");
    }

    let cursor =
        TreeCursor::new(&roots, cfg.extension_filter()).reverse_from_start(cfg.reverse_from_start);

    if let Some(count) = list {
        print_listing(cursor, count);
        return Ok(());
    }

    if root.is_some() {
        if let Err(err) = store.save(saved) {
            tracing::warn!("failed to save folder selection: {err}");
        }
    }

    let bookmark = if no_resume {
        None
    } else {
        store.load_bookmark()
    };
    let show = Slideshow::new(cursor, cfg.wrap);

    // Channels (small/bounded)
    let (command_tx, command_rx) = mpsc::channel::<SlideshowCommand>(16); // Signals -> Navigator
    let (event_tx, mut event_rx) = mpsc::channel::<ShowEvent>(16); // Navigator -> Presentation

    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    #[cfg(unix)]
    {
        forward_signal(
            SignalKind::user_defined1(),
            SlideshowCommand::TogglePause,
            command_tx.clone(),
            cancel.clone(),
        );
        forward_signal(
            SignalKind::user_defined2(),
            SlideshowCommand::NextFolder,
            command_tx.clone(),
            cancel.clone(),
        );
    }

    let mut tasks = JoinSet::new();

    // Navigator
    tasks.spawn({
        let options = NavigatorOptions::from(&cfg);
        let cancel = cancel.clone();
        async move {
            navigator::run(
                show,
                options,
                bookmark,
                command_rx,
                event_tx,
                Some(store),
                cancel,
            )
            .await
            .context("navigator task failed")
        }
    });

    // Presentation: this build has no display, so events go to the log.
    tasks.spawn({
        let cancel = cancel.clone();
        async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = event_rx.recv() => match event {
                        Some(ShowEvent::SlideShown { slide, fade }) => match slide {
                            Slide::Still(path) | Slide::Video(path) => {
                                println!("{}", path.display());
                                tracing::debug!(fade = ?fade, "slide shown");
                            }
                            Slide::Placeholder(text) => println!("[{text}]"),
                        },
                        Some(ShowEvent::Notice(text)) => println!("[{text}]"),
                        None => break,
                    },
                }
            }
            Ok(())
        }
    });
    drop(command_tx);

    // Drain JoinSet (wait for tasks to complete)
    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("task error: {e:?}"),
            Err(e) => tracing::error!("join error: {e}"),
        }
    }

    Ok(())
}

fn print_listing(mut cursor: TreeCursor, count: usize) {
    let mut shown = 0;
    while shown < count && cursor.step_forward(false) {
        if let Some(path) = cursor.current() {
            println!("{:>5}: {}", shown + 1, path.display());
        }
        shown += 1;
    }
    if shown == 0 {
        println!("(no media found)");
    }
}

#[cfg(unix)]
fn forward_signal(
    kind: SignalKind,
    command: SlideshowCommand,
    control: mpsc::Sender<SlideshowCommand>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        match signal(kind) {
            Ok(mut stream) => loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    received = stream.recv() => {
                        if received.is_none() {
                            break;
                        }
                        tracing::info!(?command, "signal received");
                        if let Err(err) = control.send(command.clone()).await {
                            tracing::warn!("failed to forward signal: {err}");
                            break;
                        }
                    }
                }
            },
            Err(err) => tracing::warn!("failed to register {kind:?} handler: {err}"),
        }
    });
}
