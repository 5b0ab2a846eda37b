use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, ensure};
use config_model::Settings;
use serde::Deserialize;

use crate::error::Error;
use crate::filter::{DEFAULT_EXTENSIONS, ExtensionFilter};

/// Fades shorter than this are shown as a hard cut.
pub const MIN_FADE: Duration = Duration::from_millis(250);

const SETTINGS_DIR_NAME: &str = "slide-disc";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Folders to show when no saved selection exists.
    pub roots: Vec<PathBuf>,
    /// File extensions to include (leading dot optional, any case).
    pub extensions: Vec<String>,
    /// Time a still remains on screen before auto-advancing.
    #[serde(with = "humantime_serde")]
    pub advance_time: Duration,
    /// Auto-advance delay after a manual next/previous.
    #[serde(with = "humantime_serde")]
    pub delay_advance_time: Duration,
    /// Cross-fade duration between slides.
    #[serde(with = "humantime_serde")]
    pub fade_time: Duration,
    /// Videos at least this long are cut short when `truncate-video` is set.
    #[serde(with = "humantime_serde")]
    pub long_video_threshold: Duration,
    /// Play time granted to a truncated video.
    #[serde(with = "humantime_serde")]
    pub long_video_limit: Duration,
    pub truncate_video: bool,
    /// Auto-advance starts over after the last file.
    pub wrap: bool,
    /// Stepping backward from before the first file jumps to the last one.
    pub reverse_from_start: bool,
    /// Directory holding the settings and bookmark files.
    pub settings_dir: Option<PathBuf>,
    /// How often the bookmark is written while the show runs.
    #[serde(with = "humantime_serde")]
    pub bookmark_interval: Duration,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml_str(&s)?)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            self.extensions.iter().all(|e| !e.trim().is_empty()),
            "extensions must not contain blank entries"
        );
        ensure!(
            !self.advance_time.is_zero(),
            "advance-time must be greater than zero"
        );
        ensure!(
            self.delay_advance_time >= self.advance_time,
            "delay-advance-time must be at least advance-time"
        );
        ensure!(
            !self.long_video_limit.is_zero(),
            "long-video-limit must be greater than zero"
        );
        ensure!(
            !self.bookmark_interval.is_zero(),
            "bookmark-interval must be greater than zero"
        );
        if let Some(dir) = &self.settings_dir {
            ensure!(
                !dir.as_os_str().is_empty(),
                "settings-dir must not be empty"
            );
        }
        Ok(self)
    }

    pub fn extension_filter(&self) -> ExtensionFilter {
        ExtensionFilter::new(&self.extensions)
    }

    /// Configured settings directory, else the per-user data directory.
    pub fn resolved_settings_dir(&self) -> Result<PathBuf, Error> {
        if let Some(dir) = &self.settings_dir {
            return Ok(dir.clone());
        }
        dirs::data_local_dir()
            .map(|d| d.join(SETTINGS_DIR_NAME))
            .ok_or(Error::NoSettingsDir)
    }

    /// Overlay timings the user saved last session.
    pub fn with_saved(mut self, saved: &Settings) -> Self {
        if let Some(advance) = saved.advance_time().filter(|d| !d.is_zero()) {
            self.advance_time = advance;
            self.delay_advance_time = self.delay_advance_time.max(advance);
        }
        if let Some(fade) = saved.fade_time() {
            self.fade_time = fade;
        }
        self
    }

    /// `None` when the fade is too short to animate.
    pub fn effective_fade(&self) -> Option<Duration> {
        (self.fade_time >= MIN_FADE).then_some(self.fade_time)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            advance_time: Duration::from_millis(3000),
            delay_advance_time: Duration::from_millis(15000),
            fade_time: Duration::from_millis(750),
            long_video_threshold: Duration::from_secs(40),
            long_video_limit: Duration::from_secs(30),
            truncate_video: true,
            wrap: true,
            reverse_from_start: false,
            settings_dir: None,
            bookmark_interval: Duration::from_secs(60),
        }
    }
}
