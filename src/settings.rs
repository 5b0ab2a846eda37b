//! Durable per-user state: the settings file and the last-viewed bookmark.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use config_model::Settings;
use tracing::{debug, info, warn};

use crate::error::Error;

const SETTINGS_FILE: &str = "settings.json";
const BOOKMARK_FILE: &str = "bookmark.txt";

/// Reads and writes settings and the bookmark under one directory.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    pub fn bookmark_path(&self) -> PathBuf {
        self.dir.join(BOOKMARK_FILE)
    }

    /// Saved settings, or blank settings when none can be read.
    pub fn load(&self) -> Settings {
        let path = self.settings_path();
        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Settings>(&raw) {
                Ok(settings) => match settings.validate() {
                    Ok(()) => settings,
                    Err(err) => {
                        warn!(path = %path.display(), "ignoring invalid settings: {err:#}");
                        Settings::default()
                    }
                },
                Err(err) => {
                    warn!(path = %path.display(), "ignoring unreadable settings: {err}");
                    Settings::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no saved settings");
                Settings::default()
            }
            Err(err) => {
                warn!(path = %path.display(), "failed to read settings: {err}");
                Settings::default()
            }
        }
    }

    /// Write `settings`, keeping previously saved values for unset fields.
    pub fn save(&self, mut settings: Settings) -> Result<Settings, Error> {
        settings.merge_missing_from(&self.load());
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(&settings)?;
        fs::write(self.settings_path(), json)?;
        info!(path = %self.settings_path().display(), "settings saved");
        Ok(settings)
    }

    /// Last bookmarked path, `None` when missing or blank.
    pub fn load_bookmark(&self) -> Option<PathBuf> {
        let path = self.bookmark_path();
        match fs::read_to_string(&path) {
            Ok(raw) => {
                let trimmed = raw.trim();
                (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                warn!(path = %path.display(), "failed to read bookmark: {err}");
                None
            }
        }
    }

    pub fn save_bookmark(&self, bookmark: &Path) -> Result<(), Error> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.bookmark_path(), bookmark.to_string_lossy().as_bytes())?;
        debug!(bookmark = %bookmark.display(), "bookmark saved");
        Ok(())
    }
}

/// Decide which folders to show.
///
/// A root given on the command line replaces the saved selection unless it
/// names the same folder the user last browsed from. Otherwise the saved
/// selection wins, then the configured roots, then the pictures folder.
pub fn resolve_roots(
    cli_root: Option<&Path>,
    saved: &mut Settings,
    configured: &[PathBuf],
) -> Vec<PathBuf> {
    if let Some(root) = cli_root {
        let root_str = root.to_string_lossy().into_owned();
        let same_root = saved
            .root_path
            .as_deref()
            .is_some_and(|r| r.to_lowercase() == root_str.to_lowercase());
        if !same_root {
            saved.paths = vec![root_str.clone()];
        }
        saved.root_path = Some(root_str);
    }

    let selected = saved.selected_paths();
    if !selected.is_empty() {
        return selected.into_iter().map(PathBuf::from).collect();
    }
    if !configured.is_empty() {
        return configured.to_vec();
    }
    dirs::picture_dir().into_iter().collect()
}
