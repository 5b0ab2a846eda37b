use thiserror::Error;

/// Library error type for slideshow operations.
///
/// Traversal itself never fails: listing errors are absorbed by the cursor.
/// These variants cover the configuration and persistence edges.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),

    /// Persisted settings could not be encoded or decoded.
    #[error(transparent)]
    Settings(#[from] serde_json::Error),

    /// No per-user data directory could be determined for settings.
    #[error("no settings directory available; pass --settings-dir")]
    NoSettingsDir,
}
