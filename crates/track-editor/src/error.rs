use std::path::PathBuf;
use track_editor_lib::TrackError;

/// Error types for the command-line tool
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Track(#[from] TrackError),

    #[error("{}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: TrackError,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
