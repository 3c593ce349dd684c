//! Session-level errors.

use std::path::PathBuf;

use mirrorplay_shared::ConfigError;
use mirrorplay_vision::VisionError;

/// Errors surfaced while building or persisting a game session.
///
/// Gameplay itself never fails: a missing mask or a lost frame is absorbed
/// by the loop. Only persistence and startup can go wrong.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Reading or writing a profile file failed.
    #[error("profile file {path}: {source}")]
    ProfileIo {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A stored profile could not be parsed.
    #[error("malformed profile: {0}")]
    ProfileParse(#[from] toml::de::Error),

    /// A profile could not be serialized.
    #[error("profile encode failed: {0}")]
    ProfileEncode(#[from] toml::ser::Error),

    /// Game configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The segmentation worker could not be started or went away.
    #[error(transparent)]
    Vision(#[from] VisionError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
