//! Error types shared by every layer of the explorer core.

use std::io;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures surfaced to callers of the explorer core.
///
/// Per-entry metadata failures during a listing are never reported through
/// this type; they are folded into [`ItemStatus::Inaccessible`](crate::ItemStatus).
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("cannot navigate up from root path {path:?}")]
    CannotNavigateUp { path: String },

    #[error("the `{backend}` backend is unavailable")]
    BackendUnavailable { backend: &'static str },

    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("timed out during {operation} on {path:?}")]
    TimedOut {
        operation: &'static str,
        path: String,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("no thumbnail available for {path:?}")]
    NoThumbnail { path: String },

    #[error("file {path:?} exceeds the {limit} byte limit")]
    TooLarge { path: String, limit: u64 },

    #[error("quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),

    #[error("error while processing the image: {0}")]
    Image(#[from] image::ImageError),

    #[error("background image task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("unsupported platform {0:?}")]
    UnsupportedPlatform(String),

    #[error("unsupported backend {0:?}")]
    UnsupportedBackend(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_path(path: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason,
        }
    }

    /// Whether the error is caused by bad caller input rather than a backend failure.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPath { .. }
                | Self::CannotNavigateUp { .. }
                | Self::NoThumbnail { .. }
                | Self::InvalidQuality(_)
        )
    }
}
