//! Storage backend abstraction for the explorer core.
//!
//! This module provides trait-based abstractions for backend operations,
//! allowing the services to work with the local filesystem and remote
//! backends (FTP, cloud drives) through a common interface.
//!
//! Every accessor is independently fallible: a permission error on one
//! property never prevents the others from being read.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncRead;

use crate::{
    error::{Error, Result},
    image_type::ImageType,
};

mod local;
mod remote;

pub use local::LocalFileSystem;
pub use remote::{RemoteFileSystem, RemoteKind};

/// A lazily read file body.
pub type FileStream = Box<dyn AsyncRead + Send + Unpin>;

/// Directory-side operations of a storage backend.
///
/// Paths are raw backend path strings; implementations return child paths in
/// the order the services should present them.
#[async_trait]
pub trait DirectoryProvider: Send + Sync {
    /// Full paths of the directories directly inside `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read (e.g., permission denied,
    /// path does not exist, not a directory).
    async fn subdirectory_paths(&self, path: &str) -> Result<Vec<String>>;

    /// Full paths of the non-directory entries directly inside `path`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`DirectoryProvider::subdirectory_paths`].
    async fn file_paths(&self, path: &str) -> Result<Vec<String>>;

    /// Display name of the directory, its last path component (`/` for the root).
    async fn directory_name(&self, path: &str) -> Result<String>;

    /// Last modification time, `None` when the backend does not record one.
    async fn last_write_time(&self, path: &str) -> Result<Option<DateTime<Utc>>>;

    /// Creation time, `None` when the backend does not record one.
    async fn creation_time(&self, path: &str) -> Result<Option<DateTime<Utc>>>;

    /// Whether `path` exists and is a directory.
    async fn exists(&self, path: &str) -> Result<bool>;
}

/// File-side operations of a storage backend.
#[async_trait]
pub trait FileProvider: Send + Sync {
    /// Display name of the file, including its extension.
    async fn file_name(&self, path: &str) -> Result<String>;

    /// Last modification time, `None` when the backend does not record one.
    async fn last_write_time(&self, path: &str) -> Result<Option<DateTime<Utc>>>;

    /// Creation time, `None` when the backend does not record one.
    async fn creation_time(&self, path: &str) -> Result<Option<DateTime<Utc>>>;

    /// Size in bytes, `None` when the backend cannot report one.
    async fn size(&self, path: &str) -> Result<Option<u64>>;

    /// Opens the file for reading its whole content.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be opened.
    async fn open_file(&self, path: &str) -> Result<FileStream>;

    /// Whether `path` exists and is not a directory.
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Delete a file at the given path.
    async fn delete(&self, path: &str) -> Result<()>;
}

/// Content sniffing of a storage backend.
#[async_trait]
pub trait FileTypeProvider: Send + Sync {
    /// Classifies the file from its header bytes, ignoring its extension.
    ///
    /// A readable file that is not a recognized image yields
    /// [`ImageType::None`]; only an unreadable file is an error.
    async fn image_type(&self, path: &str) -> Result<ImageType>;
}

/// Runs a backend call under a deadline.
pub(crate) async fn with_timeout<T, F>(
    timeout: Duration,
    operation: &'static str,
    path: &str,
    fut: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, path, ?timeout, "backend call timed out");
            Err(Error::TimedOut {
                operation,
                path: path.to_owned(),
            })
        }
    }
}
