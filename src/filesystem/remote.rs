//! Extension points for remote backends.
//!
//! No transport is wired in yet: every call fails with
//! [`Error::BackendUnavailable`] after passing through the same deadline a
//! real client would get, so callers already see the final contract.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{with_timeout, DirectoryProvider, FileProvider, FileStream, FileTypeProvider};
use crate::{
    error::{Error, Result},
    image_type::ImageType,
};

/// The remote protocols the explorer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteKind {
    Ftp,
    GoogleDrive,
}

impl RemoteKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ftp => "ftp",
            Self::GoogleDrive => "gdrive",
        }
    }
}

impl fmt::Display for RemoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct RemoteFileSystem {
    kind: RemoteKind,
    timeout: Duration,
}

impl RemoteFileSystem {
    #[must_use]
    pub const fn new(kind: RemoteKind, timeout: Duration) -> Self {
        Self { kind, timeout }
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> RemoteKind {
        self.kind
    }

    async fn call<T>(&self, operation: &'static str, path: &str) -> Result<T> {
        let backend = self.kind.as_str();
        with_timeout(self.timeout, operation, path, async move {
            Err(Error::BackendUnavailable { backend })
        })
        .await
    }
}

#[async_trait]
impl DirectoryProvider for RemoteFileSystem {
    async fn subdirectory_paths(&self, path: &str) -> Result<Vec<String>> {
        self.call("list", path).await
    }

    async fn file_paths(&self, path: &str) -> Result<Vec<String>> {
        self.call("list", path).await
    }

    async fn directory_name(&self, path: &str) -> Result<String> {
        self.call("name", path).await
    }

    async fn last_write_time(&self, path: &str) -> Result<Option<DateTime<Utc>>> {
        self.call("modified", path).await
    }

    async fn creation_time(&self, path: &str) -> Result<Option<DateTime<Utc>>> {
        self.call("created", path).await
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        self.call("exists", path).await
    }
}

#[async_trait]
impl FileProvider for RemoteFileSystem {
    async fn file_name(&self, path: &str) -> Result<String> {
        self.call("name", path).await
    }

    async fn last_write_time(&self, path: &str) -> Result<Option<DateTime<Utc>>> {
        self.call("modified", path).await
    }

    async fn creation_time(&self, path: &str) -> Result<Option<DateTime<Utc>>> {
        self.call("created", path).await
    }

    async fn size(&self, path: &str) -> Result<Option<u64>> {
        self.call("size", path).await
    }

    async fn open_file(&self, path: &str) -> Result<FileStream> {
        self.call("open", path).await
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        self.call("exists", path).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.call("delete", path).await
    }
}

#[async_trait]
impl FileTypeProvider for RemoteFileSystem {
    async fn image_type(&self, path: &str) -> Result<ImageType> {
        self.call("sniff", path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_call_reports_the_backend() {
        let ftp = RemoteFileSystem::new(RemoteKind::Ftp, Duration::from_secs(1));

        let err = ftp.subdirectory_paths("/pub").await.unwrap_err();
        assert!(matches!(err, Error::BackendUnavailable { backend: "ftp" }));

        let err = ftp.image_type("/pub/a.png").await.unwrap_err();
        assert!(matches!(err, Error::BackendUnavailable { backend: "ftp" }));
    }
}
