//! Local filesystem implementation.

use std::{fs::Metadata, io, path::Path, time::SystemTime};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncReadExt;

use super::{with_timeout, DirectoryProvider, FileProvider, FileStream, FileTypeProvider};
use crate::{
    error::{Error, Result},
    image_type::ImageType,
    options::ExplorerOptions,
};

/// A backend for local file operations using `tokio::fs`.
///
/// Every call runs under the timeouts of its [`ExplorerOptions`] so that a
/// hung network mount cannot stall a request.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem {
    options: ExplorerOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Directory,
    File,
}

impl LocalFileSystem {
    #[must_use]
    pub fn new(options: ExplorerOptions) -> Self {
        Self { options }
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &ExplorerOptions {
        &self.options
    }

    /// Lists the children of `path` of one kind, sorted by name.
    async fn list(&self, path: &str, wanted: EntryKind) -> Result<Vec<String>> {
        let probe_timeout = self.options.probe_timeout();

        let mut entries = with_timeout(self.options.listing_timeout(), "list", path, async {
            let mut read_dir = tokio::fs::read_dir(path)
                .await
                .map_err(|e| Error::io(path, e))?;
            let mut entries = Vec::new();

            while let Some(entry) = read_dir
                .next_entry()
                .await
                .map_err(|e| Error::io(path, e))?
            {
                let entry_path = entry.path().to_string_lossy().to_string();

                // DirEntry::file_type is usually free on Linux (comes from readdir)
                let file_type = tokio::time::timeout(probe_timeout, entry.file_type()).await;

                let kind = match file_type {
                    Ok(Ok(file_type)) if file_type.is_symlink() => {
                        // Follow the link so that links to directories are navigable.
                        // A broken link is reported as a file and left to the probes.
                        match tokio::time::timeout(probe_timeout, tokio::fs::metadata(&entry_path))
                            .await
                        {
                            Ok(Ok(meta)) if meta.is_dir() => EntryKind::Directory,
                            _ => EntryKind::File,
                        }
                    }
                    Ok(Ok(file_type)) if file_type.is_dir() => EntryKind::Directory,
                    Ok(Ok(_)) => EntryKind::File,
                    Ok(Err(_)) | Err(_) => {
                        // Unknown type: listed as a file so the probes mark it inaccessible
                        tracing::debug!(path = %entry_path, "entry type unreadable");
                        EntryKind::File
                    }
                };

                if kind == wanted {
                    entries.push(entry_path);
                }
            }

            Ok(entries)
        })
        .await?;

        entries.sort();
        Ok(entries)
    }

    async fn metadata(&self, path: &str) -> Result<Metadata> {
        with_timeout(self.options.probe_timeout(), "metadata", path, async {
            tokio::fs::metadata(path)
                .await
                .map_err(|e| Error::io(path, e))
        })
        .await
    }

    async fn modified(&self, path: &str) -> Result<Option<DateTime<Utc>>> {
        let metadata = self.metadata(path).await?;
        timestamp(path, metadata.modified())
    }

    async fn created(&self, path: &str) -> Result<Option<DateTime<Utc>>> {
        let metadata = self.metadata(path).await?;
        timestamp(path, metadata.created())
    }

    async fn exists_as(&self, path: &str, kind: EntryKind) -> Result<bool> {
        let result =
            tokio::time::timeout(self.options.probe_timeout(), tokio::fs::metadata(path)).await;

        Ok(match result {
            Ok(Ok(meta)) => (kind == EntryKind::Directory) == meta.is_dir(),
            _ => false,
        })
    }
}

/// Platforms that do not record a timestamp report `None` rather than failing.
fn timestamp(path: &str, time: io::Result<SystemTime>) -> Result<Option<DateTime<Utc>>> {
    match time {
        Ok(time) => Ok(Some(DateTime::<Utc>::from(time))),
        Err(e) if e.kind() == io::ErrorKind::Unsupported => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

fn last_component(path: &str) -> Result<String> {
    let as_path = Path::new(path);
    match as_path.file_name() {
        Some(name) => Ok(name.to_string_lossy().to_string()),
        None if as_path.has_root() && as_path.parent().is_none() => Ok(path.to_owned()),
        None => Err(Error::invalid_path(path, "path has no final component")),
    }
}

#[async_trait]
impl DirectoryProvider for LocalFileSystem {
    async fn subdirectory_paths(&self, path: &str) -> Result<Vec<String>> {
        self.list(path, EntryKind::Directory).await
    }

    async fn file_paths(&self, path: &str) -> Result<Vec<String>> {
        self.list(path, EntryKind::File).await
    }

    async fn directory_name(&self, path: &str) -> Result<String> {
        last_component(path)
    }

    async fn last_write_time(&self, path: &str) -> Result<Option<DateTime<Utc>>> {
        self.modified(path).await
    }

    async fn creation_time(&self, path: &str) -> Result<Option<DateTime<Utc>>> {
        self.created(path).await
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        self.exists_as(path, EntryKind::Directory).await
    }
}

#[async_trait]
impl FileProvider for LocalFileSystem {
    async fn file_name(&self, path: &str) -> Result<String> {
        last_component(path)
    }

    async fn last_write_time(&self, path: &str) -> Result<Option<DateTime<Utc>>> {
        self.modified(path).await
    }

    async fn creation_time(&self, path: &str) -> Result<Option<DateTime<Utc>>> {
        self.created(path).await
    }

    async fn size(&self, path: &str) -> Result<Option<u64>> {
        let metadata = self.metadata(path).await?;
        Ok(Some(metadata.len()))
    }

    async fn open_file(&self, path: &str) -> Result<FileStream> {
        let file = with_timeout(self.options.probe_timeout(), "open", path, async {
            tokio::fs::File::open(path)
                .await
                .map_err(|e| Error::io(path, e))
        })
        .await?;

        Ok(Box::new(file))
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        self.exists_as(path, EntryKind::File).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        with_timeout(self.options.listing_timeout(), "delete", path, async {
            tokio::fs::remove_file(path)
                .await
                .map_err(|e| Error::io(path, e))
        })
        .await
    }
}

#[async_trait]
impl FileTypeProvider for LocalFileSystem {
    async fn image_type(&self, path: &str) -> Result<ImageType> {
        let sniff_len = self.options.sniff_len();

        let header = with_timeout(self.options.probe_timeout(), "sniff", path, async {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|e| Error::io(path, e))?;

            let mut header = Vec::with_capacity(sniff_len);
            file.take(sniff_len as u64)
                .read_to_end(&mut header)
                .await
                .map_err(|e| Error::io(path, e))?;
            Ok(header)
        })
        .await?;

        Ok(ImageType::sniff(&header))
    }
}
