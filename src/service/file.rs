use futures::future::join_all;
use tokio::io::AsyncReadExt;
use tracing::instrument;

use super::{resolve, ItemLocation};
use crate::{
    error::{Error, Result},
    filesystem::{with_timeout, DirectoryProvider, FileProvider, FileStream},
    item::{settle, File, ItemInfo, ItemStatus, Probes},
    path::PathId,
    scope::RequestScope,
};

/// Lists and reads files of the request's current backend.
///
/// Listings follow the same per-entry isolation as
/// [`DirectoryService`](crate::DirectoryService): an unreadable size or
/// timestamp marks the entry inaccessible instead of failing the call.
#[derive(Debug, Clone, Copy)]
pub struct FileService<'a> {
    scope: &'a RequestScope,
}

impl<'a> FileService<'a> {
    #[must_use]
    pub const fn new(scope: &'a RequestScope) -> Self {
        Self { scope }
    }

    fn directories(&self) -> &'a dyn DirectoryProvider {
        self.scope.environment().current_context().directories()
    }

    fn provider(&self) -> &'a dyn FileProvider {
        self.scope.environment().current_context().files()
    }

    /// The files directly inside the directory at `location`, in backend order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] for a malformed location, or the
    /// backend's error if the listing itself fails.
    #[instrument(skip_all, fields(path = tracing::field::Empty))]
    pub async fn files<L: ItemLocation + ?Sized>(&self, location: &L) -> Result<Vec<File>> {
        let id = resolve(self.scope, location)?;
        tracing::Span::current().record("path", id.as_str());

        let paths = self
            .scope
            .guard(self.directories().file_paths(id.as_str()))
            .await?;

        let provider = self.provider();
        let files = self
            .scope
            .guard(async {
                Ok(join_all(paths.into_iter().map(|path| probe_file(provider, path))).await)
            })
            .await?;

        tracing::debug!(
            count = files.len(),
            inaccessible = files
                .iter()
                .filter(|f| f.info().status() == ItemStatus::Inaccessible)
                .count(),
            "listed files"
        );

        Ok(files)
    }

    /// The whole content of the file at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooLarge`] above
    /// [`ExplorerOptions::max_download_bytes`](crate::ExplorerOptions::max_download_bytes),
    /// or the backend's error if the file cannot be read.
    #[instrument(skip_all, fields(path = tracing::field::Empty))]
    pub async fn content<L: ItemLocation + ?Sized>(&self, location: &L) -> Result<Vec<u8>> {
        let id = resolve(self.scope, location)?;
        tracing::Span::current().record("path", id.as_str());

        let limit = self.scope.options().max_download_bytes();
        self.read(&id, limit).await
    }

    /// A stream over the content of the file at `location`, for downloads of
    /// any size.
    ///
    /// Only opening the file is bounded by the scope; reading the stream is
    /// left to the caller.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the file cannot be opened.
    pub async fn open<L: ItemLocation + ?Sized>(&self, location: &L) -> Result<FileStream> {
        let id = resolve(self.scope, location)?;
        self.scope.guard(self.provider().open_file(id.as_str())).await
    }

    /// Whether `location` exists on the backend and is a file.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed location or an unreachable backend.
    pub async fn exists<L: ItemLocation + ?Sized>(&self, location: &L) -> Result<bool> {
        let id = resolve(self.scope, location)?;
        self.scope.guard(self.provider().exists(id.as_str())).await
    }

    /// Deletes the file at `location`.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the file cannot be removed.
    pub async fn delete<L: ItemLocation + ?Sized>(&self, location: &L) -> Result<()> {
        let id = resolve(self.scope, location)?;
        self.scope.guard(self.provider().delete(id.as_str())).await?;
        tracing::debug!(path = id.as_str(), "deleted file");
        Ok(())
    }

    /// Reads an image source under the thumbnail size limit.
    pub(crate) async fn fetch(&self, id: &PathId) -> Result<Vec<u8>> {
        let limit = self.scope.options().max_thumbnail_source_bytes();
        self.read(id, limit).await
    }

    async fn read(&self, id: &PathId, limit: u64) -> Result<Vec<u8>> {
        let path = id.as_str();

        self.scope
            .guard(with_timeout(
                self.scope.options().fetch_timeout(),
                "fetch",
                path,
                async {
                    let stream = self.provider().open_file(path).await?;
                    read_capped(stream, path, limit).await
                },
            ))
            .await
    }
}

async fn probe_file(provider: &dyn FileProvider, path: String) -> File {
    let (name, date_created, date_modified, size) = tokio::join!(
        provider.file_name(&path),
        provider.creation_time(&path),
        provider.last_write_time(&path),
        provider.size(&path),
    );

    let mut failed = false;
    let size = settle(&path, "size", size, &mut failed)
        .flatten()
        .unwrap_or(0);
    let probes = Probes {
        id: PathId::new(path.as_str()),
        name,
        date_created,
        date_modified,
    };
    let info = ItemInfo::from_probes(path, probes, &mut failed).with_status(failed);

    File::from_info(info, size)
}

async fn read_capped(stream: FileStream, path: &str, limit: u64) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    stream
        .take(limit.saturating_add(1))
        .read_to_end(&mut data)
        .await
        .map_err(|e| Error::io(path, e))?;

    if data.len() as u64 > limit {
        return Err(Error::TooLarge {
            path: path.to_owned(),
            limit,
        });
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_capped_enforces_the_limit() {
        let small: FileStream = Box::new(std::io::Cursor::new(vec![1u8; 8]));
        assert_eq!(read_capped(small, "/a", 8).await.unwrap().len(), 8);

        let big: FileStream = Box::new(std::io::Cursor::new(vec![1u8; 9]));
        assert!(matches!(
            read_capped(big, "/a", 8).await,
            Err(Error::TooLarge { limit: 8, .. })
        ));
    }
}
