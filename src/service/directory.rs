use futures::future::join_all;
use tracing::instrument;

use super::{resolve, ItemLocation};
use crate::{
    error::Result,
    filesystem::DirectoryProvider,
    item::{Directory, FileSystemItem, ItemInfo, ItemStatus, Probes},
    path::PathId,
    scope::RequestScope,
};

/// Lists directories of the request's current backend.
///
/// A listing only fails when the backend cannot list at all. Entries whose
/// metadata cannot be read are still returned, marked
/// [`ItemStatus::Inaccessible`].
#[derive(Debug, Clone, Copy)]
pub struct DirectoryService<'a> {
    scope: &'a RequestScope,
}

impl<'a> DirectoryService<'a> {
    #[must_use]
    pub const fn new(scope: &'a RequestScope) -> Self {
        Self { scope }
    }

    fn provider(&self) -> &'a dyn DirectoryProvider {
        self.scope.environment().current_context().directories()
    }

    /// The directories directly inside `location`, in backend order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`](crate::Error::InvalidPath) for a
    /// malformed location, or the backend's error if the listing itself fails.
    #[instrument(skip_all, fields(path = tracing::field::Empty))]
    pub async fn subdirectories<L: ItemLocation + ?Sized>(
        &self,
        location: &L,
    ) -> Result<Vec<Directory>> {
        let id = resolve(self.scope, location)?;
        tracing::Span::current().record("path", id.as_str());

        let provider = self.provider();
        let paths = self
            .scope
            .guard(provider.subdirectory_paths(id.as_str()))
            .await?;

        let directories = self
            .scope
            .guard(async {
                Ok(join_all(paths.into_iter().map(|path| probe_directory(provider, path))).await)
            })
            .await?;

        tracing::debug!(
            count = directories.len(),
            inaccessible = directories
                .iter()
                .filter(|d| d.info().status() == ItemStatus::Inaccessible)
                .count(),
            "listed subdirectories"
        );

        Ok(directories)
    }

    /// Fills [`Directory::items`] with the directory's subdirectories followed
    /// by its files.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`DirectoryService::subdirectories`]; on error
    /// the directory is left unchanged.
    pub async fn load_items(&self, directory: &mut Directory) -> Result<()> {
        let subdirectories = self.subdirectories(&*directory).await?;
        let files = self.scope.files().files(&*directory).await?;

        let items = subdirectories
            .into_iter()
            .map(FileSystemItem::from)
            .chain(files.into_iter().map(FileSystemItem::from))
            .collect();
        directory.set_items(items);

        Ok(())
    }

    /// Whether `location` exists on the backend and is a directory.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed location or an unreachable backend.
    pub async fn exists<L: ItemLocation + ?Sized>(&self, location: &L) -> Result<bool> {
        let id = resolve(self.scope, location)?;
        self.scope.guard(self.provider().exists(id.as_str())).await
    }
}

async fn probe_directory(provider: &dyn DirectoryProvider, path: String) -> Directory {
    let (name, date_created, date_modified) = tokio::join!(
        provider.directory_name(&path),
        provider.creation_time(&path),
        provider.last_write_time(&path),
    );

    let mut failed = false;
    let probes = Probes {
        id: PathId::new(path.as_str()),
        name,
        date_created,
        date_modified,
    };
    let info = ItemInfo::from_probes(path, probes, &mut failed).with_status(failed);

    Directory::from_info(info)
}
