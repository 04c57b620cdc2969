//! The per-request handle every service works through.

use std::{future::Future, sync::Arc};

use tokio_util::sync::CancellationToken;

use crate::{
    environment::{EnvironmentContextManager, EnvironmentRegistry, EnvironmentType},
    error::{Error, Result},
    options::ExplorerOptions,
    platform::{PlatformContextManager, PlatformType},
    service::{DirectoryService, FileService, PathService, ThumbnailService},
};

/// Everything one request needs to reach the right platform and backend.
///
/// A scope is created when a request starts and dropped when it ends. It owns
/// its context managers outright, so concurrent requests never observe each
/// other's selections.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use explorer_core::{EnvironmentRegistry, RequestScope};
///
/// # tokio_test::block_on(async {
/// let registry = Arc::new(EnvironmentRegistry::default());
///
/// let mut scope = RequestScope::new(registry);
/// scope.set_current_platform("Windows")?;
/// assert!(scope.paths().is_valid_path("C:\\Users"));
///
/// scope.set_current_platform("Unix")?;
/// let dir = tempfile::tempdir()?;
/// std::fs::create_dir(dir.path().join("photos"))?;
///
/// let root = dir.path().to_string_lossy();
/// let subdirectories = scope.directories().subdirectories(&*root).await?;
/// assert_eq!(subdirectories[0].info().name(), Some("photos"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # }).unwrap();
/// ```
#[derive(Debug)]
pub struct RequestScope {
    platform: PlatformContextManager,
    environment: EnvironmentContextManager,
    cancellation: CancellationToken,
}

impl RequestScope {
    #[must_use]
    pub fn new(registry: Arc<EnvironmentRegistry>) -> Self {
        Self {
            platform: PlatformContextManager::new(),
            environment: EnvironmentContextManager::new(registry),
            cancellation: CancellationToken::new(),
        }
    }

    /// Builds a scope from inbound tags, falling back to POSIX and the local
    /// backend for missing or unknown tags.
    #[must_use]
    pub fn from_tags(
        registry: Arc<EnvironmentRegistry>,
        platform: Option<&str>,
        environment: Option<&str>,
    ) -> Self {
        let mut scope = Self::new(registry);
        scope
            .platform
            .set_platform(PlatformType::from_tag_or_default(platform));
        scope
            .environment
            .set_environment(EnvironmentType::from_tag_or_default(environment));
        scope
    }

    /// Ties the scope to an outer token, typically the one cancelled when the
    /// client disconnects.
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_cancellation(mut self, parent: &CancellationToken) -> Self {
        self.cancellation = parent.child_token();
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] for an unknown tag.
    pub fn set_current_platform(&mut self, tag: &str) -> Result<()> {
        self.platform.set_current_platform(tag)
    }

    /// # Errors
    ///
    /// Returns [`Error::UnsupportedBackend`] for an unknown tag.
    pub fn set_current_environment(&mut self, tag: &str) -> Result<()> {
        self.environment.set_current_environment(tag)
    }

    #[inline]
    #[must_use]
    pub const fn platform(&self) -> &PlatformContextManager {
        &self.platform
    }

    #[inline]
    pub fn platform_mut(&mut self) -> &mut PlatformContextManager {
        &mut self.platform
    }

    #[inline]
    #[must_use]
    pub const fn environment(&self) -> &EnvironmentContextManager {
        &self.environment
    }

    #[inline]
    pub fn environment_mut(&mut self) -> &mut EnvironmentContextManager {
        &mut self.environment
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> &ExplorerOptions {
        self.environment.registry().options()
    }

    #[inline]
    #[must_use]
    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Stops every in-flight backend call made through this scope.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    #[must_use]
    pub const fn paths(&self) -> PathService<'_> {
        PathService::new(self)
    }

    #[must_use]
    pub const fn directories(&self) -> DirectoryService<'_> {
        DirectoryService::new(self)
    }

    #[must_use]
    pub const fn files(&self) -> FileService<'_> {
        FileService::new(self)
    }

    #[must_use]
    pub const fn thumbnails(&self) -> ThumbnailService<'_> {
        ThumbnailService::new(self)
    }

    /// Runs a backend call unless the scope is cancelled first.
    pub(crate) async fn guard<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(Error::Cancelled),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_fall_back_to_defaults() {
        let scope = RequestScope::from_tags(Arc::default(), Some("Windows"), Some("ftp"));
        assert_eq!(
            scope.platform().current_context().platform(),
            PlatformType::Windows
        );
        assert_eq!(
            scope.environment().current_context().environment(),
            EnvironmentType::Ftp
        );

        let scope = RequestScope::from_tags(Arc::default(), Some("Plan9"), None);
        assert_eq!(
            scope.platform().current_context().platform(),
            PlatformType::Posix
        );
        assert_eq!(
            scope.environment().current_context().environment(),
            EnvironmentType::Local
        );
    }

    #[tokio::test]
    async fn cancelled_scope_short_circuits() {
        let parent = CancellationToken::new();
        let scope = RequestScope::new(Arc::default()).with_cancellation(&parent);
        parent.cancel();

        let result: Result<()> = scope.guard(std::future::pending()).await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
