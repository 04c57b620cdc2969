//! Per-request selection of the storage backend.

use std::{fmt, str::FromStr, sync::Arc, sync::OnceLock};

use crate::{
    error::{Error, Result},
    filesystem::{
        DirectoryProvider, FileProvider, FileTypeProvider, LocalFileSystem, RemoteFileSystem,
        RemoteKind,
    },
    options::ExplorerOptions,
};

/// The storage backend a request browses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnvironmentType {
    #[default]
    Local,
    Ftp,
    GoogleDrive,
}

impl EnvironmentType {
    /// Resolves an inbound environment tag, falling back to the local
    /// filesystem for a missing or unknown tag.
    #[must_use]
    pub fn from_tag_or_default(tag: Option<&str>) -> Self {
        tag.and_then(|tag| tag.parse().ok()).unwrap_or_default()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Ftp => "ftp",
            Self::GoogleDrive => "gdrive",
        }
    }
}

impl fmt::Display for EnvironmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "ftp" => Ok(Self::Ftp),
            "gdrive" | "googledrive" => Ok(Self::GoogleDrive),
            _ => Err(Error::UnsupportedBackend(s.to_owned())),
        }
    }
}

/// The providers active for one backend.
#[derive(Clone)]
pub struct EnvironmentContext {
    environment: EnvironmentType,
    directories: Arc<dyn DirectoryProvider>,
    files: Arc<dyn FileProvider>,
    file_types: Arc<dyn FileTypeProvider>,
}

impl EnvironmentContext {
    /// Bundles three independent providers.
    pub fn new(
        environment: EnvironmentType,
        directories: Arc<dyn DirectoryProvider>,
        files: Arc<dyn FileProvider>,
        file_types: Arc<dyn FileTypeProvider>,
    ) -> Self {
        Self {
            environment,
            directories,
            files,
            file_types,
        }
    }

    /// Uses one backend value for all three provider roles.
    pub fn from_backend<B>(environment: EnvironmentType, backend: Arc<B>) -> Self
    where
        B: DirectoryProvider + FileProvider + FileTypeProvider + 'static,
    {
        Self::new(environment, backend.clone(), backend.clone(), backend)
    }

    #[inline]
    #[must_use]
    pub const fn environment(&self) -> EnvironmentType {
        self.environment
    }

    #[inline]
    #[must_use]
    pub fn directories(&self) -> &dyn DirectoryProvider {
        self.directories.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn files(&self) -> &dyn FileProvider {
        self.files.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn file_types(&self) -> &dyn FileTypeProvider {
        self.file_types.as_ref()
    }
}

impl fmt::Debug for EnvironmentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentContext")
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

/// Process-wide table of backend contexts, built once at startup and shared
/// between request scopes. Only the stateless providers live here; which one
/// is current is decided per scope by [`EnvironmentContextManager`].
#[derive(Debug, Clone)]
pub struct EnvironmentRegistry {
    options: ExplorerOptions,
    local: EnvironmentContext,
    ftp: EnvironmentContext,
    google_drive: EnvironmentContext,
}

impl EnvironmentRegistry {
    #[must_use]
    pub fn new(options: &ExplorerOptions) -> Self {
        let remote = |kind| Arc::new(RemoteFileSystem::new(kind, options.remote_timeout()));

        Self {
            options: options.clone(),
            local: EnvironmentContext::from_backend(
                EnvironmentType::Local,
                Arc::new(LocalFileSystem::new(options.clone())),
            ),
            ftp: EnvironmentContext::from_backend(EnvironmentType::Ftp, remote(RemoteKind::Ftp)),
            google_drive: EnvironmentContext::from_backend(
                EnvironmentType::GoogleDrive,
                remote(RemoteKind::GoogleDrive),
            ),
        }
    }

    /// Replaces the providers registered for `context.environment()`.
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_context(mut self, context: EnvironmentContext) -> Self {
        match context.environment() {
            EnvironmentType::Local => self.local = context,
            EnvironmentType::Ftp => self.ftp = context,
            EnvironmentType::GoogleDrive => self.google_drive = context,
        }
        self
    }

    /// The options the built-in providers were created with.
    #[inline]
    #[must_use]
    pub const fn options(&self) -> &ExplorerOptions {
        &self.options
    }

    #[must_use]
    pub fn resolve(&self, environment: EnvironmentType) -> EnvironmentContext {
        match environment {
            EnvironmentType::Local => self.local.clone(),
            EnvironmentType::Ftp => self.ftp.clone(),
            EnvironmentType::GoogleDrive => self.google_drive.clone(),
        }
    }
}

impl Default for EnvironmentRegistry {
    fn default() -> Self {
        Self::new(&ExplorerOptions::default())
    }
}

/// Holds the current backend of one request scope.
#[derive(Debug)]
pub struct EnvironmentContextManager {
    registry: Arc<EnvironmentRegistry>,
    current: OnceLock<EnvironmentContext>,
}

impl EnvironmentContextManager {
    #[must_use]
    pub fn new(registry: Arc<EnvironmentRegistry>) -> Self {
        Self {
            registry,
            current: OnceLock::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &EnvironmentRegistry {
        &self.registry
    }

    /// The current context, defaulting to the local filesystem.
    pub fn current_context(&self) -> &EnvironmentContext {
        self.current
            .get_or_init(|| self.registry.resolve(EnvironmentType::default()))
    }

    /// Selects the backend named by `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedBackend`] for an unknown tag; the current
    /// context is left untouched in that case.
    pub fn set_current_environment(&mut self, tag: &str) -> Result<()> {
        let environment = tag.parse()?;
        self.set_environment(environment);
        Ok(())
    }

    pub fn set_environment(&mut self, environment: EnvironmentType) {
        tracing::debug!(%environment, "switching environment context");
        self.current = OnceLock::from(self.registry.resolve(environment));
    }
}
