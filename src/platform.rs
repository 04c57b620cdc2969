//! Per-request selection of the path dialect.

use std::{fmt, str::FromStr, sync::OnceLock};

use crate::{
    error::{Error, Result},
    path::{PathStrategy, PosixPathStrategy, WindowsPathStrategy},
};

static POSIX: PosixPathStrategy = PosixPathStrategy;
static WINDOWS: WindowsPathStrategy = WindowsPathStrategy;

/// The path dialect a request speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlatformType {
    #[default]
    Posix,
    Windows,
}

impl PlatformType {
    /// Resolves an inbound platform tag. `"Windows"` selects Windows, anything
    /// else (including a missing tag) falls back to POSIX.
    #[must_use]
    pub fn from_tag_or_default(tag: Option<&str>) -> Self {
        match tag {
            Some(tag) if tag.trim().eq_ignore_ascii_case("windows") => Self::Windows,
            _ => Self::Posix,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Posix => "posix",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "windows" | "win" => Ok(Self::Windows),
            "posix" | "unix" | "linux" | "macos" => Ok(Self::Posix),
            _ => Err(Error::UnsupportedPlatform(s.to_owned())),
        }
    }
}

/// The strategies active for one platform.
#[derive(Clone, Copy)]
pub struct PlatformContext {
    platform: PlatformType,
    path_strategy: &'static dyn PathStrategy,
}

impl PlatformContext {
    #[must_use]
    pub fn new(platform: PlatformType) -> Self {
        let path_strategy: &'static dyn PathStrategy = match platform {
            PlatformType::Posix => &POSIX,
            PlatformType::Windows => &WINDOWS,
        };

        Self {
            platform,
            path_strategy,
        }
    }

    #[inline]
    #[must_use]
    pub const fn platform(&self) -> PlatformType {
        self.platform
    }

    #[inline]
    #[must_use]
    pub fn path_strategy(&self) -> &'static dyn PathStrategy {
        self.path_strategy
    }
}

impl fmt::Debug for PlatformContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformContext")
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

impl Default for PlatformContext {
    fn default() -> Self {
        Self::new(PlatformType::default())
    }
}

/// Holds the current platform of one request scope.
///
/// Nothing here is global: every [`RequestScope`](crate::RequestScope) owns
/// its own manager, so a request switching to Windows never affects another.
#[derive(Debug, Default)]
pub struct PlatformContextManager {
    current: OnceLock<PlatformContext>,
}

impl PlatformContextManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current context, defaulting to POSIX if none was ever selected.
    pub fn current_context(&self) -> &PlatformContext {
        self.current.get_or_init(PlatformContext::default)
    }

    /// Selects the platform named by `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] for an unknown tag; the current
    /// context is left untouched in that case.
    pub fn set_current_platform(&mut self, tag: &str) -> Result<()> {
        let platform = tag.parse()?;
        self.set_platform(platform);
        Ok(())
    }

    pub fn set_platform(&mut self, platform: PlatformType) {
        tracing::debug!(%platform, "switching platform context");
        self.current = OnceLock::from(PlatformContext::new(platform));
    }
}
