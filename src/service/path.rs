use std::collections::HashSet;

use crate::{
    error::Result,
    path::{PathId, PathSegment, PathStrategy},
    scope::RequestScope,
};

/// Path semantics of the request's current platform, without any backend access.
#[derive(Debug, Clone, Copy)]
pub struct PathService<'a> {
    scope: &'a RequestScope,
}

impl<'a> PathService<'a> {
    #[must_use]
    pub const fn new(scope: &'a RequestScope) -> Self {
        Self { scope }
    }

    fn strategy(&self) -> &'static dyn PathStrategy {
        self.scope.platform().current_context().path_strategy()
    }

    #[must_use]
    pub fn is_valid_path(&self, path: &str) -> bool {
        self.strategy().is_valid_path(path)
    }

    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidPath`] if `path` breaks the platform's syntax.
    pub fn parse_path(&self, path: &str) -> Result<Vec<PathSegment>> {
        self.strategy().parse_path(path)
    }

    /// # Errors
    ///
    /// Returns [`crate::Error::CannotNavigateUp`] at a root, or [`crate::Error::InvalidPath`].
    pub fn go_up_one_level(&self, path: &str) -> Result<Vec<PathSegment>> {
        self.strategy().go_up_one_level(path)
    }

    #[must_use]
    pub fn invalid_path_chars(&self) -> HashSet<char> {
        self.strategy().invalid_path_chars()
    }

    #[must_use]
    pub fn join_segments(&self, segments: &[PathSegment]) -> String {
        self.strategy().join_segments(segments)
    }

    /// The parent of `path` as a navigable identifier.
    ///
    /// # Errors
    ///
    /// Same as [`PathService::go_up_one_level`].
    pub fn parent(&self, path: &str) -> Result<PathId> {
        let segments = self.go_up_one_level(path)?;
        PathId::new(self.join_segments(&segments))
    }

    /// Checks `id` against the platform before any backend sees it.
    pub(crate) fn validate(&self, id: &PathId) -> Result<()> {
        self.parse_path(id.as_str()).map(drop)
    }
}
