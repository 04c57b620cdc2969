//! Path identity and platform path dialects.
//!
//! [`PathId`] is the validated identity of every filesystem item. Path syntax
//! itself (separators, drive letters, reserved characters) is owned by a
//! [`PathStrategy`], one implementation per platform, so that the rest of the
//! crate never needs to know which dialect a request speaks.

use std::{collections::HashSet, fmt, str::FromStr};

use crate::error::{Error, Result};

mod posix;
mod windows;

pub use posix::PosixPathStrategy;
pub use windows::WindowsPathStrategy;

/// A validated, immutable path identifier.
///
/// Two identifiers are equal when their raw path strings are equal. No
/// normalization is applied: the string handed to [`PathId::new`] is exactly
/// the string returned by [`PathId::as_str`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathId(String);

impl PathId {
    /// Creates a new identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if `path` is empty or only whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use explorer_core::PathId;
    ///
    /// let id = PathId::new("/home/user").unwrap();
    /// assert_eq!(id.as_str(), "/home/user");
    /// assert!(PathId::new("   ").is_err());
    /// ```
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(Error::invalid_path(path, "path is empty"));
        }
        Ok(Self(path))
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PathId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for PathId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for PathId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PathId {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

/// One component of a parsed path, ordered root-to-leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    name: String,
    is_directory: bool,
    is_drive: bool,
}

impl PathSegment {
    #[must_use]
    pub fn new(name: impl Into<String>, is_directory: bool, is_drive: bool) -> Self {
        Self {
            name: name.into(),
            is_directory,
            is_drive,
        }
    }

    /// A root segment such as `/` or `C:`. Drives are always directories.
    #[must_use]
    pub fn drive(name: impl Into<String>) -> Self {
        Self::new(name, true, true)
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        self.is_directory
    }

    #[inline]
    #[must_use]
    pub const fn is_drive(&self) -> bool {
        self.is_drive
    }
}

/// Path syntax rules for one platform.
///
/// Implementations are stateless and shared between every request that
/// selects the same platform.
pub trait PathStrategy: Send + Sync + fmt::Debug {
    /// Splits `path` into segments, root-to-leaf.
    ///
    /// The leaf is a directory when the path ends with a separator or when its
    /// name carries no recognizable file extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if the path breaks the platform's syntax.
    fn parse_path(&self, path: &str) -> Result<Vec<PathSegment>>;

    /// Characters that may never appear inside a segment on this platform.
    fn invalid_path_chars(&self) -> HashSet<char>;

    /// Renders segments back into a path string of this dialect.
    fn join_segments(&self, segments: &[PathSegment]) -> String;

    /// Syntactic validity check. Never touches any storage backend.
    fn is_valid_path(&self, path: &str) -> bool {
        self.parse_path(path).is_ok()
    }

    /// Segments of the parent of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CannotNavigateUp`] when `path` is a root, or
    /// [`Error::InvalidPath`] when it does not parse.
    fn go_up_one_level(&self, path: &str) -> Result<Vec<PathSegment>> {
        let mut segments = self.parse_path(path)?;

        match segments.as_slice() {
            [] | [PathSegment { is_drive: true, .. }] => Err(Error::CannotNavigateUp {
                path: path.to_owned(),
            }),
            _ => {
                segments.pop();
                Ok(segments)
            }
        }
    }
}

/// Whether a leaf name looks like `stem.ext` with a short alphanumeric extension.
///
/// Leading-dot names such as `.config` have no stem and are not treated as
/// carrying an extension.
pub(crate) fn has_file_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty()
                && (1..=5).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

/// Builds segments for the non-root part of a path that has already been
/// split on the platform separator.
pub(crate) fn segments_from_names(names: &[&str], trailing_separator: bool) -> Vec<PathSegment> {
    let last = names.len().saturating_sub(1);
    names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let is_directory = idx < last || trailing_separator || !has_file_extension(name);
            PathSegment::new(*name, is_directory, false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_id_rejects_blank_input() {
        for raw in ["", " ", "\t", "\n  \r"] {
            let err = PathId::new(raw).unwrap_err();
            assert!(matches!(err, Error::InvalidPath { .. }), "{raw:?}");
        }
    }

    #[test]
    fn path_id_keeps_input_verbatim() {
        for raw in [" /padded ", "relative/path", "C:\\Users", "/"] {
            assert_eq!(PathId::new(raw).unwrap().as_str(), raw);
        }
    }

    #[test]
    fn path_id_equality_is_by_value() {
        let a: PathId = "/tmp".parse().unwrap();
        let b = PathId::try_from(String::from("/tmp")).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, PathId::new("/tmp/").unwrap());
    }

    #[test]
    fn extension_heuristic() {
        assert!(has_file_extension("photo.jpeg"));
        assert!(has_file_extension("archive.tar.gz"));
        assert!(!has_file_extension("docs"));
        assert!(!has_file_extension(".bashrc"));
        assert!(!has_file_extension("notes."));
        assert!(!has_file_extension("release.candidate"));
        assert!(!has_file_extension("v1.2-beta"));
    }
}
