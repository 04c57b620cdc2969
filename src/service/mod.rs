//! Domain services built on top of the current request scope.

use crate::{
    error::Result,
    item::{Directory, File, FileSystemItem},
    path::PathId,
    scope::RequestScope,
};

mod directory;
mod file;
mod path;
mod thumbnail;

pub use directory::DirectoryService;
pub use file::FileService;
pub use path::PathService;
pub use thumbnail::{ThumbnailResult, ThumbnailService};

/// Turns a location into an identifier valid on the scope's current platform.
pub(crate) fn resolve<L: ItemLocation + ?Sized>(
    scope: &RequestScope,
    location: &L,
) -> Result<PathId> {
    let id = location.to_path_id()?;
    scope.paths().validate(&id)?;
    Ok(id)
}

/// Anything a service call can be pointed at: a raw path, a [`PathId`], or an
/// item obtained from an earlier listing.
pub trait ItemLocation {
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`](crate::Error::InvalidPath) if the
    /// location does not hold a usable path.
    fn to_path_id(&self) -> Result<PathId>;
}

impl ItemLocation for str {
    fn to_path_id(&self) -> Result<PathId> {
        PathId::new(self)
    }
}

impl ItemLocation for String {
    fn to_path_id(&self) -> Result<PathId> {
        PathId::new(self.as_str())
    }
}

impl ItemLocation for PathId {
    fn to_path_id(&self) -> Result<PathId> {
        Ok(self.clone())
    }
}

impl ItemLocation for Directory {
    fn to_path_id(&self) -> Result<PathId> {
        match self.info().id() {
            Some(id) => Ok(id.clone()),
            None => PathId::new(self.path()),
        }
    }
}

impl ItemLocation for File {
    fn to_path_id(&self) -> Result<PathId> {
        match self.info().id() {
            Some(id) => Ok(id.clone()),
            None => PathId::new(self.path()),
        }
    }
}

impl ItemLocation for FileSystemItem {
    fn to_path_id(&self) -> Result<PathId> {
        match self {
            Self::Directory(directory) => directory.to_path_id(),
            Self::File(file) => file.to_path_id(),
        }
    }
}
