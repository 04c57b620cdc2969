//! Backend-agnostic core of a multi-user file explorer.
//!
//! The crate lets an application browse directories, read files and build
//! image previews the same way on any storage backend (local disk, FTP, cloud
//! drives) and for any client platform path dialect (POSIX or Windows).
//!
//! Every request works through its own [`RequestScope`], which holds the
//! platform and backend selected for that request:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use explorer_core::{EnvironmentRegistry, RequestScope};
//!
//! # tokio_test::block_on(async {
//! let registry = Arc::new(EnvironmentRegistry::default());
//! let scope = RequestScope::from_tags(registry, Some("Unix"), Some("local"));
//!
//! for directory in scope.directories().subdirectories("/srv/share").await? {
//!     println!("{} {:?}", directory.path(), directory.info().status());
//! }
//!
//! let preview = scope.thumbnails().thumbnail("/srv/share/photo.jpg", 25).await?;
//! println!("{} bytes of {}", preview.data().len(), preview.image_type());
//! # Ok::<(), explorer_core::Error>(())
//! # }).unwrap();
//! ```

mod environment;
mod error;
pub mod filesystem;
mod image_type;
mod item;
mod options;
mod path;
mod platform;
mod scope;
mod service;
pub mod transcode;

pub use environment::{
    EnvironmentContext, EnvironmentContextManager, EnvironmentRegistry, EnvironmentType,
};
pub use error::{Error, Result};
pub use filesystem::{
    DirectoryProvider, FileProvider, FileStream, FileTypeProvider, LocalFileSystem,
    RemoteFileSystem, RemoteKind,
};
pub use image_type::ImageType;
pub use item::{Directory, File, FileSystemItem, ItemInfo, ItemStatus};
pub use options::{ExplorerOptions, MIN_SNIFF_LEN};
pub use path::{PathId, PathSegment, PathStrategy, PosixPathStrategy, WindowsPathStrategy};
pub use platform::{PlatformContext, PlatformContextManager, PlatformType};
pub use scope::RequestScope;
pub use service::{
    DirectoryService, FileService, ItemLocation, PathService, ThumbnailResult, ThumbnailService,
};
