//! Read-through views of backend entries.
//!
//! Items are rebuilt on every listing and never cached. Two items are equal
//! when they point at the same path, whatever metadata they carry.

use chrono::{DateTime, Utc};

use crate::{error::Result, path::PathId};

/// Whether every metadata probe for an item succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ItemStatus {
    #[default]
    Accessible,
    Inaccessible,
}

/// Fields shared by directories and files.
#[derive(Clone, educe::Educe)]
#[educe(Debug, PartialEq, Eq, Hash)]
pub struct ItemInfo {
    path: String,
    #[educe(PartialEq(ignore), Hash(ignore))]
    id: Option<PathId>,
    #[educe(PartialEq(ignore), Hash(ignore))]
    name: Option<String>,
    #[educe(PartialEq(ignore), Hash(ignore))]
    date_created: Option<DateTime<Utc>>,
    #[educe(PartialEq(ignore), Hash(ignore))]
    date_modified: Option<DateTime<Utc>>,
    #[educe(PartialEq(ignore), Hash(ignore))]
    status: ItemStatus,
}

/// Outcomes of the metadata probes for one listing entry.
pub(crate) struct Probes {
    pub(crate) id: Result<PathId>,
    pub(crate) name: Result<String>,
    pub(crate) date_created: Result<Option<DateTime<Utc>>>,
    pub(crate) date_modified: Result<Option<DateTime<Utc>>>,
}

/// Keeps a successful probe value and records a failed one.
pub(crate) fn settle<T>(
    path: &str,
    probe: &'static str,
    outcome: Result<T>,
    failed: &mut bool,
) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(path, probe, %error, "metadata probe failed");
            *failed = true;
            None
        }
    }
}

impl ItemInfo {
    /// An accessible item with no metadata yet.
    #[must_use]
    pub fn new(id: PathId) -> Self {
        Self {
            path: id.as_str().to_owned(),
            id: Some(id),
            name: None,
            date_created: None,
            date_modified: None,
            status: ItemStatus::Accessible,
        }
    }

    /// Folds probe outcomes into an item. Never fails: any failed probe
    /// leaves its field empty and marks the item inaccessible.
    pub(crate) fn from_probes(path: String, probes: Probes, failed: &mut bool) -> Self {
        let id = settle(&path, "path", probes.id, failed);
        let name = settle(&path, "name", probes.name, failed);
        let date_created = settle(&path, "created", probes.date_created, failed).flatten();
        let date_modified = settle(&path, "modified", probes.date_modified, failed).flatten();

        Self {
            path,
            id,
            name,
            date_created,
            date_modified,
            status: ItemStatus::Accessible,
        }
    }

    pub(crate) fn with_status(mut self, failed: bool) -> Self {
        self.status = if failed {
            ItemStatus::Inaccessible
        } else {
            ItemStatus::Accessible
        };
        self
    }

    /// The raw backend path, present even when it failed validation.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> Option<&PathId> {
        self.id.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn date_created(&self) -> Option<DateTime<Utc>> {
        self.date_created
    }

    #[inline]
    #[must_use]
    pub const fn date_modified(&self) -> Option<DateTime<Utc>> {
        self.date_modified
    }

    #[inline]
    #[must_use]
    pub const fn status(&self) -> ItemStatus {
        self.status
    }

    #[inline]
    #[must_use]
    pub fn is_accessible(&self) -> bool {
        self.status == ItemStatus::Accessible
    }
}

/// A directory entry. Its children are only present after
/// [`DirectoryService::load_items`](crate::DirectoryService::load_items).
#[derive(Clone, educe::Educe)]
#[educe(Debug, PartialEq, Eq, Hash)]
pub struct Directory {
    info: ItemInfo,
    #[educe(PartialEq(ignore), Hash(ignore))]
    items: Vec<FileSystemItem>,
}

impl Directory {
    #[must_use]
    pub fn new(id: PathId) -> Self {
        Self::from_info(ItemInfo::new(id))
    }

    pub(crate) fn from_info(info: ItemInfo) -> Self {
        Self {
            info,
            items: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn info(&self) -> &ItemInfo {
        &self.info
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        self.info.path()
    }

    #[inline]
    #[must_use]
    pub fn items(&self) -> &[FileSystemItem] {
        &self.items
    }

    pub(crate) fn set_items(&mut self, items: Vec<FileSystemItem>) {
        self.items = items;
    }
}

/// A file entry.
#[derive(Clone, educe::Educe)]
#[educe(Debug, PartialEq, Eq, Hash)]
pub struct File {
    info: ItemInfo,
    #[educe(PartialEq(ignore), Hash(ignore))]
    size: u64,
}

impl File {
    #[must_use]
    pub fn new(id: PathId) -> Self {
        Self::from_info(ItemInfo::new(id), 0)
    }

    pub(crate) fn from_info(info: ItemInfo, size: u64) -> Self {
        Self { info, size }
    }

    #[inline]
    #[must_use]
    pub const fn info(&self) -> &ItemInfo {
        &self.info
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        self.info.path()
    }

    /// Size in bytes; `0` when the backend could not report it.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }
}

/// A directory or a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileSystemItem {
    Directory(Directory),
    File(File),
}

impl FileSystemItem {
    #[must_use]
    pub const fn info(&self) -> &ItemInfo {
        match self {
            Self::Directory(directory) => directory.info(),
            Self::File(file) => file.info(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    #[must_use]
    pub const fn as_directory(&self) -> Option<&Directory> {
        match self {
            Self::Directory(directory) => Some(directory),
            Self::File(_) => None,
        }
    }

    #[must_use]
    pub const fn as_file(&self) -> Option<&File> {
        match self {
            Self::File(file) => Some(file),
            Self::Directory(_) => None,
        }
    }
}

impl From<Directory> for FileSystemItem {
    fn from(directory: Directory) -> Self {
        Self::Directory(directory)
    }
}

impl From<File> for FileSystemItem {
    fn from(file: File) -> Self {
        Self::File(file)
    }
}
