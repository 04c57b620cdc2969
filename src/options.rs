use std::time::Duration;

/// The size of 1MiB in bytes
const MIB: u64 = 1_048_576;

/// Enough leading bytes for every signature [`ImageType::sniff`](crate::ImageType::sniff) knows.
pub const MIN_SNIFF_LEN: usize = 16;

/// Tunables shared by the providers and services.
///
/// Loading these from a configuration file is left to the embedding
/// application; the defaults are safe for a local disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExplorerOptions {
    listing_timeout: Duration,
    probe_timeout: Duration,
    fetch_timeout: Duration,
    remote_timeout: Duration,
    max_thumbnail_source_bytes: u64,
    max_download_bytes: u64,
    sniff_len: usize,
}

impl Default for ExplorerOptions {
    fn default() -> Self {
        Self {
            listing_timeout: Duration::from_secs(5),
            probe_timeout: Duration::from_secs(2),
            fetch_timeout: Duration::from_secs(30),
            remote_timeout: Duration::from_secs(10),
            max_thumbnail_source_bytes: MIB * 24,
            max_download_bytes: MIB * 1024,
            sniff_len: MIN_SNIFF_LEN,
        }
    }
}

impl ExplorerOptions {
    /// Timeout for listing the entries of one directory.
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub const fn with_listing_timeout(mut self, timeout: Duration) -> Self {
        self.listing_timeout = timeout;
        self
    }

    /// Timeout for a single metadata probe (name, timestamps, size, header bytes).
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub const fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Timeout for reading a whole file.
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub const fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Timeout applied to every call against a remote backend.
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub const fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// Files above this size are never decoded for a thumbnail.
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub const fn with_max_thumbnail_source_bytes(mut self, bytes: u64) -> Self {
        self.max_thumbnail_source_bytes = bytes;
        self
    }

    /// Files above this size are never loaded into memory by
    /// [`FileService::content`](crate::FileService::content). Streaming through
    /// [`FileService::open`](crate::FileService::open) is not capped.
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub const fn with_max_download_bytes(mut self, bytes: u64) -> Self {
        self.max_download_bytes = bytes;
        self
    }

    /// How many leading bytes are read to sniff a file's image type. Values
    /// below [`MIN_SNIFF_LEN`] are raised to it.
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub const fn with_sniff_len(mut self, len: usize) -> Self {
        self.sniff_len = if len < MIN_SNIFF_LEN { MIN_SNIFF_LEN } else { len };
        self
    }

    #[inline]
    #[must_use]
    pub const fn listing_timeout(&self) -> Duration {
        self.listing_timeout
    }

    #[inline]
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    #[inline]
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    #[inline]
    #[must_use]
    pub const fn remote_timeout(&self) -> Duration {
        self.remote_timeout
    }

    #[inline]
    #[must_use]
    pub const fn max_thumbnail_source_bytes(&self) -> u64 {
        self.max_thumbnail_source_bytes
    }

    #[inline]
    #[must_use]
    pub const fn max_download_bytes(&self) -> u64 {
        self.max_download_bytes
    }

    #[inline]
    #[must_use]
    pub const fn sniff_len(&self) -> usize {
        self.sniff_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniff_len_never_drops_below_the_longest_signature() {
        assert_eq!(ExplorerOptions::default().with_sniff_len(4).sniff_len(), MIN_SNIFF_LEN);
        assert_eq!(ExplorerOptions::default().with_sniff_len(64).sniff_len(), 64);
    }

    #[test]
    fn download_cap_is_independent_of_the_thumbnail_cap() {
        let options = ExplorerOptions::default().with_max_thumbnail_source_bytes(32);
        assert_eq!(options.max_thumbnail_source_bytes(), 32);
        assert_eq!(options.max_download_bytes(), MIB * 1024);
    }
}
