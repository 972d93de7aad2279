use std::future::Future;
use std::io;
use std::time::SystemTime;

use crate::Error;

/// Read-only metadata for one logical file held by a backing store.
///
/// Implementations are snapshots: the values must not change while a single
/// response is being prepared and streamed.
pub trait FileDescriptor {
    /// Total size in bytes, or `None` when the store cannot tell.
    fn size(&self) -> Option<u64>;

    fn mime_type(&self) -> Option<&str>;

    fn last_modified(&self) -> Option<SystemTime>;

    /// SHA-256 digest of the full content, if the store keeps one.
    fn checksum(&self) -> Option<&[u8]>;

    /// A URL the bytes can be fetched from directly. Must support `Range`.
    fn source_url(&self) -> &str;

    /// Display name, used for `Content-Disposition`.
    fn filename(&self) -> &str;
}

/// Implements [`FileDescriptor`] over values supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    size: Option<u64>,
    mime_type: Option<String>,
    last_modified: Option<SystemTime>,
    checksum: Option<Vec<u8>>,
    source_url: String,
    filename: String,
}

impl StoredFile {
    /// Construct a [`StoredFile`] for the object stored under `path` and
    /// reachable at `source_url`. The filename is the last path segment.
    pub fn new(path: &str, source_url: impl Into<String>) -> Self {
        let filename = path.rsplit('/').next().unwrap_or(path).to_string();
        StoredFile {
            size: None,
            mime_type: None,
            last_modified: None,
            checksum: None,
            source_url: source_url.into(),
            filename,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_last_modified(mut self, last_modified: SystemTime) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    pub fn with_checksum(mut self, checksum: impl Into<Vec<u8>>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    /// Guesses the MIME type from the filename extension when the store did
    /// not report one.
    pub fn guess_mime_type(mut self) -> Self {
        if self.mime_type.is_none() {
            self.mime_type = mime_guess::from_path(&self.filename)
                .first()
                .map(|mime| mime.essence_str().to_string());
        }
        self
    }
}

impl FileDescriptor for StoredFile {
    fn size(&self) -> Option<u64> {
        self.size
    }

    fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    fn last_modified(&self) -> Option<SystemTime> {
        self.last_modified
    }

    fn checksum(&self) -> Option<&[u8]> {
        self.checksum.as_deref()
    }

    fn source_url(&self) -> &str {
        &self.source_url
    }

    fn filename(&self) -> &str {
        &self.filename
    }
}

/// A storage backend able to describe the files it holds.
pub trait Disk: Send + Sync {
    /// Returns `None` when nothing is stored under `path`.
    fn stat(&self, path: &str) -> impl Future<Output = io::Result<Option<StoredFile>>> + Send;
}

/// Looks `path` up on `disk`, failing with [`Error::NotFound`] when it does
/// not exist.
pub async fn file<D: Disk + ?Sized>(disk: &D, path: &str) -> Result<StoredFile, Error> {
    match disk.stat(path).await? {
        Some(stored) => Ok(stored.guess_mime_type()),
        None => Err(Error::NotFound(path.to_string())),
    }
}
