//! Upload payload contracts.

use std::{future::Future, ops::Range, pin::Pin};

/// Object-safe boxed future used by [`UploadSource`].
pub type UploadSourceFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Random-access byte source for an upload (an in-memory buffer or a browser file handle).
pub trait UploadSource {
    /// File name the upload is stored under.
    fn file_name(&self) -> &str;

    /// Total payload size in bytes.
    fn len(&self) -> u64;

    /// Returns `true` for a zero-byte payload.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the bytes in `range`. Ranges never extend past [`Self::len`].
    fn read_range<'a>(
        &'a self,
        range: Range<u64>,
    ) -> UploadSourceFuture<'a, Result<Vec<u8>, String>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Upload payload held fully in memory.
pub struct MemoryUploadSource {
    file_name: String,
    bytes: Vec<u8>,
}

impl MemoryUploadSource {
    /// Creates an in-memory payload.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Returns the payload bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl UploadSource for MemoryUploadSource {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read_range<'a>(
        &'a self,
        range: Range<u64>,
    ) -> UploadSourceFuture<'a, Result<Vec<u8>, String>> {
        Box::pin(async move {
            let start = usize::try_from(range.start).map_err(|e| e.to_string())?;
            let end = usize::try_from(range.end).map_err(|e| e.to_string())?;
            self.bytes.get(start..end).map(<[u8]>::to_vec).ok_or_else(|| {
                format!(
                    "range {start}..{end} outside payload of {} bytes",
                    self.bytes.len()
                )
            })
        })
    }
}
