//! Upload payloads backed by browser `File` handles.

use std::ops::Range;

use remote_fs_host::{UploadSource, UploadSourceFuture};

use crate::bridge;

#[derive(Debug, Clone)]
/// [`UploadSource`] over a `File` picked by the user. Chunks are sliced lazily, so the whole
/// file is never held in memory.
pub struct WebFileUploadSource {
    file: web_sys::File,
    file_name: String,
    len: u64,
}

impl WebFileUploadSource {
    /// Wraps a picked file, keeping its name and size.
    pub fn new(file: web_sys::File) -> Self {
        let file_name = file.name();
        let len = file.size() as u64;
        Self {
            file,
            file_name,
            len,
        }
    }

    /// Stores the upload under `file_name` instead of the picked file's name.
    pub fn renamed(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// The wrapped file handle.
    pub fn file(&self) -> &web_sys::File {
        &self.file
    }
}

impl UploadSource for WebFileUploadSource {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn len(&self) -> u64 {
        self.len
    }

    fn read_range<'a>(
        &'a self,
        range: Range<u64>,
    ) -> UploadSourceFuture<'a, Result<Vec<u8>, String>> {
        Box::pin(async move {
            if range.end > self.len {
                return Err(format!(
                    "range {}..{} outside {} of {} bytes",
                    range.start, range.end, self.file_name, self.len
                ));
            }
            bridge::read_blob_range(&self.file, range).await
        })
    }
}
