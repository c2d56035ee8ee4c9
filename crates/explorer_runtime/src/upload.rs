//! Sequential chunked upload of one payload into one directory.

use std::ops::Range;

use remote_fs_host::{
    EntryId, ErrorKind, RemoteFsError, RemoteFsService, UploadSource, DEFAULT_UPLOAD_CHUNK_SIZE,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Progress snapshot of an upload. Never persisted; a failed upload restarts from chunk 0.
pub struct UploadTask {
    /// Name the file is stored under.
    pub file_name: String,
    /// Directory receiving the chunks.
    pub target_directory: EntryId,
    /// Payload size in bytes.
    pub total_size: u64,
    /// Upper bound of a chunk in bytes.
    pub chunk_size: u64,
    /// Chunks acknowledged by the server.
    pub chunks_sent: u64,
    /// Index of the chunk that stopped the upload.
    pub failed_at_chunk: Option<u64>,
}

impl UploadTask {
    /// Number of chunks the payload splits into. A zero-byte payload still takes one (empty)
    /// chunk so the file gets created.
    pub fn total_chunks(&self) -> u64 {
        self.total_size.div_ceil(self.chunk_size).max(1)
    }

    /// Byte range of chunk `index`.
    pub fn chunk_range(&self, index: u64) -> Range<u64> {
        let start = index.saturating_mul(self.chunk_size).min(self.total_size);
        let end = start.saturating_add(self.chunk_size).min(self.total_size);
        start..end
    }

    /// Bytes acknowledged so far.
    pub fn bytes_sent(&self) -> u64 {
        self.chunks_sent
            .saturating_mul(self.chunk_size)
            .min(self.total_size)
    }

    /// Returns `true` once every chunk was acknowledged.
    pub fn is_complete(&self) -> bool {
        self.failed_at_chunk.is_none() && self.chunks_sent == self.total_chunks()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Cause of a stopped upload.
pub enum UploadFailureReason {
    /// The local payload could not be read.
    #[error("payload read failed: {0}")]
    Source(String),
    /// The server rejected the chunk or could not be reached.
    #[error(transparent)]
    Remote(#[from] RemoteFsError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("upload failed at chunk {at_chunk}: {reason}")]
/// Upload stopped at `at_chunk`. Chunks before it stay applied on the server.
pub struct UploadError {
    /// Index of the failed chunk.
    pub at_chunk: u64,
    /// What went wrong.
    pub reason: UploadFailureReason,
}

impl UploadError {
    /// Remote error kind, when the server side failed.
    pub fn remote_kind(&self) -> Option<ErrorKind> {
        match &self.reason {
            UploadFailureReason::Remote(err) => Some(err.kind()),
            UploadFailureReason::Source(_) => None,
        }
    }
}

/// Drives one upload: reads chunk `i`, sends it, awaits the acknowledgement, then moves on.
///
/// The first failure ends the session; there is no retry, skip, or cancellation.
pub struct ChunkedUploadSession<'a> {
    service: &'a dyn RemoteFsService,
    source: &'a dyn UploadSource,
    task: UploadTask,
}

impl<'a> ChunkedUploadSession<'a> {
    /// Prepares an upload of `source` into `target_directory`. A zero `chunk_size` falls back to
    /// [`DEFAULT_UPLOAD_CHUNK_SIZE`].
    pub fn new(
        service: &'a dyn RemoteFsService,
        source: &'a dyn UploadSource,
        target_directory: EntryId,
        chunk_size: u64,
    ) -> Self {
        let chunk_size = if chunk_size == 0 {
            DEFAULT_UPLOAD_CHUNK_SIZE
        } else {
            chunk_size
        };
        Self {
            service,
            source,
            task: UploadTask {
                file_name: source.file_name().to_string(),
                target_directory,
                total_size: source.len(),
                chunk_size,
                chunks_sent: 0,
                failed_at_chunk: None,
            },
        }
    }

    /// Current progress.
    pub fn task(&self) -> &UploadTask {
        &self.task
    }

    /// Sends every chunk in order, reporting the task to `on_progress` after each acknowledged
    /// chunk and once more on failure.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError`] for the first chunk that could not be read or was rejected.
    pub async fn run(
        mut self,
        mut on_progress: impl FnMut(&UploadTask),
    ) -> Result<UploadTask, UploadError> {
        for index in 0..self.task.total_chunks() {
            if let Err(reason) = self.send_chunk(index).await {
                self.task.failed_at_chunk = Some(index);
                on_progress(&self.task);
                return Err(UploadError {
                    at_chunk: index,
                    reason,
                });
            }
            self.task.chunks_sent = index + 1;
            on_progress(&self.task);
        }
        Ok(self.task)
    }

    async fn send_chunk(&self, index: u64) -> Result<(), UploadFailureReason> {
        let bytes = self
            .source
            .read_range(self.task.chunk_range(index))
            .await
            .map_err(UploadFailureReason::Source)?;
        self.service
            .upload_chunk(&self.task.target_directory, &self.task.file_name, &bytes)
            .await?;
        Ok(())
    }
}
