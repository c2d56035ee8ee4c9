//! Remote filesystem service contracts.

use std::{future::Future, pin::Pin};

use super::error::RemoteFsResult;
use super::types::{DirectoryEntry, DirectoryListing, DownloadedFile, EntryId, EntryKind};
use super::RemoteFsError;

/// Object-safe boxed future used by [`RemoteFsService`] async methods.
pub type RemoteFsFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Stateless remote filesystem operations, one backend call each.
///
/// Implementations hold no state between calls and never recover errors locally.
pub trait RemoteFsService {
    /// Lists the top-level directories visible to the authenticated user.
    fn list_roots<'a>(&'a self) -> RemoteFsFuture<'a, RemoteFsResult<Vec<DirectoryEntry>>>;

    /// Lists user-pinned directories in server order.
    fn list_favourites<'a>(&'a self) -> RemoteFsFuture<'a, RemoteFsResult<Vec<DirectoryEntry>>>;

    /// Resolves a directory identifier into its current listing.
    fn resolve_directory<'a>(
        &'a self,
        id: &'a EntryId,
    ) -> RemoteFsFuture<'a, RemoteFsResult<DirectoryListing>>;

    /// Creates a directory named `name` inside `parent`.
    fn create_directory<'a>(
        &'a self,
        parent: &'a EntryId,
        name: &'a str,
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>>;

    /// Creates an empty file named `name` inside `parent`.
    fn create_file<'a>(
        &'a self,
        parent: &'a EntryId,
        name: &'a str,
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>>;

    /// Deletes a file or directory.
    fn delete_entry<'a>(
        &'a self,
        id: &'a EntryId,
        kind: EntryKind,
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>>;

    /// Sends one chunk of `file_name` into `directory`. The server appends chunks in arrival
    /// order.
    fn upload_chunk<'a>(
        &'a self,
        directory: &'a EntryId,
        file_name: &'a str,
        chunk: &'a [u8],
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>>;

    /// Downloads a file's content.
    fn download_file<'a>(
        &'a self,
        id: &'a EntryId,
    ) -> RemoteFsFuture<'a, RemoteFsResult<DownloadedFile>>;
}

/// Rejects empty or whitespace-only entry names before any request is issued.
///
/// # Errors
///
/// Returns [`RemoteFsError::Invalid`] for empty names.
pub fn validate_entry_name(name: &str) -> RemoteFsResult<()> {
    if name.trim().is_empty() {
        return Err(RemoteFsError::Invalid("name must not be empty".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op remote filesystem adapter for unsupported targets and baseline tests.
pub struct NoopRemoteFsService;

impl NoopRemoteFsService {
    fn unavailable<T>(op: &str) -> RemoteFsResult<T> {
        Err(RemoteFsError::Network(format!(
            "remote filesystem unavailable: {op}"
        )))
    }
}

impl RemoteFsService for NoopRemoteFsService {
    fn list_roots<'a>(&'a self) -> RemoteFsFuture<'a, RemoteFsResult<Vec<DirectoryEntry>>> {
        Box::pin(async { Self::unavailable("list_roots") })
    }

    fn list_favourites<'a>(&'a self) -> RemoteFsFuture<'a, RemoteFsResult<Vec<DirectoryEntry>>> {
        Box::pin(async { Self::unavailable("list_favourites") })
    }

    fn resolve_directory<'a>(
        &'a self,
        _id: &'a EntryId,
    ) -> RemoteFsFuture<'a, RemoteFsResult<DirectoryListing>> {
        Box::pin(async { Self::unavailable("resolve_directory") })
    }

    fn create_directory<'a>(
        &'a self,
        _parent: &'a EntryId,
        _name: &'a str,
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>> {
        Box::pin(async { Self::unavailable("create_directory") })
    }

    fn create_file<'a>(
        &'a self,
        _parent: &'a EntryId,
        _name: &'a str,
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>> {
        Box::pin(async { Self::unavailable("create_file") })
    }

    fn delete_entry<'a>(
        &'a self,
        _id: &'a EntryId,
        _kind: EntryKind,
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>> {
        Box::pin(async { Self::unavailable("delete_entry") })
    }

    fn upload_chunk<'a>(
        &'a self,
        _directory: &'a EntryId,
        _file_name: &'a str,
        _chunk: &'a [u8],
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>> {
        Box::pin(async { Self::unavailable("upload_chunk") })
    }

    fn download_file<'a>(
        &'a self,
        _id: &'a EntryId,
    ) -> RemoteFsFuture<'a, RemoteFsResult<DownloadedFile>> {
        Box::pin(async { Self::unavailable("download_file") })
    }
}
