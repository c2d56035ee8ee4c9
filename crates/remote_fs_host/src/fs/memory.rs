//! In-memory remote filesystem backend for tests, demos, and offline previews.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    rc::Rc,
};

use futures::channel::oneshot;

use super::error::{RemoteFsError, RemoteFsResult};
use super::service::{validate_entry_name, RemoteFsFuture, RemoteFsService};
use super::types::{DirectoryEntry, DirectoryListing, DownloadedFile, EntryId, EntryKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Operation discriminant used for failure injection and call counting.
pub enum RemoteFsOp {
    /// [`RemoteFsService::list_roots`]
    ListRoots,
    /// [`RemoteFsService::list_favourites`]
    ListFavourites,
    /// [`RemoteFsService::resolve_directory`]
    ResolveDirectory,
    /// [`RemoteFsService::create_directory`]
    CreateDirectory,
    /// [`RemoteFsService::create_file`]
    CreateFile,
    /// [`RemoteFsService::delete_entry`]
    DeleteEntry,
    /// [`RemoteFsService::upload_chunk`]
    UploadChunk,
    /// [`RemoteFsService::download_file`]
    DownloadFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Recorded call against a [`MemoryRemoteFsService`], in issue order.
pub enum RemoteFsCall {
    /// Roots were listed.
    ListRoots,
    /// Favourites were listed.
    ListFavourites,
    /// A directory was resolved.
    ResolveDirectory(EntryId),
    /// A directory creation was requested.
    CreateDirectory {
        /// Parent directory.
        parent: EntryId,
        /// Requested name.
        name: String,
    },
    /// A file creation was requested.
    CreateFile {
        /// Parent directory.
        parent: EntryId,
        /// Requested name.
        name: String,
    },
    /// A delete was requested.
    DeleteEntry {
        /// Entry to delete.
        id: EntryId,
        /// Entry kind supplied by the caller.
        kind: EntryKind,
    },
    /// An upload chunk was sent.
    UploadChunk {
        /// Target directory.
        directory: EntryId,
        /// Target file name.
        file_name: String,
        /// Chunk payload.
        bytes: Vec<u8>,
    },
    /// A download was requested.
    DownloadFile(EntryId),
}

impl RemoteFsCall {
    /// Returns the operation discriminant of the call.
    pub fn op(&self) -> RemoteFsOp {
        match self {
            Self::ListRoots => RemoteFsOp::ListRoots,
            Self::ListFavourites => RemoteFsOp::ListFavourites,
            Self::ResolveDirectory(_) => RemoteFsOp::ResolveDirectory,
            Self::CreateDirectory { .. } => RemoteFsOp::CreateDirectory,
            Self::CreateFile { .. } => RemoteFsOp::CreateFile,
            Self::DeleteEntry { .. } => RemoteFsOp::DeleteEntry,
            Self::UploadChunk { .. } => RemoteFsOp::UploadChunk,
            Self::DownloadFile(_) => RemoteFsOp::DownloadFile,
        }
    }
}

#[derive(Debug)]
/// Handle holding back one pending call until released (or dropped).
pub struct MemoryHold {
    release: oneshot::Sender<()>,
}

impl MemoryHold {
    /// Lets the held call proceed.
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

#[derive(Debug, Clone)]
struct MemoryNode {
    id: EntryId,
    name: String,
    parent: Option<EntryId>,
    is_directory: bool,
    content: Vec<u8>,
}

#[derive(Debug, Default)]
struct MemoryFsState {
    next_id: u64,
    nodes: Vec<MemoryNode>,
    roots: Vec<EntryId>,
    favourites: Vec<EntryId>,
    calls: Vec<RemoteFsCall>,
    failures: VecDeque<(RemoteFsOp, RemoteFsError)>,
    upload_failures: HashMap<usize, RemoteFsError>,
    uploads_seen: usize,
    holds: Vec<(RemoteFsOp, oneshot::Receiver<()>)>,
}

impl MemoryFsState {
    fn allocate_id(&mut self) -> EntryId {
        self.next_id += 1;
        EntryId::Text(format!("mem-{}", self.next_id))
    }

    fn node(&self, id: &EntryId) -> Option<&MemoryNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    fn directory(&self, id: &EntryId) -> RemoteFsResult<&MemoryNode> {
        self.node(id)
            .filter(|node| node.is_directory)
            .ok_or_else(|| RemoteFsError::NotFound(format!("directory {id} does not exist")))
    }

    fn child_named(&self, parent: &EntryId, name: &str) -> Option<&MemoryNode> {
        self.nodes
            .iter()
            .find(|node| node.parent.as_ref() == Some(parent) && node.name == name)
    }

    fn insert(&mut self, parent: Option<EntryId>, name: &str, is_directory: bool) -> EntryId {
        let id = self.allocate_id();
        self.nodes.push(MemoryNode {
            id: id.clone(),
            name: name.to_string(),
            parent,
            is_directory,
            content: Vec::new(),
        });
        id
    }

    fn create_child(
        &mut self,
        parent: &EntryId,
        name: &str,
        is_directory: bool,
    ) -> RemoteFsResult<()> {
        validate_entry_name(name)?;
        self.directory(parent)?;
        if self.child_named(parent, name).is_some() {
            return Err(RemoteFsError::Conflict(format!("{name} already exists")));
        }
        self.insert(Some(parent.clone()), name, is_directory);
        Ok(())
    }

    fn listing(&self, id: &EntryId) -> RemoteFsResult<DirectoryListing> {
        self.directory(id)?;
        let entries = self
            .nodes
            .iter()
            .filter(|node| node.parent.as_ref() == Some(id))
            .map(|node| {
                if node.is_directory {
                    return DirectoryEntry::directory(node.id.clone(), node.name.clone());
                }
                let mut entry = DirectoryEntry::file(node.id.clone(), node.name.clone());
                entry.size_bytes = Some(node.content.len() as u64);
                entry
            })
            .collect();
        Ok(DirectoryListing { entries })
    }

    fn refs(&self, ids: &[EntryId]) -> Vec<DirectoryEntry> {
        ids.iter()
            .filter_map(|id| self.node(id))
            .map(|node| DirectoryEntry::directory(node.id.clone(), node.name.clone()))
            .collect()
    }

    fn delete(&mut self, id: &EntryId) -> RemoteFsResult<()> {
        if self.node(id).is_none() {
            return Err(RemoteFsError::NotFound(format!("entry {id} does not exist")));
        }
        let mut doomed = vec![id.clone()];
        let mut idx = 0;
        while idx < doomed.len() {
            let current = doomed[idx].clone();
            doomed.extend(
                self.nodes
                    .iter()
                    .filter(|node| node.parent.as_ref() == Some(&current))
                    .map(|node| node.id.clone()),
            );
            idx += 1;
        }
        self.nodes.retain(|node| !doomed.contains(&node.id));
        self.roots.retain(|root| !doomed.contains(root));
        self.favourites.retain(|fav| !doomed.contains(fav));
        Ok(())
    }

    fn append_chunk(
        &mut self,
        directory: &EntryId,
        file_name: &str,
        bytes: &[u8],
    ) -> RemoteFsResult<()> {
        validate_entry_name(file_name)?;
        self.directory(directory)?;
        let existing = self
            .child_named(directory, file_name)
            .map(|node| (node.id.clone(), node.is_directory));
        let id = match existing {
            Some((_, true)) => {
                return Err(RemoteFsError::Conflict(format!(
                    "{file_name} is a directory"
                )))
            }
            Some((id, false)) => id,
            None => self.insert(Some(directory.clone()), file_name, false),
        };
        if let Some(node) = self.nodes.iter_mut().find(|node| node.id == id) {
            node.content.extend_from_slice(bytes);
        }
        Ok(())
    }

    fn download(&self, id: &EntryId) -> RemoteFsResult<DownloadedFile> {
        let node = self
            .node(id)
            .filter(|node| !node.is_directory)
            .ok_or_else(|| RemoteFsError::NotFound(format!("file {id} does not exist")))?;
        Ok(DownloadedFile {
            filename: node.name.clone(),
            bytes: node.content.clone(),
        })
    }
}

struct PendingCall {
    gate: Option<oneshot::Receiver<()>>,
    failure: Option<RemoteFsError>,
}

impl PendingCall {
    async fn ready(self) -> RemoteFsResult<()> {
        if let Some(gate) = self.gate {
            let _ = gate.await;
        }
        match self.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory remote filesystem with call recording, failure injection, and call holds.
///
/// Clones share the same tree, so a test can keep a handle while a controller owns another.
/// Uploads append to an existing file of the same name, or create it on the first chunk.
pub struct MemoryRemoteFsService {
    inner: Rc<RefCell<MemoryFsState>>,
}

impl MemoryRemoteFsService {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a root directory.
    pub fn add_root(&self, name: &str) -> EntryId {
        let mut state = self.inner.borrow_mut();
        let id = state.insert(None, name, true);
        state.roots.push(id.clone());
        id
    }

    /// Marks an existing directory as favourite.
    pub fn add_favourite(&self, id: &EntryId) {
        self.inner.borrow_mut().favourites.push(id.clone());
    }

    /// Adds a directory under `parent` without recording a call.
    pub fn add_directory(&self, parent: &EntryId, name: &str) -> EntryId {
        self.inner
            .borrow_mut()
            .insert(Some(parent.clone()), name, true)
    }

    /// Adds a file with content under `parent` without recording a call.
    pub fn add_file(&self, parent: &EntryId, name: &str, content: &[u8]) -> EntryId {
        let mut state = self.inner.borrow_mut();
        let id = state.insert(Some(parent.clone()), name, false);
        if let Some(node) = state.nodes.iter_mut().find(|node| node.id == id) {
            node.content = content.to_vec();
        }
        id
    }

    /// Looks up a child of `parent` by name.
    pub fn find_child(&self, parent: &EntryId, name: &str) -> Option<EntryId> {
        self.inner
            .borrow()
            .child_named(parent, name)
            .map(|node| node.id.clone())
    }

    /// Returns the content of a file node.
    pub fn file_content(&self, id: &EntryId) -> Option<Vec<u8>> {
        self.inner
            .borrow()
            .node(id)
            .filter(|node| !node.is_directory)
            .map(|node| node.content.clone())
    }

    /// Returns `true` when a node with `id` exists.
    pub fn contains(&self, id: &EntryId) -> bool {
        self.inner.borrow().node(id).is_some()
    }

    /// Makes the next call of `op` fail with `error`. Injected failures queue in order.
    pub fn fail_next(&self, op: RemoteFsOp, error: RemoteFsError) {
        self.inner.borrow_mut().failures.push_back((op, error));
    }

    /// Makes the upload call with zero-based sequence number `call_index` fail with `error`.
    pub fn fail_upload_call(&self, call_index: usize, error: RemoteFsError) {
        self.inner
            .borrow_mut()
            .upload_failures
            .insert(call_index, error);
    }

    /// Holds the next call of `op` pending until the returned handle is released or dropped.
    pub fn hold_next(&self, op: RemoteFsOp) -> MemoryHold {
        let (release, gate) = oneshot::channel();
        self.inner.borrow_mut().holds.push((op, gate));
        MemoryHold { release }
    }

    /// Returns all recorded calls in issue order.
    pub fn calls(&self) -> Vec<RemoteFsCall> {
        self.inner.borrow().calls.clone()
    }

    /// Counts recorded calls of `op`.
    pub fn call_count(&self, op: RemoteFsOp) -> usize {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter(|call| call.op() == op)
            .count()
    }

    /// Forgets recorded calls.
    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    fn begin(&self, call: RemoteFsCall) -> PendingCall {
        let mut state = self.inner.borrow_mut();
        let op = call.op();
        state.calls.push(call);

        let mut failure = state
            .failures
            .iter()
            .position(|(failing, _)| *failing == op)
            .and_then(|idx| state.failures.remove(idx))
            .map(|(_, err)| err);
        if op == RemoteFsOp::UploadChunk {
            let index = state.uploads_seen;
            state.uploads_seen += 1;
            if let Some(err) = state.upload_failures.remove(&index) {
                failure = Some(err);
            }
        }
        let gate = state
            .holds
            .iter()
            .position(|(held, _)| *held == op)
            .map(|idx| state.holds.remove(idx).1);

        PendingCall { gate, failure }
    }
}

impl RemoteFsService for MemoryRemoteFsService {
    fn list_roots<'a>(&'a self) -> RemoteFsFuture<'a, RemoteFsResult<Vec<DirectoryEntry>>> {
        let pending = self.begin(RemoteFsCall::ListRoots);
        Box::pin(async move {
            pending.ready().await?;
            let state = self.inner.borrow();
            Ok(state.refs(&state.roots))
        })
    }

    fn list_favourites<'a>(&'a self) -> RemoteFsFuture<'a, RemoteFsResult<Vec<DirectoryEntry>>> {
        let pending = self.begin(RemoteFsCall::ListFavourites);
        Box::pin(async move {
            pending.ready().await?;
            let state = self.inner.borrow();
            Ok(state.refs(&state.favourites))
        })
    }

    fn resolve_directory<'a>(
        &'a self,
        id: &'a EntryId,
    ) -> RemoteFsFuture<'a, RemoteFsResult<DirectoryListing>> {
        let pending = self.begin(RemoteFsCall::ResolveDirectory(id.clone()));
        Box::pin(async move {
            pending.ready().await?;
            self.inner.borrow().listing(id)
        })
    }

    fn create_directory<'a>(
        &'a self,
        parent: &'a EntryId,
        name: &'a str,
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>> {
        let pending = self.begin(RemoteFsCall::CreateDirectory {
            parent: parent.clone(),
            name: name.to_string(),
        });
        Box::pin(async move {
            pending.ready().await?;
            self.inner.borrow_mut().create_child(parent, name, true)
        })
    }

    fn create_file<'a>(
        &'a self,
        parent: &'a EntryId,
        name: &'a str,
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>> {
        let pending = self.begin(RemoteFsCall::CreateFile {
            parent: parent.clone(),
            name: name.to_string(),
        });
        Box::pin(async move {
            pending.ready().await?;
            self.inner.borrow_mut().create_child(parent, name, false)
        })
    }

    fn delete_entry<'a>(
        &'a self,
        id: &'a EntryId,
        kind: EntryKind,
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>> {
        let pending = self.begin(RemoteFsCall::DeleteEntry {
            id: id.clone(),
            kind,
        });
        Box::pin(async move {
            pending.ready().await?;
            self.inner.borrow_mut().delete(id)
        })
    }

    fn upload_chunk<'a>(
        &'a self,
        directory: &'a EntryId,
        file_name: &'a str,
        chunk: &'a [u8],
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>> {
        let pending = self.begin(RemoteFsCall::UploadChunk {
            directory: directory.clone(),
            file_name: file_name.to_string(),
            bytes: chunk.to_vec(),
        });
        Box::pin(async move {
            pending.ready().await?;
            self.inner
                .borrow_mut()
                .append_chunk(directory, file_name, chunk)
        })
    }

    fn download_file<'a>(
        &'a self,
        id: &'a EntryId,
    ) -> RemoteFsFuture<'a, RemoteFsResult<DownloadedFile>> {
        let pending = self.begin(RemoteFsCall::DownloadFile(id.clone()));
        Box::pin(async move {
            pending.ready().await?;
            self.inner.borrow().download(id)
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::{executor::block_on, FutureExt};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::fs::ErrorKind;

    #[test]
    fn memory_tree_lists_children_in_creation_order() {
        let fs = MemoryRemoteFsService::new();
        let root = fs.add_root("Home");
        let docs = fs.add_directory(&root, "Docs");
        let readme = fs.add_file(&root, "readme.md", b"# hi");

        let listing = block_on(fs.resolve_directory(&root)).expect("listing");
        let ids: Vec<EntryId> = listing.entries.iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec![docs, readme.clone()]);
        assert_eq!(listing.entries[1].size_bytes, Some(4));
        assert_eq!(fs.calls(), vec![RemoteFsCall::ResolveDirectory(root)]);

        let err = block_on(fs.resolve_directory(&readme)).expect_err("file is no directory");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn memory_create_rejects_duplicates_and_delete_is_recursive() {
        let fs = MemoryRemoteFsService::new();
        let root = fs.add_root("Home");
        block_on(fs.create_directory(&root, "Docs")).expect("create");
        let err = block_on(fs.create_file(&root, "Docs")).expect_err("duplicate");
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let docs = fs.find_child(&root, "Docs").expect("docs");
        let nested = fs.add_file(&docs, "a.txt", b"a");
        block_on(fs.delete_entry(&docs, EntryKind::Directory)).expect("delete");
        assert!(!fs.contains(&docs));
        assert!(!fs.contains(&nested));

        let err = block_on(fs.delete_entry(&docs, EntryKind::Directory)).expect_err("gone");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn memory_uploads_append_and_download_returns_content() {
        let fs = MemoryRemoteFsService::new();
        let root = fs.add_root("Home");
        block_on(fs.upload_chunk(&root, "data.bin", &[1, 2])).expect("chunk 0");
        block_on(fs.upload_chunk(&root, "data.bin", &[3])).expect("chunk 1");

        let id = fs.find_child(&root, "data.bin").expect("uploaded file");
        let file = block_on(fs.download_file(&id)).expect("download");
        assert_eq!(file.filename, "data.bin");
        assert_eq!(file.bytes, vec![1, 2, 3]);
        assert_eq!(fs.call_count(RemoteFsOp::UploadChunk), 2);
    }

    #[test]
    fn injected_failures_fire_once_per_matching_call() {
        let fs = MemoryRemoteFsService::new();
        let root = fs.add_root("Home");
        fs.fail_next(
            RemoteFsOp::ResolveDirectory,
            RemoteFsError::Unauthorized("nope".to_string()),
        );
        fs.fail_upload_call(1, RemoteFsError::Network("reset".to_string()));

        let err = block_on(fs.resolve_directory(&root)).expect_err("injected");
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        block_on(fs.resolve_directory(&root)).expect("second resolve succeeds");

        block_on(fs.upload_chunk(&root, "f", b"a")).expect("upload 0");
        let err = block_on(fs.upload_chunk(&root, "f", b"b")).expect_err("upload 1");
        assert_eq!(err.kind(), ErrorKind::NetworkError);
        let file = fs.find_child(&root, "f").expect("f");
        assert_eq!(fs.file_content(&file), Some(b"a".to_vec()));
    }

    #[test]
    fn held_calls_stay_pending_until_released() {
        let fs = MemoryRemoteFsService::new();
        let root = fs.add_root("Home");
        let hold = fs.hold_next(RemoteFsOp::ListRoots);

        let mut pending = fs.list_roots();
        assert!(pending.as_mut().now_or_never().is_none());
        hold.release();
        let roots = block_on(pending).expect("roots");
        assert_eq!(roots, vec![DirectoryEntry::directory(root, "Home")]);
    }
}
