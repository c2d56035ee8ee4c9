//! Directory browser transitions over a [`RemoteFsService`].
//!
//! The controller owns the [`NavigationState`] and the displayed listing. Every mutation is
//! followed by a re-resolve of the current directory; the cached listing is never edited in place.
//! Navigation failures leave the breadcrumb at its last resolved value.

use std::{
    cell::{Cell, RefCell},
    future::Future,
};

use leptos::logging::{log, warn};
use remote_fs_host::{
    DirectoryEntry, DirectoryListing, DownloadedFile, EntryId, ErrorKind, RemoteFsConfig,
    RemoteFsError, RemoteFsService, UploadSource, DEFAULT_UPLOAD_CHUNK_SIZE,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::navigation::{AtRoot, NavigationFrame, NavigationState};
use crate::upload::{ChunkedUploadSession, UploadError, UploadTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// What put the browser into [`BrowserState::Error`].
pub enum FailureKind {
    /// A remote call failed.
    Remote(ErrorKind),
    /// An upload stopped at the given chunk.
    UploadFailed {
        /// Index of the failed chunk.
        at_chunk: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Error payload shown by the browser.
pub struct BrowserFailure {
    /// Failure category.
    pub kind: FailureKind,
    /// Human-readable detail.
    pub message: String,
}

impl BrowserFailure {
    fn remote(err: &RemoteFsError) -> Self {
        Self {
            kind: FailureKind::Remote(err.kind()),
            message: err.message().to_string(),
        }
    }

    fn upload(err: &UploadError) -> Self {
        Self {
            kind: FailureKind::UploadFailed {
                at_chunk: err.at_chunk,
            },
            message: err.reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Observable browser state.
pub enum BrowserState {
    /// Nothing selected yet.
    #[default]
    Idle,
    /// A transition is waiting on the server.
    Loading,
    /// The current directory's listing.
    Loaded(DirectoryListing),
    /// The last transition failed. See [`DirectoryBrowserController::stale_listing`].
    Error(BrowserFailure),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Side navigation contents.
pub struct SideMenu {
    /// Root directories.
    pub roots: Vec<DirectoryEntry>,
    /// User-pinned directories.
    pub favourites: Vec<DirectoryEntry>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reasons a controller call did not complete.
pub enum BrowserError {
    /// Another transition is still in flight.
    #[error("another operation is still in progress")]
    Busy,
    /// No directory has been selected.
    #[error("no directory selected")]
    NoDirectory,
    /// Tried to open a file.
    #[error("{0} is not a directory")]
    NotADirectory(String),
    /// Tried to download a directory.
    #[error("{0} is not a file")]
    NotAFile(String),
    /// Breadcrumb index past the end of the stack.
    #[error("breadcrumb index {index} out of range for {len} frames")]
    BreadcrumbOutOfRange {
        /// Requested index.
        index: usize,
        /// Stack length.
        len: usize,
    },
    /// Ascend requested at the root.
    #[error(transparent)]
    AtRoot(#[from] AtRoot),
    /// A remote call failed.
    #[error(transparent)]
    Remote(#[from] RemoteFsError),
    /// An upload stopped early.
    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl BrowserError {
    /// Remote error kind behind this error, if any.
    pub fn remote_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Remote(err) => Some(err.kind()),
            Self::Upload(err) => err.remote_kind(),
            _ => None,
        }
    }
}

struct InFlight<'a> {
    busy: &'a Cell<bool>,
    navigation: &'a RefCell<NavigationState>,
    state: &'a RefCell<BrowserState>,
    upload: &'a RefCell<Option<UploadTask>>,
    restore: Option<(NavigationState, BrowserState)>,
}

impl InFlight<'_> {
    fn settle(mut self) {
        self.restore = None;
    }
}

impl Drop for InFlight<'_> {
    // Runs on completion and when the caller drops the transition mid-flight; only the latter
    // still carries a snapshot to restore.
    fn drop(&mut self) {
        if let Some((navigation, state)) = self.restore.take() {
            *self.navigation.borrow_mut() = navigation;
            *self.state.borrow_mut() = state;
            self.upload.borrow_mut().take();
        }
        self.busy.set(false);
    }
}

/// Stateful directory browser: one transition at a time against one navigation stack.
pub struct DirectoryBrowserController<S> {
    service: S,
    chunk_size: u64,
    navigation: RefCell<NavigationState>,
    state: RefCell<BrowserState>,
    last_listing: RefCell<Option<DirectoryListing>>,
    side_menu: RefCell<SideMenu>,
    upload: RefCell<Option<UploadTask>>,
    busy: Cell<bool>,
}

impl<S: RemoteFsService> DirectoryBrowserController<S> {
    /// Creates an idle controller using the default upload chunk size.
    pub fn new(service: S) -> Self {
        Self::with_chunk_size(service, DEFAULT_UPLOAD_CHUNK_SIZE)
    }

    /// Creates an idle controller configured from `config`.
    pub fn with_config(service: S, config: &RemoteFsConfig) -> Self {
        Self::with_chunk_size(service, config.clone().sanitized().upload_chunk_size)
    }

    fn with_chunk_size(service: S, chunk_size: u64) -> Self {
        Self {
            service,
            chunk_size,
            navigation: RefCell::new(NavigationState::new()),
            state: RefCell::new(BrowserState::Idle),
            last_listing: RefCell::new(None),
            side_menu: RefCell::new(SideMenu::default()),
            upload: RefCell::new(None),
            busy: Cell::new(false),
        }
    }

    /// The wrapped service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Upload chunk size in bytes.
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Snapshot of the browser state.
    pub fn state(&self) -> BrowserState {
        self.state.borrow().clone()
    }

    /// Snapshot of the navigation stack.
    pub fn navigation(&self) -> NavigationState {
        self.navigation.borrow().clone()
    }

    /// Breadcrumb labels, root first.
    pub fn breadcrumb(&self) -> Vec<String> {
        self.navigation
            .borrow()
            .breadcrumb_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Current directory frame.
    pub fn current(&self) -> Option<NavigationFrame> {
        self.navigation.borrow().current().cloned()
    }

    /// Listing currently shown as up to date.
    pub fn listing(&self) -> Option<DirectoryListing> {
        match &*self.state.borrow() {
            BrowserState::Loaded(listing) => Some(listing.clone()),
            _ => None,
        }
    }

    /// Last good listing, while the browser shows an error.
    pub fn stale_listing(&self) -> Option<DirectoryListing> {
        if matches!(*self.state.borrow(), BrowserState::Error(_)) {
            self.last_listing.borrow().clone()
        } else {
            None
        }
    }

    /// Most recently loaded side menu.
    pub fn side_menu(&self) -> SideMenu {
        self.side_menu.borrow().clone()
    }

    /// Progress of the running upload.
    pub fn upload_progress(&self) -> Option<UploadTask> {
        self.upload.borrow().clone()
    }

    /// Returns `true` while a transition is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    /// Fetches roots, then favourites.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Busy`] or the failing remote call's error.
    pub async fn load_side_menu(&self) -> Result<SideMenu, BrowserError> {
        self.exclusive(async {
            let roots = self.service.list_roots().await.map_err(|e| self.fail(e))?;
            let favourites = self
                .service
                .list_favourites()
                .await
                .map_err(|e| self.fail(e))?;
            let menu = SideMenu { roots, favourites };
            *self.side_menu.borrow_mut() = menu.clone();
            Ok(menu)
        })
        .await
    }

    /// Shows `root` as the new single-frame breadcrumb once it resolves.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::NotADirectory`] for file entries and the remote error on failure;
    /// the stack is left as it was.
    pub async fn select_root(&self, root: &DirectoryEntry) -> Result<(), BrowserError> {
        if !root.is_directory {
            return Err(BrowserError::NotADirectory(root.name.clone()));
        }
        self.exclusive(async {
            self.set_state(BrowserState::Loading);
            let listing = self
                .service
                .resolve_directory(&root.id)
                .await
                .map_err(|e| self.fail(e))?;
            self.navigation
                .borrow_mut()
                .reset_to(NavigationFrame::from(root));
            self.show(listing);
            Ok(())
        })
        .await
    }

    /// Descends into a child directory of the current one.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::NotADirectory`], [`BrowserError::NoDirectory`], or the remote
    /// error; on remote failure the pushed frame is rolled back.
    pub async fn open(&self, entry: &DirectoryEntry) -> Result<(), BrowserError> {
        if !entry.is_directory {
            return Err(BrowserError::NotADirectory(entry.name.clone()));
        }
        self.exclusive(async {
            self.current_id()?;
            self.set_state(BrowserState::Loading);
            let depth = {
                let mut navigation = self.navigation.borrow_mut();
                navigation.descend_into(NavigationFrame::from(entry));
                navigation.len()
            };
            match self.service.resolve_directory(&entry.id).await {
                Ok(listing) => {
                    self.show(listing);
                    Ok(())
                }
                Err(err) => {
                    self.navigation.borrow_mut().truncate_to(depth - 2);
                    Err(self.fail(err))
                }
            }
        })
        .await
    }

    /// Jumps back to breadcrumb `index`. The stack is cut only after the target resolves.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::BreadcrumbOutOfRange`] or the remote error.
    pub async fn navigate_to_breadcrumb(&self, index: usize) -> Result<(), BrowserError> {
        self.exclusive(self.resolve_breadcrumb(index)).await
    }

    /// Moves to the parent directory.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::AtRoot`] at the root, [`BrowserError::NoDirectory`] before any
    /// root is selected, or the remote error.
    pub async fn ascend(&self) -> Result<(), BrowserError> {
        self.exclusive(async {
            let len = self.navigation.borrow().len();
            match len {
                0 => Err(BrowserError::NoDirectory),
                1 => Err(AtRoot.into()),
                _ => self.resolve_breadcrumb(len - 2).await,
            }
        })
        .await
    }

    /// Re-resolves the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::NoDirectory`] or the remote error.
    pub async fn refresh(&self) -> Result<(), BrowserError> {
        self.exclusive(self.resync()).await
    }

    /// Creates a subdirectory of the current directory, then refreshes.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::NoDirectory`] or the remote error.
    pub async fn create_directory(&self, name: &str) -> Result<(), BrowserError> {
        self.exclusive(async {
            let parent = self.current_id()?;
            self.set_state(BrowserState::Loading);
            self.service
                .create_directory(&parent, name)
                .await
                .map_err(|e| self.fail(e))?;
            self.resync().await
        })
        .await
    }

    /// Creates an empty file in the current directory, then refreshes.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::NoDirectory`] or the remote error.
    pub async fn create_file(&self, name: &str) -> Result<(), BrowserError> {
        self.exclusive(async {
            let parent = self.current_id()?;
            self.set_state(BrowserState::Loading);
            self.service
                .create_file(&parent, name)
                .await
                .map_err(|e| self.fail(e))?;
            self.resync().await
        })
        .await
    }

    /// Deletes `entry`, then refreshes. An entry that is already gone counts as deleted.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::NoDirectory`] or any remote error other than not-found.
    pub async fn delete_entry(&self, entry: &DirectoryEntry) -> Result<(), BrowserError> {
        self.exclusive(async {
            self.current_id()?;
            self.set_state(BrowserState::Loading);
            match self.service.delete_entry(&entry.id, entry.kind()).await {
                Ok(()) => {}
                Err(RemoteFsError::NotFound(message)) => {
                    log!("delete of {} treated as done: {message}", entry.name);
                }
                Err(err) => return Err(self.fail(err)),
            }
            self.resync().await
        })
        .await
    }

    /// Uploads `source` into the current directory in chunks, then refreshes regardless of the
    /// outcome.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Upload`] when a chunk failed; the state then shows the failed
    /// chunk with the refreshed listing as stale. Returns the refresh error when only the
    /// refresh failed.
    pub async fn upload(&self, source: &dyn UploadSource) -> Result<UploadTask, BrowserError> {
        self.exclusive(async {
            let directory = self.current_id()?;
            self.set_state(BrowserState::Loading);
            let session =
                ChunkedUploadSession::new(&self.service, source, directory, self.chunk_size);
            *self.upload.borrow_mut() = Some(session.task().clone());
            let outcome = session
                .run(|task| *self.upload.borrow_mut() = Some(task.clone()))
                .await;
            self.upload.borrow_mut().take();

            let refreshed = self.resync().await;
            match outcome {
                Ok(task) => {
                    log!(
                        "uploaded {} ({} bytes in {} chunks)",
                        task.file_name,
                        task.total_size,
                        task.chunks_sent
                    );
                    refreshed.map(|()| task)
                }
                Err(err) => {
                    warn!("upload of {} failed: {err}", source.file_name());
                    if let Err(refresh_err) = refreshed {
                        warn!("refresh after failed upload also failed: {refresh_err}");
                    }
                    self.set_state(BrowserState::Error(BrowserFailure::upload(&err)));
                    Err(err.into())
                }
            }
        })
        .await
    }

    /// Downloads a file entry. The listing is left as it is.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::NotAFile`] for directories, or the remote error.
    pub async fn download(&self, entry: &DirectoryEntry) -> Result<DownloadedFile, BrowserError> {
        if entry.is_directory {
            return Err(BrowserError::NotAFile(entry.name.clone()));
        }
        self.exclusive(async {
            self.service
                .download_file(&entry.id)
                .await
                .map_err(|e| self.fail(e))
        })
        .await
    }

    async fn exclusive<T>(
        &self,
        transition: impl Future<Output = Result<T, BrowserError>>,
    ) -> Result<T, BrowserError> {
        if self.busy.replace(true) {
            return Err(BrowserError::Busy);
        }
        let guard = InFlight {
            busy: &self.busy,
            navigation: &self.navigation,
            state: &self.state,
            upload: &self.upload,
            restore: Some((self.navigation(), self.state())),
        };
        let result = transition.await;
        guard.settle();
        result
    }

    async fn resolve_breadcrumb(&self, index: usize) -> Result<(), BrowserError> {
        let target = {
            let navigation = self.navigation.borrow();
            navigation
                .frames()
                .get(index)
                .map(|frame| frame.id.clone())
                .ok_or(BrowserError::BreadcrumbOutOfRange {
                    index,
                    len: navigation.len(),
                })?
        };
        self.set_state(BrowserState::Loading);
        let listing = self
            .service
            .resolve_directory(&target)
            .await
            .map_err(|e| self.fail(e))?;
        self.navigation.borrow_mut().truncate_to(index);
        self.show(listing);
        Ok(())
    }

    async fn resync(&self) -> Result<(), BrowserError> {
        let current = self.current_id()?;
        self.set_state(BrowserState::Loading);
        let listing = self
            .service
            .resolve_directory(&current)
            .await
            .map_err(|e| self.fail(e))?;
        self.show(listing);
        Ok(())
    }

    fn current_id(&self) -> Result<EntryId, BrowserError> {
        self.navigation
            .borrow()
            .current()
            .map(|frame| frame.id.clone())
            .ok_or(BrowserError::NoDirectory)
    }

    fn set_state(&self, state: BrowserState) {
        *self.state.borrow_mut() = state;
    }

    fn show(&self, listing: DirectoryListing) {
        *self.last_listing.borrow_mut() = Some(listing.clone());
        self.set_state(BrowserState::Loaded(listing));
    }

    fn fail(&self, err: RemoteFsError) -> BrowserError {
        warn!("remote filesystem call failed: {err}");
        self.set_state(BrowserState::Error(BrowserFailure::remote(&err)));
        BrowserError::Remote(err)
    }
}
