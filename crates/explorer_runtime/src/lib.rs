//! Navigation and synchronization engine of the remote filesystem explorer.
//!
//! [`DirectoryBrowserController`] owns a [`NavigationState`] breadcrumb and drives every
//! transition through a [`remote_fs_host::RemoteFsService`]: navigation resolves before the
//! breadcrumb changes, mutations are followed by a refresh, and uploads run through a
//! [`ChunkedUploadSession`]. Rendering is left to the embedding UI.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod controller;
pub mod navigation;
pub mod upload;

pub use controller::{
    BrowserError, BrowserFailure, BrowserState, DirectoryBrowserController, FailureKind, SideMenu,
};
pub use navigation::{AtRoot, NavigationFrame, NavigationState};
pub use upload::{ChunkedUploadSession, UploadError, UploadFailureReason, UploadTask};
