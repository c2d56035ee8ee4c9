//! Browser (`wasm32`) implementations of the [`remote_fs_host`] contracts.
//!
//! Provides the `fetch` transport behind [`WebRemoteFsService`], lazy `File` slicing for chunked
//! uploads, Blob-based download saving, and a `localStorage` preference store. JS interop lives
//! in `bridge/`, with a non-wasm shim so the crate builds and tests on the host. The
//! `host-stub` feature swaps the adapters for no-op implementations.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time host-strategy selection and adapter factories.
pub mod adapters;
mod bridge;
pub mod fs;
pub mod storage;

pub use adapters::{
    host_strategy_name, prefs_store, remote_fs_service, selected_host_strategy, HostStrategy,
    PrefsStoreAdapter, RemoteFsServiceAdapter,
};
pub use fs::download::save_downloaded_file;
pub use fs::transport::{web_remote_fs_service, WebFetchTransport, WebRemoteFsService};
pub use fs::upload::WebFileUploadSource;
pub use storage::local_prefs::WebPrefsStore;
