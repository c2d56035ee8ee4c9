//! Typed host contracts for the remote filesystem explorer.
//!
//! This crate is the target-independent boundary between the explorer runtime and the platform.
//! It defines the DTOs exchanged with the backend, the error taxonomy, the [`RemoteFsService`]
//! trait and its HTTP implementation over an abstract [`HttpTransport`], plus configuration and
//! preference-store contracts. Concrete browser transports live in `remote_fs_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod fs;

pub use config::{
    load_config_with, load_pref_with, save_config_with, save_pref_with, MemoryPrefsStore,
    NoopPrefsStore, PrefsStore, PrefsStoreFuture, RemoteFsConfig, DEFAULT_API_BASE_URL,
    DEFAULT_UPLOAD_CHUNK_SIZE, REMOTE_FS_CONFIG_KEY,
};
pub use fs::disposition::{download_filename, parse_content_disposition_filename};
pub use fs::http::{
    HttpFuture, HttpMethod, HttpRemoteFsService, HttpRequest, HttpResponse, HttpTransport,
};
pub use fs::memory::{MemoryHold, MemoryRemoteFsService, RemoteFsCall, RemoteFsOp};
pub use fs::service::{validate_entry_name, NoopRemoteFsService, RemoteFsFuture, RemoteFsService};
pub use fs::types::{
    CreateEntryRequest, DeleteEntryRequest, DirectoryEntry, DirectoryListing,
    DirectoryLookupRequest, DirectoryRef, DownloadedFile, EntryId, EntryKind,
    DEFAULT_DOWNLOAD_FILENAME,
};
pub use fs::upload_source::{MemoryUploadSource, UploadSource, UploadSourceFuture};
pub use fs::{ErrorKind, RemoteFsError, RemoteFsResult};
