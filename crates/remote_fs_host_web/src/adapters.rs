use remote_fs_host::{
    DirectoryEntry, DirectoryListing, DownloadedFile, EntryId, EntryKind, NoopPrefsStore,
    NoopRemoteFsService, PrefsStore, PrefsStoreFuture, RemoteFsConfig, RemoteFsFuture,
    RemoteFsResult, RemoteFsService,
};

use crate::{web_remote_fs_service, WebPrefsStore, WebRemoteFsService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Compile-time selected host strategy.
pub enum HostStrategy {
    /// Browser `fetch` client and `localStorage` prefs.
    Browser,
    /// No-op adapters for builds without a reachable backend.
    Stub,
}

/// Returns the compile-time selected host strategy for the active build.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(feature = "host-stub")]
    {
        HostStrategy::Stub
    }

    #[cfg(not(feature = "host-stub"))]
    {
        HostStrategy::Browser
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    match selected_host_strategy() {
        HostStrategy::Browser => "browser",
        HostStrategy::Stub => "stub",
    }
}

/// Adapter enum that erases the concrete backend behind [`RemoteFsService`].
#[derive(Debug, Clone)]
pub enum RemoteFsServiceAdapter {
    /// HTTP client over the browser `fetch` API.
    Browser(WebRemoteFsService),
    /// Backend reported as unreachable.
    Stub(NoopRemoteFsService),
}

impl RemoteFsService for RemoteFsServiceAdapter {
    fn list_roots<'a>(&'a self) -> RemoteFsFuture<'a, RemoteFsResult<Vec<DirectoryEntry>>> {
        match self {
            Self::Browser(service) => service.list_roots(),
            Self::Stub(service) => service.list_roots(),
        }
    }

    fn list_favourites<'a>(&'a self) -> RemoteFsFuture<'a, RemoteFsResult<Vec<DirectoryEntry>>> {
        match self {
            Self::Browser(service) => service.list_favourites(),
            Self::Stub(service) => service.list_favourites(),
        }
    }

    fn resolve_directory<'a>(
        &'a self,
        id: &'a EntryId,
    ) -> RemoteFsFuture<'a, RemoteFsResult<DirectoryListing>> {
        match self {
            Self::Browser(service) => service.resolve_directory(id),
            Self::Stub(service) => service.resolve_directory(id),
        }
    }

    fn create_directory<'a>(
        &'a self,
        parent: &'a EntryId,
        name: &'a str,
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>> {
        match self {
            Self::Browser(service) => service.create_directory(parent, name),
            Self::Stub(service) => service.create_directory(parent, name),
        }
    }

    fn create_file<'a>(
        &'a self,
        parent: &'a EntryId,
        name: &'a str,
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>> {
        match self {
            Self::Browser(service) => service.create_file(parent, name),
            Self::Stub(service) => service.create_file(parent, name),
        }
    }

    fn delete_entry<'a>(
        &'a self,
        id: &'a EntryId,
        kind: EntryKind,
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>> {
        match self {
            Self::Browser(service) => service.delete_entry(id, kind),
            Self::Stub(service) => service.delete_entry(id, kind),
        }
    }

    fn upload_chunk<'a>(
        &'a self,
        directory: &'a EntryId,
        file_name: &'a str,
        chunk: &'a [u8],
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>> {
        match self {
            Self::Browser(service) => service.upload_chunk(directory, file_name, chunk),
            Self::Stub(service) => service.upload_chunk(directory, file_name, chunk),
        }
    }

    fn download_file<'a>(
        &'a self,
        id: &'a EntryId,
    ) -> RemoteFsFuture<'a, RemoteFsResult<DownloadedFile>> {
        match self {
            Self::Browser(service) => service.download_file(id),
            Self::Stub(service) => service.download_file(id),
        }
    }
}

/// Adapter enum that erases the concrete preference backend behind [`PrefsStore`].
#[derive(Debug, Clone, Copy)]
pub enum PrefsStoreAdapter {
    /// `localStorage` preferences.
    Browser(WebPrefsStore),
    /// Preferences that are never stored.
    Stub(NoopPrefsStore),
}

impl PrefsStore for PrefsStoreAdapter {
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        match self {
            Self::Browser(store) => store.load_pref(key),
            Self::Stub(store) => store.load_pref(key),
        }
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(store) => store.save_pref(key, raw_json),
            Self::Stub(store) => store.save_pref(key, raw_json),
        }
    }

    fn delete_pref<'a>(&'a self, key: &'a str) -> PrefsStoreFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(store) => store.delete_pref(key),
            Self::Stub(store) => store.delete_pref(key),
        }
    }
}

/// Builds the remote filesystem adapter for the compile-time selected host strategy.
pub fn remote_fs_service(config: &RemoteFsConfig) -> RemoteFsServiceAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => RemoteFsServiceAdapter::Browser(web_remote_fs_service(config)),
        HostStrategy::Stub => RemoteFsServiceAdapter::Stub(NoopRemoteFsService),
    }
}

/// Builds the preferences adapter for the compile-time selected host strategy.
pub fn prefs_store() -> PrefsStoreAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => PrefsStoreAdapter::Browser(WebPrefsStore),
        HostStrategy::Stub => PrefsStoreAdapter::Stub(NoopPrefsStore),
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use remote_fs_host::{load_config_with, ErrorKind};

    use super::*;

    #[cfg(not(feature = "host-stub"))]
    #[test]
    fn default_build_selects_browser_adapters() {
        assert_eq!(selected_host_strategy(), HostStrategy::Browser);
        assert_eq!(host_strategy_name(), "browser");

        let config = RemoteFsConfig {
            api_base_url: "/files/api".to_string(),
            ..RemoteFsConfig::default()
        };
        match remote_fs_service(&config) {
            RemoteFsServiceAdapter::Browser(service) => {
                assert_eq!(service.base_url(), "/files/api")
            }
            other => panic!("unexpected adapter: {other:?}"),
        }
        assert!(matches!(prefs_store(), PrefsStoreAdapter::Browser(_)));
    }

    #[cfg(feature = "host-stub")]
    #[test]
    fn stub_build_selects_noop_adapters() {
        assert_eq!(selected_host_strategy(), HostStrategy::Stub);
        assert_eq!(host_strategy_name(), "stub");
        assert!(matches!(
            remote_fs_service(&RemoteFsConfig::default()),
            RemoteFsServiceAdapter::Stub(_)
        ));
        assert!(matches!(prefs_store(), PrefsStoreAdapter::Stub(_)));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn adapters_fail_as_network_errors_off_wasm() {
        let service = remote_fs_service(&RemoteFsConfig::default());
        let id = EntryId::from("home");
        let err = block_on(service.resolve_directory(&id)).expect_err("unreachable");
        assert_eq!(err.kind(), ErrorKind::NetworkError);

        let config = block_on(load_config_with(&prefs_store())).expect("config");
        assert_eq!(config, RemoteFsConfig::default());
    }
}
