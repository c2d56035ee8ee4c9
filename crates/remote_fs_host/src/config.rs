//! Client configuration and the preference-store contract it is persisted through.

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Preference key holding the serialized [`RemoteFsConfig`].
pub const REMOTE_FS_CONFIG_KEY: &str = "remotefs.explorer.config.v1";
/// Default API prefix the filesystem endpoints are mounted under.
pub const DEFAULT_API_BASE_URL: &str = "/api";
/// Reference upload chunk size (512 KiB).
pub const DEFAULT_UPLOAD_CHUNK_SIZE: u64 = 512 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Remote filesystem client configuration.
pub struct RemoteFsConfig {
    /// URL prefix joined with every endpoint path.
    pub api_base_url: String,
    /// Upload chunk size in bytes.
    pub upload_chunk_size: u64,
}

impl Default for RemoteFsConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            upload_chunk_size: DEFAULT_UPLOAD_CHUNK_SIZE,
        }
    }
}

impl RemoteFsConfig {
    /// Replaces unusable values with defaults.
    pub fn sanitized(mut self) -> Self {
        if self.upload_chunk_size == 0 {
            self.upload_chunk_size = DEFAULT_UPLOAD_CHUNK_SIZE;
        }
        if self.api_base_url.trim().is_empty() {
            self.api_base_url = DEFAULT_API_BASE_URL.to_string();
        }
        self
    }
}

/// Object-safe boxed future used by [`PrefsStore`] async methods.
pub type PrefsStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Key/value store for small JSON-encoded preference values.
pub trait PrefsStore {
    /// Loads the raw JSON text stored under `key`.
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>>;

    /// Stores raw JSON text under `key`.
    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>>;

    /// Removes `key`.
    fn delete_pref<'a>(&'a self, key: &'a str) -> PrefsStoreFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Preference store that remembers nothing.
pub struct NoopPrefsStore;

impl PrefsStore for NoopPrefsStore {
    fn load_pref<'a>(
        &'a self,
        _key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save_pref<'a>(
        &'a self,
        _key: &'a str,
        _raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn delete_pref<'a>(&'a self, _key: &'a str) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// Shared in-memory preference store.
pub struct MemoryPrefsStore {
    values: Rc<RefCell<HashMap<String, String>>>,
}

impl PrefsStore for MemoryPrefsStore {
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        let value = self.values.borrow().get(key).cloned();
        Box::pin(async move { Ok(value) })
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), raw_json.to_string());
        Box::pin(async { Ok(()) })
    }

    fn delete_pref<'a>(&'a self, key: &'a str) -> PrefsStoreFuture<'a, Result<(), String>> {
        self.values.borrow_mut().remove(key);
        Box::pin(async { Ok(()) })
    }
}

/// Loads and deserializes a typed preference value.
///
/// # Errors
///
/// Returns an error when the store fails or the stored JSON does not match `T`.
pub async fn load_pref_with<S: PrefsStore + ?Sized, T: DeserializeOwned>(
    store: &S,
    key: &str,
) -> Result<Option<T>, String> {
    let Some(raw) = store.load_pref(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| format!("{key}: {e}"))
}

/// Serializes and saves a typed preference value.
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub async fn save_pref_with<S: PrefsStore + ?Sized, T: Serialize>(
    store: &S,
    key: &str,
    value: &T,
) -> Result<(), String> {
    let raw = serde_json::to_string(value).map_err(|e| e.to_string())?;
    store.save_pref(key, &raw).await
}

/// Loads the client configuration, falling back to defaults when nothing is stored.
///
/// # Errors
///
/// Returns an error when the store fails or the stored JSON cannot be decoded.
pub async fn load_config_with<S: PrefsStore + ?Sized>(
    store: &S,
) -> Result<RemoteFsConfig, String> {
    let config: Option<RemoteFsConfig> = load_pref_with(store, REMOTE_FS_CONFIG_KEY).await?;
    Ok(config.unwrap_or_default().sanitized())
}

/// Persists the client configuration.
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub async fn save_config_with<S: PrefsStore + ?Sized>(
    store: &S,
    config: &RemoteFsConfig,
) -> Result<(), String> {
    save_pref_with(store, REMOTE_FS_CONFIG_KEY, config).await
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn missing_config_yields_reference_defaults() {
        let store = MemoryPrefsStore::default();
        let config = block_on(load_config_with(&store)).expect("load");
        assert_eq!(config.api_base_url, "/api");
        assert_eq!(config.upload_chunk_size, 524_288);

        let noop = NoopPrefsStore;
        assert_eq!(
            block_on(load_config_with(&noop)).expect("load"),
            RemoteFsConfig::default()
        );
    }

    #[test]
    fn config_round_trips_through_store() {
        let store = MemoryPrefsStore::default();
        let store_obj: &dyn PrefsStore = &store;
        let config = RemoteFsConfig {
            api_base_url: "https://files.example/api".to_string(),
            upload_chunk_size: 64 * 1024,
        };

        block_on(save_config_with(store_obj, &config)).expect("save");
        assert_eq!(block_on(load_config_with(store_obj)).expect("load"), config);

        block_on(store_obj.delete_pref(REMOTE_FS_CONFIG_KEY)).expect("delete");
        assert_eq!(
            block_on(load_config_with(store_obj)).expect("load"),
            RemoteFsConfig::default()
        );
    }

    #[test]
    fn partial_or_zero_values_are_sanitized() {
        let store = MemoryPrefsStore::default();
        block_on(store.save_pref(REMOTE_FS_CONFIG_KEY, r#"{"upload_chunk_size":0}"#))
            .expect("save raw");
        let config = block_on(load_config_with(&store)).expect("load");
        assert_eq!(config, RemoteFsConfig::default());

        block_on(store.save_pref(REMOTE_FS_CONFIG_KEY, "{not json")).expect("save raw");
        let err = block_on(load_config_with(&store)).expect_err("corrupt config");
        assert!(err.starts_with(REMOTE_FS_CONFIG_KEY));
    }

    #[test]
    fn typed_pref_helpers_round_trip() {
        let store = MemoryPrefsStore::default();
        let missing: Option<Vec<String>> =
            block_on(load_pref_with(&store, "explorer.recent")).expect("load");
        assert_eq!(missing, None);

        let recent = vec!["Home".to_string(), "Docs".to_string()];
        block_on(save_pref_with(&store, "explorer.recent", &recent)).expect("save");
        let loaded: Option<Vec<String>> =
            block_on(load_pref_with(&store, "explorer.recent")).expect("load");
        assert_eq!(loaded, Some(recent));
    }
}
