//! Browser capability bridge used by the `remote_fs_host_web` adapters.
//!
//! Calls go through `interop`, which selects the wasm JS bindings or the non-wasm fallback shim.

mod interop;

use std::ops::Range;

use remote_fs_host::{HttpRequest, HttpResponse};

/// Issues one `fetch` with the session cookie attached.
pub(crate) async fn fetch(request: &HttpRequest) -> Result<HttpResponse, String> {
    interop::fetch(request).await
}

pub(crate) async fn read_blob_range(
    blob: &web_sys::Blob,
    range: Range<u64>,
) -> Result<Vec<u8>, String> {
    if range.is_empty() {
        return Ok(Vec::new());
    }
    interop::read_blob_range(blob, range).await
}

/// Hands `bytes` to the browser's download flow under `filename`.
pub(crate) fn save_download(filename: &str, bytes: &[u8]) -> Result<(), String> {
    interop::save_download(filename, bytes)
}
