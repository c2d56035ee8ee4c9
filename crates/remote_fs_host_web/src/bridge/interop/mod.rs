//! Target routing for browser bridge calls.
//!
//! `wasm` talks to the page through an inline JS module; `non_wasm` keeps the same signatures so
//! the crate builds and tests on the host.

use std::ops::Range;

use remote_fs_host::{HttpRequest, HttpResponse};

#[cfg(not(target_arch = "wasm32"))]
mod non_wasm;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
use non_wasm as imp;
#[cfg(target_arch = "wasm32")]
use wasm as imp;

pub async fn fetch(request: &HttpRequest) -> Result<HttpResponse, String> {
    imp::fetch(request).await
}

pub async fn read_blob_range(blob: &web_sys::Blob, range: Range<u64>) -> Result<Vec<u8>, String> {
    imp::read_blob_range(blob, range).await
}

pub fn save_download(filename: &str, bytes: &[u8]) -> Result<(), String> {
    imp::save_download(filename, bytes)
}
