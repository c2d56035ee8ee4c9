use super::*;
use web_sys::Blob;

fn unsupported() -> String {
    "Browser APIs are only available when compiled for wasm32".to_string()
}

pub async fn fetch(_request: &HttpRequest) -> Result<HttpResponse, String> {
    Err(unsupported())
}

pub async fn read_blob_range(_blob: &Blob, _range: Range<u64>) -> Result<Vec<u8>, String> {
    Err(unsupported())
}

pub fn save_download(_filename: &str, _bytes: &[u8]) -> Result<(), String> {
    Err(unsupported())
}
