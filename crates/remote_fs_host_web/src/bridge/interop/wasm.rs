use super::*;
use js_sys::{Promise, Reflect, Uint8Array};
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::Blob;

#[wasm_bindgen(inline_js = r#"
function describe(err) {
  if (err && typeof err.message === 'string') {
    return err.message;
  }
  return String(err);
}

async function remoteFsRequest(method, url, headers, body) {
  const init = { method, headers: {}, credentials: 'same-origin' };
  for (const [name, value] of headers) {
    init.headers[name] = value;
  }
  if (body !== undefined && body !== null) {
    init.body = body;
  }
  let response;
  try {
    response = await fetch(url, init);
  } catch (err) {
    throw new Error(`fetch ${method} ${url} failed: ${describe(err)}`);
  }
  const buffer = await response.arrayBuffer();
  return {
    meta: { status: response.status, headers: Array.from(response.headers.entries()) },
    body: new Uint8Array(buffer),
  };
}

async function readBlobRange(blob, start, end) {
  const buffer = await blob.slice(start, end).arrayBuffer();
  return new Uint8Array(buffer);
}

function saveDownload(filename, bytes) {
  const blob = new Blob([bytes], { type: 'application/octet-stream' });
  const url = URL.createObjectURL(blob);
  const anchor = document.createElement('a');
  anchor.href = url;
  anchor.download = filename;
  anchor.style.display = 'none';
  document.body.appendChild(anchor);
  anchor.click();
  anchor.remove();
  setTimeout(() => URL.revokeObjectURL(url), 0);
}

export async function jsRemoteFsRequest(method, url, headers, body) { return await remoteFsRequest(method, url, headers, body); }
export async function jsReadBlobRange(blob, start, end) { return await readBlobRange(blob, start, end); }
export function jsSaveDownload(filename, bytes) { saveDownload(filename, bytes); }
"#)]
extern "C" {
    #[wasm_bindgen(js_name = jsRemoteFsRequest)]
    fn js_remote_fs_request(
        method: &str,
        url: &str,
        headers: JsValue,
        body: Option<Uint8Array>,
    ) -> Promise;
    #[wasm_bindgen(js_name = jsReadBlobRange)]
    fn js_read_blob_range(blob: &Blob, start: f64, end: f64) -> Promise;
    #[wasm_bindgen(js_name = jsSaveDownload, catch)]
    fn js_save_download(filename: &str, bytes: &[u8]) -> Result<(), JsValue>;
}

#[derive(Deserialize)]
struct ResponseMeta {
    status: u16,
    headers: Vec<(String, String)>,
}

async fn await_promise(promise: Promise) -> Result<JsValue, String> {
    JsFuture::from(promise).await.map_err(js_error_to_string)
}

fn js_error_to_string(err: JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    if let Ok(message) = Reflect::get(&err, &JsValue::from_str("message")) {
        if let Some(text) = message.as_string() {
            return text;
        }
    }
    format!("{err:?}")
}

fn field(value: &JsValue, name: &str) -> Result<JsValue, String> {
    Reflect::get(value, &JsValue::from_str(name)).map_err(js_error_to_string)
}

pub async fn fetch(request: &HttpRequest) -> Result<HttpResponse, String> {
    let headers = to_value(&request.headers).map_err(|e| e.to_string())?;
    let body = request.body.as_deref().map(Uint8Array::from);
    let value = await_promise(js_remote_fs_request(
        request.method.as_str(),
        &request.url,
        headers,
        body,
    ))
    .await?;

    let meta: ResponseMeta = from_value(field(&value, "meta")?).map_err(|e| e.to_string())?;
    let body = Uint8Array::new(&field(&value, "body")?).to_vec();
    Ok(HttpResponse {
        status: meta.status,
        headers: meta.headers,
        body,
    })
}

pub async fn read_blob_range(blob: &Blob, range: Range<u64>) -> Result<Vec<u8>, String> {
    let value = await_promise(js_read_blob_range(
        blob,
        range.start as f64,
        range.end as f64,
    ))
    .await?;
    Ok(Uint8Array::new(&value).to_vec())
}

pub fn save_download(filename: &str, bytes: &[u8]) -> Result<(), String> {
    js_save_download(filename, bytes).map_err(js_error_to_string)
}
