//! HTTP-backed [`RemoteFsService`] over an abstract, platform-provided transport.

use std::{future::Future, pin::Pin};

use serde::{de::DeserializeOwned, Serialize};

use super::disposition::download_filename;
use super::error::{RemoteFsError, RemoteFsResult};
use super::service::{validate_entry_name, RemoteFsFuture, RemoteFsService};
use super::types::{
    CreateEntryRequest, DeleteEntryRequest, DirectoryEntry, DirectoryListing, DirectoryLookupRequest,
    DirectoryRef, DownloadedFile, EntryId, EntryKind,
};

/// Endpoint listing root directories.
pub const ROOTS_PATH: &str = "/filesystem/roots";
/// Endpoint listing favourite directories.
pub const FAVOURITES_PATH: &str = "/filesystem/favourites";
/// Endpoint resolving a directory listing.
pub const DIRECTORY_LOOKUP_PATH: &str = "/filesystem/directory-lookup";
/// Endpoint creating/deleting directories.
pub const DIR_PATH: &str = "/filesystem/dir";
/// Endpoint creating/deleting files.
pub const FILE_PATH: &str = "/filesystem/file";
/// Endpoint receiving upload chunks.
pub const UPLOAD_PATH: &str = "/filesystem/upload";
/// Endpoint serving file downloads.
pub const DOWNLOAD_PATH: &str = "/filesystem/download";

/// Upload header carrying the target file name.
pub const FILE_NAME_HEADER: &str = "file-name";
/// Upload header carrying the target directory identifier.
pub const DIRECTORY_HEADER: &str = "directory";
/// Download header carrying the file identifier.
pub const FILE_HEADER: &str = "file";
/// Response header carrying the download filename.
pub const CONTENT_DISPOSITION_HEADER: &str = "content-disposition";

const JSON_CONTENT_TYPE: &str = "application/json";
const OCTET_STREAM_CONTENT_TYPE: &str = "application/octet-stream";

// Header values are byte strings; `fetch` rejects anything outside Latin-1 or with controls.
fn validate_header_name(name: &str) -> RemoteFsResult<()> {
    match name.chars().find(|ch| u32::from(*ch) > 0xFF || ch.is_control()) {
        Some(ch) => Err(RemoteFsError::Invalid(format!(
            "file name {name:?} contains {ch:?}, which cannot be sent in an upload header"
        ))),
        None => Ok(()),
    }
}

/// Object-safe boxed future used by [`HttpTransport`].
pub type HttpFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// HTTP methods used by the remote filesystem protocol.
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Returns the wire token for the method.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outgoing HTTP request.
pub struct HttpRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Absolute or origin-relative URL.
    pub url: String,
    /// Header name/value pairs (names lower-case).
    pub headers: Vec<(String, String)>,
    /// Optional raw body.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Returns the first header value matching `name` case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// HTTP response as delivered by a transport.
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the first header value matching `name` case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Lossy UTF-8 view of the body.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn find_header<'h>(headers: &'h [(String, String)], name: &str) -> Option<&'h str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Platform HTTP transport.
///
/// `Err` means no response was obtained (connection failure, aborted request); any received
/// response, whatever its status, is returned as `Ok`.
pub trait HttpTransport {
    /// Sends one request and resolves with the response.
    fn send<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a, Result<HttpResponse, String>>;
}

#[derive(Debug, Clone)]
/// Remote filesystem client issuing exactly one HTTP request per operation.
pub struct HttpRemoteFsService<T> {
    transport: T,
    base_url: String,
}

impl<T: HttpTransport> HttpRemoteFsService<T> {
    /// Creates a client that prefixes every endpoint path with `base_url`.
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
        }
    }

    /// Returns the normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute(&self, request: HttpRequest) -> RemoteFsResult<HttpResponse> {
        let response = self
            .transport
            .send(request)
            .await
            .map_err(RemoteFsError::Network)?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(RemoteFsError::from_status(response.status, &response.text()))
        }
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> RemoteFsResult<R> {
        let response = self
            .execute(HttpRequest {
                method: HttpMethod::Get,
                url: self.url(path),
                headers: Vec::new(),
                body: None,
            })
            .await?;
        decode_json(path, &response)
    }

    async fn send_json<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> RemoteFsResult<HttpResponse> {
        let body = serde_json::to_vec(body)
            .map_err(|e| RemoteFsError::Invalid(format!("request encoding failed: {e}")))?;
        self.execute(HttpRequest {
            method,
            url: self.url(path),
            headers: vec![("content-type".to_string(), JSON_CONTENT_TYPE.to_string())],
            body: Some(body),
        })
        .await
    }
}

fn decode_json<R: DeserializeOwned>(path: &str, response: &HttpResponse) -> RemoteFsResult<R> {
    serde_json::from_slice(&response.body)
        .map_err(|e| RemoteFsError::Server(format!("malformed response from {path}: {e}")))
}

fn entry_path(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Directory => DIR_PATH,
        EntryKind::File => FILE_PATH,
    }
}

impl<T: HttpTransport> RemoteFsService for HttpRemoteFsService<T> {
    fn list_roots<'a>(&'a self) -> RemoteFsFuture<'a, RemoteFsResult<Vec<DirectoryEntry>>> {
        Box::pin(async move {
            let roots: Vec<DirectoryRef> = self.get_json(ROOTS_PATH).await?;
            Ok(roots.into_iter().map(DirectoryEntry::from).collect())
        })
    }

    fn list_favourites<'a>(&'a self) -> RemoteFsFuture<'a, RemoteFsResult<Vec<DirectoryEntry>>> {
        Box::pin(async move {
            let favourites: Vec<DirectoryRef> = self.get_json(FAVOURITES_PATH).await?;
            Ok(favourites.into_iter().map(DirectoryEntry::from).collect())
        })
    }

    fn resolve_directory<'a>(
        &'a self,
        id: &'a EntryId,
    ) -> RemoteFsFuture<'a, RemoteFsResult<DirectoryListing>> {
        Box::pin(async move {
            let body = DirectoryLookupRequest {
                directory: id.clone(),
            };
            let response = self
                .send_json(HttpMethod::Post, DIRECTORY_LOOKUP_PATH, &body)
                .await?;
            decode_json(DIRECTORY_LOOKUP_PATH, &response)
        })
    }

    fn create_directory<'a>(
        &'a self,
        parent: &'a EntryId,
        name: &'a str,
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>> {
        Box::pin(async move {
            validate_entry_name(name)?;
            let body = CreateEntryRequest {
                directory: parent.clone(),
                name: name.to_string(),
            };
            self.send_json(HttpMethod::Post, DIR_PATH, &body).await?;
            Ok(())
        })
    }

    fn create_file<'a>(
        &'a self,
        parent: &'a EntryId,
        name: &'a str,
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>> {
        Box::pin(async move {
            validate_entry_name(name)?;
            let body = CreateEntryRequest {
                directory: parent.clone(),
                name: name.to_string(),
            };
            self.send_json(HttpMethod::Post, FILE_PATH, &body).await?;
            Ok(())
        })
    }

    fn delete_entry<'a>(
        &'a self,
        id: &'a EntryId,
        kind: EntryKind,
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>> {
        Box::pin(async move {
            let body = DeleteEntryRequest { file: id.clone() };
            self.send_json(HttpMethod::Delete, entry_path(kind), &body)
                .await?;
            Ok(())
        })
    }

    fn upload_chunk<'a>(
        &'a self,
        directory: &'a EntryId,
        file_name: &'a str,
        chunk: &'a [u8],
    ) -> RemoteFsFuture<'a, RemoteFsResult<()>> {
        Box::pin(async move {
            validate_entry_name(file_name)?;
            validate_header_name(file_name)?;
            self.execute(HttpRequest {
                method: HttpMethod::Post,
                url: self.url(UPLOAD_PATH),
                headers: vec![
                    (
                        "content-type".to_string(),
                        OCTET_STREAM_CONTENT_TYPE.to_string(),
                    ),
                    (FILE_NAME_HEADER.to_string(), file_name.to_string()),
                    (DIRECTORY_HEADER.to_string(), directory.to_header_value()),
                ],
                body: Some(chunk.to_vec()),
            })
            .await?;
            Ok(())
        })
    }

    fn download_file<'a>(
        &'a self,
        id: &'a EntryId,
    ) -> RemoteFsFuture<'a, RemoteFsResult<DownloadedFile>> {
        Box::pin(async move {
            let response = self
                .execute(HttpRequest {
                    method: HttpMethod::Post,
                    url: self.url(DOWNLOAD_PATH),
                    headers: vec![(FILE_HEADER.to_string(), id.to_header_value())],
                    body: None,
                })
                .await?;
            let filename = download_filename(response.header(CONTENT_DISPOSITION_HEADER));
            Ok(DownloadedFile {
                filename,
                bytes: response.body,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::VecDeque};

    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use super::*;
    use crate::fs::ErrorKind;

    #[derive(Default)]
    struct ScriptedTransport {
        responses: RefCell<VecDeque<Result<HttpResponse, String>>>,
        requests: RefCell<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn respond(self, status: u16, body: &str) -> Self {
            self.respond_with(status, Vec::new(), body.as_bytes())
        }

        fn respond_with(self, status: u16, headers: Vec<(&str, &str)>, body: &[u8]) -> Self {
            self.responses.borrow_mut().push_back(Ok(HttpResponse {
                status,
                headers: headers
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                body: body.to_vec(),
            }));
            self
        }

        fn fail(self, message: &str) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Err(message.to_string()));
            self
        }

        fn request(&self, idx: usize) -> HttpRequest {
            self.requests.borrow()[idx].clone()
        }

        fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    impl HttpTransport for ScriptedTransport {
        fn send<'a>(
            &'a self,
            request: HttpRequest,
        ) -> HttpFuture<'a, Result<HttpResponse, String>> {
            self.requests.borrow_mut().push(request);
            let next = self
                .responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err("no scripted response".to_string()));
            Box::pin(async move { next })
        }
    }

    fn client(transport: ScriptedTransport) -> HttpRemoteFsService<ScriptedTransport> {
        HttpRemoteFsService::new(transport, "/api/")
    }

    fn json_body(request: &HttpRequest) -> Value {
        serde_json::from_slice(request.body.as_deref().expect("body")).expect("json body")
    }

    #[test]
    fn list_roots_maps_refs_to_directory_entries() {
        let fs = client(ScriptedTransport::default().respond(
            200,
            r#"[{"id":1,"name":"Home"},{"id":"shared","name":"Shared"}]"#,
        ));

        let roots = block_on(fs.list_roots()).expect("roots");
        assert_eq!(
            roots,
            vec![
                DirectoryEntry::directory(1u64, "Home"),
                DirectoryEntry::directory("shared", "Shared"),
            ]
        );

        let request = fs.transport().request(0);
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "/api/filesystem/roots");
        assert_eq!(request.body, None);
    }

    #[test]
    fn list_favourites_preserves_server_order() {
        let fs = client(ScriptedTransport::default().respond(
            200,
            r#"[{"id":"z","name":"Zeta"},{"id":"a","name":"Alpha"}]"#,
        ));
        let names: Vec<String> = block_on(fs.list_favourites())
            .expect("favourites")
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(names, vec!["Zeta".to_string(), "Alpha".to_string()]);
        assert_eq!(fs.transport().request(0).url, "/api/filesystem/favourites");
    }

    #[test]
    fn resolve_directory_posts_lookup_body() {
        let fs = client(ScriptedTransport::default().respond(
            200,
            r#"{"entries":[{"id":"d1","name":"Docs","isDirectory":true},{"id":"f1","name":"a.txt","isDirectory":false}]}"#,
        ));
        let id = EntryId::from("root-1");

        let listing = block_on(fs.resolve_directory(&id)).expect("listing");
        assert_eq!(listing.len(), 2);
        assert!(listing.entries[0].is_directory);

        let request = fs.transport().request(0);
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "/api/filesystem/directory-lookup");
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(json_body(&request), json!({ "directory": "root-1" }));
    }

    #[test]
    fn malformed_listing_is_a_server_error() {
        let fs = client(
            ScriptedTransport::default()
                .respond(200, r#"{"entries":[{"id":"d1","name":"Docs"}]}"#)
                .respond(200, "not json"),
        );
        let id = EntryId::from("root-1");

        for _ in 0..2 {
            let err = block_on(fs.resolve_directory(&id)).expect_err("malformed");
            assert_eq!(err.kind(), ErrorKind::ServerError);
            assert!(err.message().contains("directory-lookup"));
        }
    }

    #[test]
    fn non_success_statuses_surface_typed_errors() {
        let fs = client(
            ScriptedTransport::default()
                .respond(404, "Directory does not exist")
                .respond(403, "")
                .fail("connection reset"),
        );
        let id = EntryId::from("missing-1");

        let err = block_on(fs.resolve_directory(&id)).expect_err("404");
        assert_eq!(
            err,
            RemoteFsError::NotFound("Directory does not exist".to_string())
        );
        let err = block_on(fs.resolve_directory(&id)).expect_err("403");
        assert_eq!(err, RemoteFsError::Unauthorized("HTTP 403".to_string()));
        let err = block_on(fs.resolve_directory(&id)).expect_err("network");
        assert_eq!(err, RemoteFsError::Network("connection reset".to_string()));
    }

    #[test]
    fn create_operations_post_parent_and_name() {
        let fs = client(
            ScriptedTransport::default()
                .respond(200, "OK")
                .respond(409, "Name exists"),
        );
        let parent = EntryId::from(7u64);

        block_on(fs.create_directory(&parent, "Photos")).expect("create dir");
        let request = fs.transport().request(0);
        assert_eq!(request.url, "/api/filesystem/dir");
        assert_eq!(json_body(&request), json!({ "directory": 7, "name": "Photos" }));

        let err = block_on(fs.create_file(&parent, "Photos")).expect_err("conflict");
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(fs.transport().request(1).url, "/api/filesystem/file");
    }

    #[test]
    fn blank_names_never_reach_the_network() {
        let fs = client(ScriptedTransport::default());
        let parent = EntryId::from("p");

        let err = block_on(fs.create_directory(&parent, "  ")).expect_err("blank");
        assert_eq!(err.kind(), ErrorKind::Invalid);
        let err = block_on(fs.create_file(&parent, "")).expect_err("blank");
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert_eq!(fs.transport().request_count(), 0);
    }

    #[test]
    fn delete_selects_endpoint_by_kind() {
        let fs = client(
            ScriptedTransport::default()
                .respond(200, "OK")
                .respond(200, "OK"),
        );
        let id = EntryId::from("e-1");

        block_on(fs.delete_entry(&id, EntryKind::Directory)).expect("delete dir");
        block_on(fs.delete_entry(&id, EntryKind::File)).expect("delete file");

        let dir_request = fs.transport().request(0);
        assert_eq!(dir_request.method, HttpMethod::Delete);
        assert_eq!(dir_request.url, "/api/filesystem/dir");
        assert_eq!(json_body(&dir_request), json!({ "file": "e-1" }));
        assert_eq!(fs.transport().request(1).url, "/api/filesystem/file");
    }

    #[test]
    fn upload_chunk_sends_raw_bytes_with_metadata_headers() {
        let fs = client(ScriptedTransport::default().respond(200, ""));
        let dir = EntryId::from(12u64);

        block_on(fs.upload_chunk(&dir, "movie.mkv", &[1, 2, 3])).expect("upload");

        let request = fs.transport().request(0);
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "/api/filesystem/upload");
        assert_eq!(request.body, Some(vec![1, 2, 3]));
        assert_eq!(request.header("file-name"), Some("movie.mkv"));
        assert_eq!(request.header("directory"), Some("12"));
        assert_eq!(
            request.header("content-type"),
            Some("application/octet-stream")
        );
    }

    #[test]
    fn upload_rejects_names_that_cannot_travel_in_a_header() {
        let fs = client(ScriptedTransport::default().respond(200, ""));
        let dir = EntryId::from("d");

        for name in ["résumé 日本.txt", "line\nbreak.txt"] {
            let err = block_on(fs.upload_chunk(&dir, name, b"x")).expect_err("unsendable name");
            assert_eq!(err.kind(), ErrorKind::Invalid);
        }
        assert_eq!(fs.transport().request_count(), 0);

        block_on(fs.upload_chunk(&dir, "café.txt", b"x")).expect("latin-1 name");
        assert_eq!(fs.transport().request(0).header("file-name"), Some("café.txt"));
    }

    #[test]
    fn download_reads_filename_from_disposition() {
        let fs = client(
            ScriptedTransport::default()
                .respond_with(
                    200,
                    vec![("Content-Disposition", "attachment; filename=\"dummy.bin\"")],
                    b"xxxx",
                )
                .respond_with(200, Vec::new(), b"raw"),
        );
        let id = EntryId::from("f-9");

        let file = block_on(fs.download_file(&id)).expect("download");
        assert_eq!(file.filename, "dummy.bin");
        assert_eq!(file.bytes, b"xxxx".to_vec());
        let request = fs.transport().request(0);
        assert_eq!(request.url, "/api/filesystem/download");
        assert_eq!(request.header("file"), Some("f-9"));

        let file = block_on(fs.download_file(&id)).expect("download");
        assert_eq!(file.filename, "download");
    }
}
