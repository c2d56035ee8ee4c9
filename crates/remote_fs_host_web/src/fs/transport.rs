//! `fetch`-backed [`HttpTransport`].

use remote_fs_host::{
    HttpFuture, HttpRemoteFsService, HttpRequest, HttpResponse, HttpTransport, RemoteFsConfig,
};

use crate::bridge;

#[derive(Debug, Clone, Copy, Default)]
/// Browser HTTP transport. Requests carry same-origin credentials so the session cookie is sent.
pub struct WebFetchTransport;

impl HttpTransport for WebFetchTransport {
    fn send<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a, Result<HttpResponse, String>> {
        Box::pin(async move { bridge::fetch(&request).await })
    }
}

/// Remote filesystem client over the browser `fetch` API.
pub type WebRemoteFsService = HttpRemoteFsService<WebFetchTransport>;

/// Builds the browser client for the configured API base URL.
pub fn web_remote_fs_service(config: &RemoteFsConfig) -> WebRemoteFsService {
    HttpRemoteFsService::new(WebFetchTransport, config.clone().sanitized().api_base_url)
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use remote_fs_host::{ErrorKind, RemoteFsService};

    use super::*;

    #[test]
    fn client_uses_configured_base_url() {
        let service = web_remote_fs_service(&RemoteFsConfig {
            api_base_url: "https://files.example/api/".to_string(),
            ..RemoteFsConfig::default()
        });
        assert_eq!(service.base_url(), "https://files.example/api");

        let fallback = web_remote_fs_service(&RemoteFsConfig {
            api_base_url: " ".to_string(),
            ..RemoteFsConfig::default()
        });
        assert_eq!(fallback.base_url(), "/api");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn transport_failures_surface_as_network_errors_off_wasm() {
        let service = web_remote_fs_service(&RemoteFsConfig::default());
        let err = block_on(service.list_roots()).expect_err("no fetch off wasm");
        assert_eq!(err.kind(), ErrorKind::NetworkError);
        assert!(err.message().contains("wasm32"));
    }
}
