//! HTTP client with a bounded redirect budget.

use log::{debug, warn};
use reqwest::{StatusCode, Url};

use super::transport::{HttpResponse, Transport};
use crate::error::DownloadFailure;

/// Number of redirect hops followed by default.
pub const DEFAULT_MAX_HOPS: usize = 1;

/// Issues GET requests through a [`Transport`], following at most
/// `max_hops` 301/302 redirects. Only a final 200 counts as success.
pub struct HttpClient<T: Transport> {
    transport: T,
    max_hops: usize,
}

impl<T: Transport> HttpClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            max_hops: DEFAULT_MAX_HOPS,
        }
    }

    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// GET `url`, following redirects within the hop budget.
    ///
    /// Exactly one request is made per hop; there is no retry.
    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<HttpResponse, DownloadFailure> {
        let mut current = url.to_string();
        let mut hops = 0;

        loop {
            let response = self
                .transport
                .get(&current)
                .await
                .map_err(|e| DownloadFailure::Transport(format!("{:#}", e)))?;

            let status = response.status();
            if status == StatusCode::OK {
                return Ok(response);
            }

            if !is_redirect(status) {
                debug!("GET {} failed with {}", current, status);
                return Err(DownloadFailure::Status(status.as_u16()));
            }

            if hops >= self.max_hops {
                warn!(
                    "Redirect from {} exceeds the limit of {} hop(s)",
                    current, self.max_hops
                );
                return Err(DownloadFailure::TooManyRedirects {
                    limit: self.max_hops,
                });
            }

            let location = response
                .location()
                .ok_or(DownloadFailure::MissingLocation {
                    status: status.as_u16(),
                })?;
            let next = resolve_location(&current, location)?;

            hops += 1;
            debug!("Following {} redirect {}/{} to {}", status, hops, self.max_hops, next);
            current = next;
        }
    }
}

fn is_redirect(status: StatusCode) -> bool {
    status == StatusCode::MOVED_PERMANENTLY || status == StatusCode::FOUND
}

/// Resolve a `Location` header against the URL that produced it.
fn resolve_location(base: &str, location: &str) -> Result<String, DownloadFailure> {
    let invalid = || DownloadFailure::InvalidLocation(location.to_string());
    let base = Url::parse(base).map_err(|_| invalid())?;
    let next = base.join(location).map_err(|_| invalid())?;
    Ok(next.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{MockTransport, ReqwestTransport};
    use mockall::Sequence;
    use mockall::predicate::eq;
    use reqwest::{Client, redirect::Policy};

    async fn body_of(mut response: HttpResponse) -> Vec<u8> {
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.unwrap() {
            body.extend_from_slice(&chunk);
        }
        body
    }

    #[tokio::test]
    async fn test_fetch_direct_success() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .with(eq("https://example.com/asset"))
            .times(1)
            .returning(|_| Ok(HttpResponse::from_bytes(200, b"payload")));

        let client = HttpClient::new(transport);
        let response = client.fetch("https://example.com/asset").await.unwrap();

        assert_eq!(body_of(response).await, b"payload");
    }

    #[tokio::test]
    async fn test_fetch_follows_single_redirect() {
        let mut seq = Sequence::new();
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .with(eq("https://example.com/asset"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(HttpResponse::redirect(302, "https://cdn.example.com/blob")));
        transport
            .expect_get()
            .with(eq("https://cdn.example.com/blob"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(HttpResponse::from_bytes(200, b"from cdn")));

        let client = HttpClient::new(transport);
        let response = client.fetch("https://example.com/asset").await.unwrap();

        assert_eq!(body_of(response).await, b"from cdn");
    }

    #[tokio::test]
    async fn test_fetch_resolves_relative_location() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .with(eq("https://example.com/releases/latest/download/asset"))
            .returning(|_| Ok(HttpResponse::redirect(301, "/releases/download/v1.2.0/asset")));
        transport
            .expect_get()
            .with(eq("https://example.com/releases/download/v1.2.0/asset"))
            .returning(|_| Ok(HttpResponse::from_bytes(200, b"v1.2.0")));

        let client = HttpClient::new(transport);
        let response = client
            .fetch("https://example.com/releases/latest/download/asset")
            .await
            .unwrap();

        assert_eq!(body_of(response).await, b"v1.2.0");
    }

    #[tokio::test]
    async fn test_fetch_rejects_second_redirect() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .with(eq("https://example.com/a"))
            .times(1)
            .returning(|_| Ok(HttpResponse::redirect(302, "https://example.com/b")));
        transport
            .expect_get()
            .with(eq("https://example.com/b"))
            .times(1)
            .returning(|_| Ok(HttpResponse::redirect(302, "https://example.com/c")));

        let client = HttpClient::new(transport);
        let err = client.fetch("https://example.com/a").await.unwrap_err();

        assert_eq!(err, DownloadFailure::TooManyRedirects { limit: 1 });
    }

    #[tokio::test]
    async fn test_fetch_zero_hops_treats_redirect_as_failure() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .times(1)
            .returning(|_| Ok(HttpResponse::redirect(301, "https://example.com/b")));

        let client = HttpClient::new(transport).with_max_hops(0);
        let err = client.fetch("https://example.com/a").await.unwrap_err();

        assert_eq!(err, DownloadFailure::TooManyRedirects { limit: 0 });
    }

    #[tokio::test]
    async fn test_fetch_larger_budget_follows_more_hops() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .with(eq("https://example.com/a"))
            .returning(|_| Ok(HttpResponse::redirect(302, "https://example.com/b")));
        transport
            .expect_get()
            .with(eq("https://example.com/b"))
            .returning(|_| Ok(HttpResponse::redirect(301, "https://example.com/c")));
        transport
            .expect_get()
            .with(eq("https://example.com/c"))
            .returning(|_| Ok(HttpResponse::from_bytes(200, b"c")));

        let client = HttpClient::new(transport).with_max_hops(2);
        let response = client.fetch("https://example.com/a").await.unwrap();

        assert_eq!(body_of(response).await, b"c");
    }

    #[tokio::test]
    async fn test_fetch_redirect_without_location() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .returning(|_| Ok(HttpResponse::from_bytes(302, b"")));

        let client = HttpClient::new(transport);
        let err = client.fetch("https://example.com/a").await.unwrap_err();

        assert_eq!(err, DownloadFailure::MissingLocation { status: 302 });
    }

    #[tokio::test]
    async fn test_fetch_non_ok_status_is_failure() {
        for status in [404u16, 500, 204, 307] {
            let mut transport = MockTransport::new();
            transport
                .expect_get()
                .times(1)
                .returning(move |_| Ok(HttpResponse::from_bytes(status, b"")));

            let client = HttpClient::new(transport);
            let err = client.fetch("https://example.com/a").await.unwrap_err();

            assert_eq!(err, DownloadFailure::Status(status));
        }
    }

    #[tokio::test]
    async fn test_fetch_transport_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .returning(|_| Err(anyhow::anyhow!("connection reset by peer")));

        let client = HttpClient::new(transport);
        let err = client.fetch("https://example.com/a").await.unwrap_err();

        match err {
            DownloadFailure::Transport(msg) => assert!(msg.contains("connection reset")),
            other => panic!("unexpected failure: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_redirect_over_real_http() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let redirect = server
            .mock("GET", "/latest/download/tool")
            .with_status(302)
            .with_header("location", "/download/v2/tool")
            .create_async()
            .await;
        let asset = server
            .mock("GET", "/download/v2/tool")
            .with_status(200)
            .with_body("real bytes")
            .create_async()
            .await;

        let transport =
            ReqwestTransport::new(Client::builder().redirect(Policy::none()).build().unwrap());
        let client = HttpClient::new(transport);
        let response = client
            .fetch(&format!("{}/latest/download/tool", url))
            .await
            .unwrap();

        redirect.assert_async().await;
        asset.assert_async().await;
        assert_eq!(body_of(response).await, b"real bytes");
    }

    #[test]
    fn test_resolve_location_absolute_and_relative() {
        assert_eq!(
            resolve_location("https://a.example/x/y", "https://b.example/z").unwrap(),
            "https://b.example/z"
        );
        assert_eq!(
            resolve_location("https://a.example/x/y", "/z").unwrap(),
            "https://a.example/z"
        );
        assert!(matches!(
            resolve_location("not a url", "/z"),
            Err(DownloadFailure::InvalidLocation(_))
        ));
    }
}
