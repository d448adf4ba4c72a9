//! Single-request HTTP transport.
//!
//! A [`Transport`] issues exactly one GET and hands back the status,
//! the `Location` header and a streaming body. It never follows redirects;
//! that policy lives in [`super::HttpClient`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode, header::LOCATION};

/// A response body that can be drained chunk by chunk.
#[async_trait]
pub trait ResponseBody: Send {
    /// Next chunk of the body, or `None` once the stream is complete.
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>>;
}

/// Status, redirect target and body of a single HTTP exchange.
pub struct HttpResponse {
    status: StatusCode,
    location: Option<String>,
    body: Box<dyn ResponseBody>,
}

impl HttpResponse {
    pub fn new(status: StatusCode, location: Option<String>, body: Box<dyn ResponseBody>) -> Self {
        Self {
            status,
            location,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub async fn chunk(&mut self) -> Result<Option<Vec<u8>>> {
        self.body.next_chunk().await
    }

    /// Response with an in-memory body, split into `chunks`.
    #[cfg(test)]
    pub fn from_chunks(status: u16, chunks: Vec<Vec<u8>>) -> Self {
        Self::new(
            StatusCode::from_u16(status).unwrap(),
            None,
            Box::new(MemoryBody(chunks.into())),
        )
    }

    #[cfg(test)]
    pub fn from_bytes(status: u16, body: &[u8]) -> Self {
        Self::from_chunks(status, vec![body.to_vec()])
    }

    #[cfg(test)]
    pub fn redirect(status: u16, location: &str) -> Self {
        Self::new(
            StatusCode::from_u16(status).unwrap(),
            Some(location.to_string()),
            Box::new(MemoryBody(Default::default())),
        )
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
struct MemoryBody(std::collections::VecDeque<Vec<u8>>);

#[cfg(test)]
#[async_trait]
impl ResponseBody for MemoryBody {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(self.0.pop_front())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one GET request for `url` without following redirects.
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a reqwest client.
///
/// The client must be built with `redirect::Policy::none()` so that 30x
/// responses reach the caller untouched.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

struct ReqwestBody(reqwest::Response);

#[async_trait]
impl ResponseBody for ReqwestBody {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        let chunk = self
            .0
            .chunk()
            .await
            .context("Failed to read chunk from download stream")?;
        Ok(chunk.map(|bytes| bytes.to_vec()))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[tracing::instrument(skip(self))]
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        debug!("GET {}...", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        debug!("GET {} -> {}", url, status);
        Ok(HttpResponse::new(
            status,
            location,
            Box::new(ReqwestBody(response)),
        ))
    }
}
