use super::util::with_retry;
use crate::core::error::Result;
use crate::core::http::{HttpClient, HttpResponse};
use async_trait::async_trait;
use tracing::debug;

const USER_AGENT: &str = concat!("fxcache/", env!("CARGO_PKG_VERSION"));

/// [`HttpClient`] backed by reqwest. Connection failures are retried; HTTP
/// status codes are passed through untouched.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
    retries: usize,
    delay_ms: u64,
}

impl ReqwestClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            retries: 3,
            delay_ms: 500,
        })
    }

    pub fn with_retries(mut self, retries: usize, delay_ms: u64) -> Self {
        self.retries = retries;
        self.delay_ms = delay_ms;
        self
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn fetch(&self, url: &str) -> Result<HttpResponse> {
        debug!("Requesting {}", url);
        let response = with_retry(
            || async { self.client.get(url).send().await },
            self.retries,
            self.delay_ms,
        )
        .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "Received response");
        Ok(HttpResponse { status, body })
    }
}
