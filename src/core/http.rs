//! Narrow HTTP interface consumed by the providers

use super::error::{FxError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Maps any non-2xx status to [`FxError::TransportError`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FxError::TransportError(self.status))
        }
    }

    /// Parses the body; shape mismatches become [`FxError::UpstreamRejected`].
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| FxError::UpstreamRejected(format!("Failed to parse JSON response: {e}")))
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<HttpResponse>;
}
