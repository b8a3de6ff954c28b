use super::caching::cache_or_fetch;
use crate::core::cache::{CacheStore, NewsTable};
use crate::core::currency::normalize_currency_code;
use crate::core::error::{FxError, Result};
use crate::core::http::HttpClient;
use crate::core::news::{NewsProvider, NewsRecord, RawNewsItem, normalize_news};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_NEWS_TTL: Duration = Duration::from_secs(15 * 60);

const GOOGLE_NEWS_RSS: &str = "https://news.google.com/rss/search";

#[derive(Debug, Deserialize)]
struct FeedResponse {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    items: Vec<RawNewsItem>,
}

fn parse_url(url: &str, params: &[(&str, &str)]) -> Result<Url> {
    Url::parse_with_params(url, params).map_err(|e| FxError::InvalidEndpoint {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Google News search results for a currency, relayed through an
/// rss2json.com style `?rss_url=` endpoint.
pub struct Rss2JsonNewsProvider {
    base_url: String,
    http: Arc<dyn HttpClient>,
    store: Arc<CacheStore>,
    ttl: Duration,
}

impl Rss2JsonNewsProvider {
    pub fn new(base_url: &str, http: Arc<dyn HttpClient>, store: Arc<CacheStore>) -> Self {
        Rss2JsonNewsProvider {
            base_url: base_url.to_string(),
            http,
            store,
            ttl: DEFAULT_NEWS_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn request_url(&self, currency: &str) -> Result<Url> {
        let query = format!("{currency} currency exchange rate");
        let rss_url = parse_url(
            GOOGLE_NEWS_RSS,
            &[
                ("q", query.as_str()),
                ("hl", "en-US"),
                ("gl", "US"),
                ("ceid", "US:en"),
            ],
        )?;
        parse_url(&self.base_url, &[("rss_url", rss_url.as_str())])
    }

    async fn fetch_remote(&self, currency: &str) -> Result<Vec<NewsRecord>> {
        let url = self.request_url(currency)?;
        debug!("Requesting news from {}", url);

        let response = self.http.fetch(url.as_str()).await?.error_for_status()?;
        let payload: FeedResponse = response.json()?;
        if let Some(status) = payload.status.as_deref() {
            if status != "ok" {
                return Err(FxError::UpstreamRejected(format!(
                    "News feed returned status {status}: {}",
                    payload.message.as_deref().unwrap_or("no message")
                )));
            }
        }

        Ok(normalize_news(&payload.items, currency, self.store.now()))
    }
}

#[async_trait]
impl NewsProvider for Rss2JsonNewsProvider {
    #[instrument(name = "NewsFetch", skip(self))]
    async fn fetch_news(
        &self,
        currency: Option<&str>,
        force_refresh: bool,
    ) -> Result<Vec<NewsRecord>> {
        let currency = match currency.and_then(normalize_currency_code) {
            Some(currency) => currency,
            None => self.store.base_currency().await,
        };

        cache_or_fetch::<NewsTable, _, _>(&self.store, &currency, self.ttl, force_refresh, || {
            self.fetch_remote(&currency)
        })
        .await
    }
}
