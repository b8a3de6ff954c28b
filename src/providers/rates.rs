use super::caching::cache_or_fetch;
use crate::core::cache::{CacheStore, RatesTable};
use crate::core::currency::{DEFAULT_BASE_CURRENCY, normalize_currency_code};
use crate::core::error::{FxError, Result};
use crate::core::http::HttpClient;
use crate::core::rates::{RateNormalizer, RateProvider, RateRecord};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_RATES_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: Option<String>,
    time_last_update_utc: Option<String>,
    #[serde(default)]
    rates: BTreeMap<String, f64>,
}

/// Latest rates from an open.er-api.com style `/{BASE}` endpoint.
pub struct OpenErApiProvider {
    base_url: String,
    http: Arc<dyn HttpClient>,
    store: Arc<CacheStore>,
    normalizer: RateNormalizer,
    ttl: Duration,
}

impl OpenErApiProvider {
    pub fn new(base_url: &str, http: Arc<dyn HttpClient>, store: Arc<CacheStore>) -> Self {
        OpenErApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            store,
            normalizer: RateNormalizer::default(),
            ttl: DEFAULT_RATES_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_normalizer(mut self, normalizer: RateNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Shorthand for rates quoted against US dollars.
    pub async fn fetch_usd_rates(&self, force_refresh: bool) -> Result<Vec<RateRecord>> {
        self.fetch_rates(Some(DEFAULT_BASE_CURRENCY), force_refresh)
            .await
    }

    async fn fetch_remote(&self, base: &str) -> Result<Vec<RateRecord>> {
        let url = format!("{}/{}", self.base_url, base);
        debug!("Requesting latest rates from {}", url);

        let response = self.http.fetch(&url).await?.error_for_status()?;
        let payload: LatestRatesResponse = response.json()?;

        if let Some(result) = payload.result.as_deref() {
            if result != "success" {
                return Err(FxError::UpstreamRejected(format!(
                    "Rates API returned a non-success response: {result}"
                )));
            }
        }
        if payload.rates.is_empty() {
            return Err(FxError::UpstreamRejected(format!(
                "No rates returned for base currency: {base}"
            )));
        }

        Ok(self.normalizer.normalize(
            &payload.rates,
            base,
            payload.time_last_update_utc.as_deref(),
            self.store.now(),
        ))
    }
}

#[async_trait]
impl RateProvider for OpenErApiProvider {
    #[instrument(name = "RatesFetch", skip(self))]
    async fn fetch_rates(
        &self,
        base_currency: Option<&str>,
        force_refresh: bool,
    ) -> Result<Vec<RateRecord>> {
        let base = match base_currency.and_then(normalize_currency_code) {
            Some(base) => base,
            None => self.store.base_currency().await,
        };

        cache_or_fetch::<RatesTable, _, _>(&self.store, &base, self.ttl, force_refresh, || {
            self.fetch_remote(&base)
        })
        .await
    }
}
