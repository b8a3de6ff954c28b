use super::caching::cache_or_fetch;
use crate::core::cache::{CacheStore, TrendTable};
use crate::core::currency::normalize_currency_code;
use crate::core::error::{FxError, Result};
use crate::core::http::HttpClient;
use crate::core::trend::{
    HistoricalTable, TrendPoint, TrendProvider, build_trend_series, trend_cache_key,
    trend_symbols, trend_window,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_TREND_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(default)]
    rates: BTreeMap<String, HashMap<String, serde_json::Value>>,
}

/// Keeps only parseable dates and finite numeric rates.
fn to_historical_table(rates: BTreeMap<String, HashMap<String, serde_json::Value>>) -> HistoricalTable {
    rates
        .into_iter()
        .filter_map(|(date, by_currency)| {
            let Ok(date) = NaiveDate::parse_from_str(&date, "%Y-%m-%d") else {
                debug!("Skipping unparseable trend date: {}", date);
                return None;
            };
            let by_currency = by_currency
                .into_iter()
                .filter_map(|(currency, rate)| {
                    rate.as_f64()
                        .filter(|r| r.is_finite())
                        .map(|r| (currency.to_uppercase(), r))
                })
                .collect();
            Some((date, by_currency))
        })
        .collect()
}

/// Daily history from a frankfurter.app style `/{start}..{end}` endpoint.
pub struct FrankfurterProvider {
    base_url: String,
    http: Arc<dyn HttpClient>,
    store: Arc<CacheStore>,
    ttl: Duration,
}

impl FrankfurterProvider {
    pub fn new(base_url: &str, http: Arc<dyn HttpClient>, store: Arc<CacheStore>) -> Self {
        FrankfurterProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            store,
            ttl: DEFAULT_TREND_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn request_url(&self, from: &str, to: &str, base: &str, today: NaiveDate) -> String {
        let (start, end) = trend_window(today);
        let symbols = trend_symbols(from, to, base);
        let mut url = format!(
            "{}/{}..{}?from={}",
            self.base_url,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
            base
        );
        if !symbols.is_empty() {
            url.push_str("&to=");
            url.push_str(&symbols.join(","));
        }
        url
    }

    async fn fetch_remote(
        &self,
        from: &str,
        to: &str,
        base: &str,
        today: NaiveDate,
    ) -> Result<Vec<TrendPoint>> {
        let url = self.request_url(from, to, base, today);
        debug!("Requesting trend data from {}", url);

        let response = self.http.fetch(&url).await?.error_for_status()?;
        let payload: TimeSeriesResponse = response.json()?;
        let table = to_historical_table(payload.rates);
        debug!(dates = table.len(), "Parsed historical rates");

        build_trend_series(&table, from, to, base, today)
    }
}

#[async_trait]
impl TrendProvider for FrankfurterProvider {
    #[instrument(name = "TrendFetch", skip(self))]
    async fn fetch_trend(
        &self,
        from: &str,
        to: &str,
        base: Option<&str>,
        force_refresh: bool,
    ) -> Result<Vec<TrendPoint>> {
        let (Some(from), Some(to)) = (normalize_currency_code(from), normalize_currency_code(to))
        else {
            return Err(FxError::UpstreamRejected(
                "Trend requires both a source and a target currency".to_string(),
            ));
        };
        let base = match base.and_then(normalize_currency_code) {
            Some(base) => base,
            None => self.store.base_currency().await,
        };
        let today = self.store.clock().today();
        let key = trend_cache_key(&base, &from, &to, today);

        cache_or_fetch::<TrendTable, _, _>(&self.store, &key, self.ttl, force_refresh, || {
            self.fetch_remote(&from, &to, &base, today)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::http::HttpResponse;
    use crate::core::trend::TREND_POINTS;
    use crate::providers::http::ReqwestClient;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store() -> Arc<CacheStore> {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap(),
        ));
        Arc::new(CacheStore::new(clock))
    }

    /// Records requested URLs and answers every request with the same body.
    struct RecordingClient {
        body: String,
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpClient for RecordingClient {
        async fn fetch(&self, url: &str) -> Result<HttpResponse> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(HttpResponse {
                status: 200,
                body: self.body.clone(),
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_trend_from_mock_server() {
        let mock_server = MockServer::start().await;
        let body = r#"{
            "amount": 1.0,
            "base": "USD",
            "start_date": "2024-01-01",
            "end_date": "2024-01-15",
            "rates": {
                "2024-01-02": { "EUR": 0.91, "ZAR": 18.6 },
                "2024-01-10": { "EUR": 0.92, "ZAR": 18.4 },
                "2024-01-12": { "EUR": 0.93, "ZAR": 18.2 }
            }
        }"#;
        Mock::given(method("GET"))
            .and(path("/2024-01-01..2024-01-15"))
            .and(query_param("from", "USD"))
            .and(query_param("to", "EUR,ZAR"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = store();
        let http = Arc::new(ReqwestClient::new().unwrap().with_retries(0, 0));
        let provider = FrankfurterProvider::new(&mock_server.uri(), http, store.clone());

        let series = provider
            .fetch_trend("eur", "zar", Some("USD"), false)
            .await
            .unwrap();
        assert_eq!(series.len(), TREND_POINTS);
        assert_eq!(series[0].date.to_string(), "2024-01-09");
        assert_eq!(series[6].date.to_string(), "2024-01-15");
        assert_eq!(series[0].from_rate, 0.91);
        assert_eq!(series[1].from_rate, 0.92);
        assert_eq!(series[6].to_rate, 18.2);
        assert_eq!(series[6].label, "Jan 15");

        // second call is a cache hit, the mock expects exactly one request
        provider
            .fetch_trend("EUR", "ZAR", Some("USD"), false)
            .await
            .unwrap();
        assert!(store.get::<TrendTable>("USD:EUR->ZAR@2024-01-15").await.is_some());
    }

    #[tokio::test]
    async fn test_request_shaping_excludes_base() {
        let client = Arc::new(RecordingClient {
            body: r#"{"rates": {"2024-01-14": {"ZAR": 18.0}}}"#.to_string(),
            urls: Mutex::new(Vec::new()),
        });
        let store = store();
        store.set_base_currency("USD").await;
        let provider = FrankfurterProvider::new("http://trend.test/", client.clone(), store);

        let series = provider.fetch_trend("USD", "ZAR", None, false).await.unwrap();
        assert!(series.iter().all(|p| p.from_rate == 1.0));
        assert!(series.iter().all(|p| p.to_rate == 18.0));

        let urls = client.urls.lock().unwrap().clone();
        assert_eq!(
            urls,
            vec!["http://trend.test/2024-01-01..2024-01-15?from=USD&to=ZAR".to_string()]
        );
    }

    #[tokio::test]
    async fn test_empty_history_is_unavailable() {
        let client = Arc::new(RecordingClient {
            body: r#"{"amount": 1.0, "base": "USD", "rates": {}}"#.to_string(),
            urls: Mutex::new(Vec::new()),
        });
        let store = store();
        let provider = FrankfurterProvider::new("http://trend.test", client, store.clone());

        let err = provider
            .fetch_trend("EUR", "ZAR", Some("USD"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, FxError::TrendDataUnavailable(_)));
        assert!(store.get::<TrendTable>("USD:EUR->ZAR@2024-01-15").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_currency_is_unavailable() {
        let client = Arc::new(RecordingClient {
            body: r#"{"rates": {"2024-01-12": {"EUR": 0.93, "ZAR": "n/a"}}}"#.to_string(),
            urls: Mutex::new(Vec::new()),
        });
        let provider = FrankfurterProvider::new("http://trend.test", client, store());

        let err = provider
            .fetch_trend("EUR", "ZAR", Some("USD"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, FxError::TrendDataUnavailable(ref c) if c == "ZAR"));
    }

    #[tokio::test]
    async fn test_new_day_misses_cached_series() {
        let client = Arc::new(RecordingClient {
            body: r#"{"rates": {"2024-01-12": {"ZAR": 18.0}}}"#.to_string(),
            urls: Mutex::new(Vec::new()),
        });
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 0).unwrap(),
        ));
        let store = Arc::new(CacheStore::new(clock.clone()));
        let provider = FrankfurterProvider::new("http://trend.test", client.clone(), store);

        let before = provider.fetch_trend("USD", "ZAR", None, false).await.unwrap();
        assert_eq!(before[6].date.to_string(), "2024-01-15");

        clock.advance(chrono::Duration::minutes(2));
        let after = provider.fetch_trend("USD", "ZAR", None, false).await.unwrap();
        assert_eq!(after[6].date.to_string(), "2024-01-16");
        assert_eq!(client.urls.lock().unwrap().len(), 2);
    }
}
