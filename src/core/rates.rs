//! Latest exchange rates: record type, normalization and provider trait

use super::currency::{
    CurrencyLocalizer, FlagResolver, FlagTable, StaticLocalizer, display_name_or_code,
    symbol_or_code,
};
use super::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    pub id: String,
    pub currency: String,
    pub currency_name: String,
    pub symbol: String,
    /// Units of `currency` per one unit of the base currency.
    pub rate: f64,
    pub flag: String,
    pub updated_at: String,
}

/// Turns a raw `code -> rate` map into display-ready [`RateRecord`]s.
#[derive(Clone)]
pub struct RateNormalizer {
    localizer: Arc<dyn CurrencyLocalizer>,
    flags: Arc<dyn FlagResolver>,
}

impl Default for RateNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(StaticLocalizer), Arc::new(FlagTable::new()))
    }
}

impl RateNormalizer {
    pub fn new(localizer: Arc<dyn CurrencyLocalizer>, flags: Arc<dyn FlagResolver>) -> Self {
        Self { localizer, flags }
    }

    fn record(&self, currency: &str, rate: f64, updated_at: &str) -> RateRecord {
        RateRecord {
            id: currency.to_string(),
            currency: currency.to_string(),
            currency_name: display_name_or_code(self.localizer.as_ref(), currency),
            symbol: symbol_or_code(self.localizer.as_ref(), currency),
            rate,
            flag: self.flags.flag_url(currency),
            updated_at: updated_at.to_string(),
        }
    }

    /// Builds one record per currency, sorted by code, with `base_currency`
    /// always present at rate 1.
    ///
    /// Codes are uppercased; when two raw keys collapse to the same code the
    /// ordinally first key wins. Non-finite or non-positive rates are dropped.
    pub fn normalize(
        &self,
        raw: &BTreeMap<String, f64>,
        base_currency: &str,
        updated_at: Option<&str>,
        now: DateTime<Utc>,
    ) -> Vec<RateRecord> {
        let updated_at = updated_at
            .map(str::to_string)
            .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true));
        let base = base_currency.trim().to_uppercase();

        let mut records: BTreeMap<String, RateRecord> = BTreeMap::new();
        for (code, rate) in raw {
            let currency = code.trim().to_uppercase();
            if currency.is_empty() || records.contains_key(&currency) {
                continue;
            }
            if !rate.is_finite() || *rate <= 0.0 {
                debug!("Dropping unusable rate {} for {}", rate, currency);
                continue;
            }
            let rate = if currency == base { 1.0 } else { *rate };
            records.insert(currency.clone(), self.record(&currency, rate, &updated_at));
        }

        if !records.contains_key(&base) {
            debug!("Base currency {} missing from payload, adding it at rate 1", base);
            records.insert(base.clone(), self.record(&base, 1.0, &updated_at));
        }

        records.into_values().collect()
    }
}

/// Case-insensitive match on code, display name or symbol.
pub fn search_rates<'a>(records: &'a [RateRecord], query: &str) -> Vec<&'a RateRecord> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|r| {
            r.currency.to_lowercase().contains(&query)
                || r.currency_name.to_lowercase().contains(&query)
                || r.symbol.to_lowercase().contains(&query)
        })
        .collect()
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Latest rates quoted against `base_currency`, or against the preferred
    /// base currency when `None`.
    async fn fetch_rates(
        &self,
        base_currency: Option<&str>,
        force_refresh: bool,
    ) -> Result<Vec<RateRecord>>;
}
