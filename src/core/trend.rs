//! Seven-day rate trend built from a sparse historical table

use super::error::{FxError, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const TREND_POINTS: usize = 7;

/// Days of history requested upstream; twice the series length so weekend
/// and holiday gaps still have an earlier observation to fall back on.
pub const TREND_LOOKBACK_DAYS: i64 = 14;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub label: String,
    pub from_rate: f64,
    pub to_rate: f64,
}

/// `date -> currency -> rate`, ordered by date.
pub type HistoricalTable = BTreeMap<NaiveDate, HashMap<String, f64>>;

/// Cache key for a series; includes the end day so a new UTC day misses.
pub fn trend_cache_key(base: &str, from: &str, to: &str, today: NaiveDate) -> String {
    format!("{base}:{from}->{to}@{today}")
}

/// Inclusive date range to request for a series ending on `today`.
pub fn trend_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today - Duration::days(TREND_LOOKBACK_DAYS), today)
}

/// Symbols to request against `base`: `{from, to}` without the base itself.
pub fn trend_symbols(from: &str, to: &str, base: &str) -> Vec<String> {
    let mut symbols = Vec::with_capacity(2);
    for currency in [from, to] {
        if currency != base && !symbols.iter().any(|s| s == currency) {
            symbols.push(currency.to_string());
        }
    }
    symbols
}

/// Short month/day label, e.g. `Jan 5`.
pub fn trend_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

fn finite_rate(rates: &HashMap<String, f64>, currency: &str) -> Option<f64> {
    rates.get(currency).copied().filter(|r| r.is_finite())
}

/// Rate of `currency` on `target`, relative to `base`.
///
/// Uses the latest observation on or before `target`; when the target
/// precedes every observation, the earliest one is used instead.
pub fn resolve_rate_for_date(
    currency: &str,
    base: &str,
    target: NaiveDate,
    table: &HistoricalTable,
) -> Result<f64> {
    if currency == base {
        return Ok(1.0);
    }

    let prior = table
        .range(..=target)
        .rev()
        .find_map(|(_, rates)| finite_rate(rates, currency));
    if let Some(rate) = prior {
        return Ok(rate);
    }

    table
        .values()
        .find_map(|rates| finite_rate(rates, currency))
        .ok_or_else(|| FxError::TrendDataUnavailable(currency.to_string()))
}

/// Builds the [`TREND_POINTS`] daily points ending on `today`.
///
/// Fails as a whole if the table is empty or either currency cannot be
/// resolved; partial series are never returned.
pub fn build_trend_series(
    table: &HistoricalTable,
    from: &str,
    to: &str,
    base: &str,
    today: NaiveDate,
) -> Result<Vec<TrendPoint>> {
    if table.is_empty() {
        return Err(FxError::TrendDataUnavailable(format!("{from}->{to}")));
    }

    (0..TREND_POINTS)
        .rev()
        .map(|days_back| -> Result<TrendPoint> {
            let date = today - Duration::days(days_back as i64);
            Ok(TrendPoint {
                date,
                label: trend_label(date),
                from_rate: resolve_rate_for_date(from, base, date, table)?,
                to_rate: resolve_rate_for_date(to, base, date, table)?,
            })
        })
        .collect()
}

#[async_trait]
pub trait TrendProvider: Send + Sync {
    /// Daily `from`/`to` rates for the last week, quoted against `base`
    /// (the preferred base currency when `None`).
    async fn fetch_trend(
        &self,
        from: &str,
        to: &str,
        base: Option<&str>,
        force_refresh: bool,
    ) -> Result<Vec<TrendPoint>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn table(rows: &[(&str, &[(&str, f64)])]) -> HistoricalTable {
        rows.iter()
            .map(|(d, rates)| {
                (
                    date(d),
                    rates.iter().map(|(c, r)| (c.to_string(), *r)).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_resolve_prior_and_earliest_fallback() {
        let t = table(&[("2024-01-01", &[("EUR", 0.9)])]);
        assert_eq!(
            resolve_rate_for_date("EUR", "USD", date("2024-01-10"), &t).unwrap(),
            0.9
        );
        assert_eq!(
            resolve_rate_for_date("EUR", "USD", date("2023-12-01"), &t).unwrap(),
            0.9
        );
    }

    #[test]
    fn test_resolve_prefers_latest_prior_date() {
        let t = table(&[
            ("2024-01-01", &[("EUR", 0.90), ("ZAR", 18.0)]),
            ("2024-01-03", &[("EUR", 0.92)]),
            ("2024-01-05", &[("EUR", 0.95), ("ZAR", f64::NAN)]),
        ]);
        assert_eq!(
            resolve_rate_for_date("EUR", "USD", date("2024-01-04"), &t).unwrap(),
            0.92
        );
        assert_eq!(
            resolve_rate_for_date("EUR", "USD", date("2024-01-05"), &t).unwrap(),
            0.95
        );
        // NaN on the 5th is skipped in favour of the 1st.
        assert_eq!(
            resolve_rate_for_date("ZAR", "USD", date("2024-01-06"), &t).unwrap(),
            18.0
        );
    }

    #[test]
    fn test_resolve_base_is_one() {
        let t = HistoricalTable::new();
        assert_eq!(
            resolve_rate_for_date("USD", "USD", date("2024-01-01"), &t).unwrap(),
            1.0
        );
    }

    #[test]
    fn test_resolve_unavailable_currency() {
        let t = table(&[("2024-01-01", &[("EUR", 0.9)])]);
        let err = resolve_rate_for_date("ZAR", "USD", date("2024-01-01"), &t).unwrap_err();
        assert!(matches!(err, FxError::TrendDataUnavailable(ref c) if c == "ZAR"));
    }

    #[test]
    fn test_build_series_shape() {
        let today = date("2024-01-10");
        let t = table(&[
            ("2023-12-27", &[("EUR", 0.91), ("ZAR", 18.5)]),
            ("2024-01-05", &[("EUR", 0.93), ("ZAR", 18.2)]),
            ("2024-01-08", &[("EUR", 0.94), ("ZAR", 18.1)]),
        ]);

        let series = build_trend_series(&t, "USD", "ZAR", "USD", today).unwrap();
        assert_eq!(series.len(), TREND_POINTS);
        assert_eq!(series.first().unwrap().date, date("2024-01-04"));
        assert_eq!(series.last().unwrap().date, today);
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
        assert!(series.iter().all(|p| p.from_rate == 1.0));

        let to_rates: Vec<f64> = series.iter().map(|p| p.to_rate).collect();
        assert_eq!(to_rates, vec![18.5, 18.2, 18.2, 18.2, 18.1, 18.1, 18.1]);
        assert_eq!(series[0].label, "Jan 4");
        assert_eq!(series[6].label, "Jan 10");
    }

    #[test]
    fn test_build_series_errors() {
        let today = date("2024-01-10");
        let err = build_trend_series(&HistoricalTable::new(), "EUR", "ZAR", "USD", today)
            .unwrap_err();
        assert!(matches!(err, FxError::TrendDataUnavailable(_)));

        let t = table(&[("2024-01-09", &[("EUR", 0.9)])]);
        let err = build_trend_series(&t, "EUR", "ZAR", "USD", today).unwrap_err();
        assert!(matches!(err, FxError::TrendDataUnavailable(ref c) if c == "ZAR"));
    }

    #[test]
    fn test_request_shaping() {
        assert_eq!(trend_symbols("EUR", "ZAR", "USD"), vec!["EUR", "ZAR"]);
        assert_eq!(trend_symbols("USD", "ZAR", "USD"), vec!["ZAR"]);
        assert_eq!(trend_symbols("EUR", "EUR", "USD"), vec!["EUR"]);
        assert!(trend_symbols("USD", "USD", "USD").is_empty());
        assert_eq!(
            trend_cache_key("USD", "EUR", "ZAR", date("2024-01-15")),
            "USD:EUR->ZAR@2024-01-15"
        );
        assert_eq!(
            trend_window(date("2024-01-15")),
            (date("2024-01-01"), date("2024-01-15"))
        );
    }
}
