//! Currency conversion and the small parsing/formatting helpers around it

use super::error::{FxError, Result};
use super::rates::RateRecord;
use chrono::{DateTime, Utc};
use num_format::{Locale, ToFormattedString};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static CONVERSION_QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9]*\.?[0-9]+)\s+([a-z]{3})\s+(?:in|to)\s+([a-z]{3})$")
        .expect("Invalid conversion query regex")
});

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionQuery {
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
}

/// `currency -> rate` for every record.
pub fn build_rate_map(records: &[RateRecord]) -> HashMap<String, f64> {
    records
        .iter()
        .map(|r| (r.currency.clone(), r.rate))
        .collect()
}

/// Converts `amount` of `from` into `to`.
///
/// Both rates must be quoted against the same reference currency.
pub fn convert(
    amount: f64,
    from: &str,
    to: &str,
    rates: &HashMap<String, f64>,
) -> Result<f64> {
    let missing = || FxError::MissingRate {
        from: from.to_string(),
        to: to.to_string(),
    };
    let from_rate = *rates.get(from).ok_or_else(missing)?;
    let to_rate = *rates.get(to).ok_or_else(missing)?;
    if from_rate == 0.0 {
        return Err(missing());
    }

    let amount_in_reference = amount / from_rate;
    Ok(amount_in_reference * to_rate)
}

/// Parses queries like `100 usd to zar` or `2.5 EUR in GBP`.
pub fn parse_conversion_query(value: &str) -> Option<ConversionQuery> {
    let clean = value.split_whitespace().collect::<Vec<_>>().join(" ");
    let captures = CONVERSION_QUERY.captures(&clean)?;

    let amount: f64 = captures[1].parse().ok()?;
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }

    Some(ConversionQuery {
        amount,
        from_currency: captures[2].to_uppercase(),
        to_currency: captures[3].to_uppercase(),
    })
}

/// Two decimals with thousands separators, e.g. `1,800.00 ZAR`.
pub fn format_output_amount(amount: f64, currency: &str) -> String {
    if !amount.is_finite() {
        return format!("{amount} {currency}");
    }
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    let grouped = int_part
        .parse::<u128>()
        .map_or_else(|_| int_part.to_string(), |n| n.to_formatted_string(&Locale::en));
    format!("{sign}{grouped}.{frac_part} {currency}")
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Human label for how long ago rates were refreshed.
pub fn relative_time_label(updated_at: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(updated) = updated_at.and_then(|v| parse_timestamp(v.trim())) else {
        return "Updated recently".to_string();
    };

    let plural = |n: i64| if n == 1 { "" } else { "s" };
    let seconds = (now - updated).num_seconds().max(0);
    if seconds < 60 {
        return format!("Updated {seconds} second{} ago", plural(seconds));
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("Updated {minutes} minute{} ago", plural(minutes));
    }
    let hours = minutes / 60;
    format!("Updated {hours} hour{} ago", plural(hours))
}
