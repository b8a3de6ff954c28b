//! Currency news: raw feed items, normalized records and provider trait

use super::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

pub const MAX_NEWS_ITEMS: usize = 12;
pub const UNTITLED: &str = "Untitled";
pub const DEFAULT_SOURCE: &str = "Google News";
pub const DEFAULT_DESCRIPTION: &str = "Currency market update";

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid markup tag regex"));

/// One entry of an RSS-to-JSON feed. Every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNewsItem {
    pub title: Option<String>,
    #[serde(rename = "pubDate")]
    pub pub_date: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub id: String,
    pub title: String,
    pub link: String,
    pub source: String,
    pub published_at: String,
    pub description: String,
    pub currency: String,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Replaces markup tags with spaces and collapses whitespace runs.
pub fn strip_markup(value: &str) -> String {
    MARKUP_TAG
        .replace_all(value, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Filters, defaults and orders feed items for `currency`, newest first.
///
/// Items lacking both a title and a link are dropped, as are repeats of a
/// link already seen. At most [`MAX_NEWS_ITEMS`] survive.
pub fn normalize_news(
    items: &[RawNewsItem],
    currency: &str,
    now: DateTime<Utc>,
) -> Vec<NewsRecord> {
    let mut seen_links = HashSet::new();
    let mut records: Vec<NewsRecord> = items
        .iter()
        .filter(|&item| {
            let link = non_blank(item.link.as_deref());
            if let Some(link) = link {
                if !seen_links.insert(link) {
                    return false;
                }
            }
            non_blank(item.title.as_deref()).is_some() || link.is_some()
        })
        .take(MAX_NEWS_ITEMS)
        .enumerate()
        .map(|(index, item)| {
            let link = non_blank(item.link.as_deref()).unwrap_or_default();
            let id = if link.is_empty() {
                format!("{currency}-{index}")
            } else {
                format!("{currency}-{link}")
            };
            let description = strip_markup(item.description.as_deref().unwrap_or_default());

            NewsRecord {
                id,
                title: non_blank(item.title.as_deref())
                    .unwrap_or(UNTITLED)
                    .to_string(),
                link: link.to_string(),
                source: non_blank(item.author.as_deref())
                    .unwrap_or(DEFAULT_SOURCE)
                    .to_string(),
                published_at: non_blank(item.pub_date.as_deref())
                    .map(str::to_string)
                    .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true)),
                description: if description.is_empty() {
                    DEFAULT_DESCRIPTION.to_string()
                } else {
                    description
                },
                currency: currency.to_string(),
            }
        })
        .collect();

    records.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    records
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Recent headlines for `currency` (the preferred base currency when `None`).
    async fn fetch_news(
        &self,
        currency: Option<&str>,
        force_refresh: bool,
    ) -> Result<Vec<NewsRecord>>;
}
