pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::{CacheStore, SystemClock};
use crate::providers::{
    FrankfurterProvider, OpenErApiProvider, ReqwestClient, Rss2JsonNewsProvider,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub enum AppCommand {
    Rates {
        base: Option<String>,
        search: Option<String>,
        refresh: bool,
    },
    Convert {
        query: String,
        refresh: bool,
    },
    Trend {
        from: String,
        to: String,
        base: Option<String>,
        refresh: bool,
    },
    News {
        currency: Option<String>,
        refresh: bool,
    },
    Base {
        code: Option<String>,
    },
}

/// Shared cache store and the providers wired to it.
pub struct AppContext {
    pub store: Arc<CacheStore>,
    pub rates: OpenErApiProvider,
    pub trend: FrankfurterProvider,
    pub news: Rss2JsonNewsProvider,
}

impl AppContext {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let data_path = match config.default_data_path() {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("No data directory: {:#}", e);
                None
            }
        };
        let snapshots = store::open_snapshot_store(data_path.as_deref(), config.cache.persist);
        let store = Arc::new(CacheStore::open(
            Arc::new(SystemClock),
            snapshots,
            &config.currency,
        ));

        let http = Arc::new(ReqwestClient::new()?);
        let providers = &config.providers;
        Ok(Self {
            rates: OpenErApiProvider::new(&providers.rates.base_url, http.clone(), store.clone())
                .with_ttl(config.cache.rates_ttl()),
            trend: FrankfurterProvider::new(&providers.trend.base_url, http.clone(), store.clone())
                .with_ttl(config.cache.trend_ttl()),
            news: Rss2JsonNewsProvider::new(&providers.news.base_url, http, store.clone())
                .with_ttl(config.cache.news_ttl()),
            store,
        })
    }
}

pub async fn run_command(cmd: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxcache starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let ctx = AppContext::from_config(&config)?;
    let now = ctx.store.now();

    match cmd {
        AppCommand::Rates {
            base,
            search,
            refresh,
        } => {
            let base = cli::base::resolve_currency(&ctx.store, base.as_deref()).await;
            cli::rates::run(&ctx.rates, &base, search.as_deref(), refresh, now).await
        }
        AppCommand::Convert { query, refresh } => {
            cli::convert::run(&ctx.rates, &ctx.trend, &query, refresh, now).await
        }
        AppCommand::Trend {
            from,
            to,
            base,
            refresh,
        } => cli::trend::run(&ctx.trend, &from, &to, base.as_deref(), refresh).await,
        AppCommand::News { currency, refresh } => {
            let currency = cli::base::resolve_currency(&ctx.store, currency.as_deref()).await;
            cli::news::run(&ctx.news, &currency, refresh).await
        }
        AppCommand::Base { code } => cli::base::run(&ctx.store, code.as_deref()).await,
    }
}
