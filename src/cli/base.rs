use super::ui;
use crate::core::CacheStore;
use crate::core::currency::{is_supported, normalize_currency_code};
use anyhow::{Result, bail};

/// `code` normalized, or the preferred base currency when blank or absent.
pub async fn resolve_currency(store: &CacheStore, code: Option<&str>) -> String {
    match code.and_then(normalize_currency_code) {
        Some(code) => code,
        None => store.base_currency().await,
    }
}

/// Shows the preferred base currency, or replaces it when `code` is given.
pub async fn run(store: &CacheStore, code: Option<&str>) -> Result<()> {
    let Some(code) = code else {
        println!(
            "Base currency: {}",
            ui::style_text(&store.base_currency().await, ui::StyleType::Value)
        );
        return Ok(());
    };

    let Some(normalized) = normalize_currency_code(code).filter(|c| is_supported(c)) else {
        bail!("Unsupported currency code: {}", code.trim());
    };

    store.set_base_currency(&normalized).await;
    println!(
        "Base currency set to {}",
        ui::style_text(&normalized, ui::StyleType::Value)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SystemClock;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_set_base_currency() {
        let store = CacheStore::new(Arc::new(SystemClock));
        run(&store, Some(" eur ")).await.unwrap();
        assert_eq!(store.base_currency().await, "EUR");
        run(&store, None).await.unwrap();
    }

    #[tokio::test]
    async fn test_resolve_currency() {
        let store = CacheStore::new(Arc::new(SystemClock));
        store.set_base_currency("GBP").await;
        assert_eq!(resolve_currency(&store, None).await, "GBP");
        assert_eq!(resolve_currency(&store, Some("  ")).await, "GBP");
        assert_eq!(resolve_currency(&store, Some(" zar")).await, "ZAR");
    }

    #[tokio::test]
    async fn test_rejects_unknown_code() {
        let store = CacheStore::new(Arc::new(SystemClock));
        let err = run(&store, Some("ABC")).await.unwrap_err();
        assert!(err.to_string().contains("Unsupported currency code: ABC"));
        assert_eq!(store.base_currency().await, "USD");
    }
}
