use crate::core::cache::{CacheStore, CacheTable};
use crate::core::error::Result;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Serves `key` from table `T` while fresh, otherwise runs `fetch` and
/// writes the result through.
///
/// Expired entries are purged first and a stale entry is never returned.
/// `force_refresh` skips the lookup but still stores the fresh result. A
/// failed fetch leaves any existing entry untouched. If the returned future
/// is dropped mid-fetch nothing is written.
pub async fn cache_or_fetch<T, F, Fut>(
    store: &CacheStore,
    key: &str,
    ttl: Duration,
    force_refresh: bool,
    fetch: F,
) -> Result<T::Data>
where
    T: CacheTable,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T::Data>>,
{
    store.purge_expired().await;

    if force_refresh {
        debug!("Forced refresh for {} key: {}", T::NAME, key);
    } else if let Some(entry) = store.get::<T>(key).await {
        if entry.is_fresh_at(store.now()) {
            return Ok(entry.data);
        }
        debug!("Ignoring stale {} entry for key: {}", T::NAME, key);
    }

    let data = fetch().await?;
    store.set::<T>(key, data.clone(), ttl).await;
    Ok(data)
}
