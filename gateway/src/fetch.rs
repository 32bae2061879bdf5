//! Cache-aware fetch: decides per request between serving the cached
//! payload, fetching a fresh one, or falling back to a stale one when the
//! upstream call fails.
//!
//! Every call lands in exactly one bucket: `hits` when served fresh,
//! `misses` when an upstream fetch is issued. `stale_serves` counts the
//! failed fetches among those misses that still returned a payload.
//!
//! Concurrent misses on one key are not coalesced. Each issues its own
//! upstream call and the last one to complete wins the entry.

use {
	crate::cache::{CacheStatus, CacheStore},
	serde_json::Value,
	std::{fmt, future::Future, hash::Hash, time::Duration},
	tokio::time::Instant,
	tracing::{debug, error, info, warn},
};

/// Resolves `key` against `store`.
///
/// A cached payload younger than `ttl` is returned without calling
/// `fetch_upstream`, unless `force_refresh` is set. A failed fetch falls back
/// to the cached payload whatever its age; only a key that never had a
/// successful fetch propagates the upstream error.
pub async fn resolve<K, F, Fut, E>(store: &CacheStore<K>, key: K, ttl: Duration, force_refresh: bool, fetch_upstream: F) -> Result<(Value, CacheStatus), E>
where
	K: Eq + Hash + Clone + fmt::Display,
	F: FnOnce() -> Fut,
	Fut: Future<Output = Result<Value, E>>,
	E: fmt::Display,
{
	let cached = store.update(&key, |entry| {
		if !force_refresh && entry.is_fresh(Instant::now(), ttl) {
			entry.hits += 1;
			entry.payload().cloned()
		} else {
			entry.misses += 1;
			None
		}
	});

	if let Some(payload) = cached {
		debug!("cache {} HIT", key);
		return Ok((payload, CacheStatus::Hit));
	}

	// 锁已释放 上游请求期间其他请求可以并发读写同一个 key
	let started = Instant::now();
	match fetch_upstream().await {
		Ok(payload) => {
			let elapsed = started.elapsed();
			store.update(&key, |entry| entry.store(payload.clone(), Instant::now(), elapsed));
			info!("cache {} MISS, fetched in {}ms (force_refresh={})", key, elapsed.as_millis(), force_refresh);
			Ok((payload, CacheStatus::Miss))
		}
		Err(err) => {
			let stale = store.update(&key, |entry| {
				let payload = entry.payload().cloned();
				if payload.is_some() {
					entry.stale_serves += 1;
				}
				payload
			});

			match stale {
				Some(payload) => {
					warn!("cache {} STALE, upstream failed: {}", key, err);
					Ok((payload, CacheStatus::Stale))
				}
				None => {
					error!("cache {} has no payload and upstream failed: {}", key, err);
					Err(err)
				}
			}
		}
	}
}
