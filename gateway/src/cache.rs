//! In-process cache of upstream payloads.
//!
//! One [`CacheStore`] holds the singleton market snapshot, another the chart
//! series keyed by (coin id, days). Entries are created on first request and
//! live as long as the process; nothing is evicted, so the chart store grows
//! with the number of distinct (coin, range) pairs ever requested.

use {
	dashmap::DashMap,
	serde_json::Value,
	std::{fmt, hash::Hash, time::Duration},
	tokio::time::Instant,
};

/// Outcome of one orchestrated request, sent back as the `X-Cache` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
	Hit,
	Miss,
	Stale,
}

impl CacheStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			CacheStatus::Hit => "HIT",
			CacheStatus::Miss => "MISS",
			CacheStatus::Stale => "STALE",
		}
	}
}

impl fmt::Display for CacheStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Payload and fetch time always travel together
#[derive(Debug, Clone)]
struct Snapshot {
	payload: Value,
	fetched_at: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
	snapshot: Option<Snapshot>,
	/// served from a fresh payload, no upstream call
	pub hits: u64,
	/// triggered an upstream fetch, whatever its outcome
	pub misses: u64,
	/// served an old payload after a failed fetch
	pub stale_serves: u64,
	/// duration of the last successful fetch
	pub last_fetch_ms: u64,
}

impl CacheEntry {
	pub fn payload(&self) -> Option<&Value> {
		self.snapshot.as_ref().map(|s| &s.payload)
	}

	pub fn fetched_at(&self) -> Option<Instant> {
		self.snapshot.as_ref().map(|s| s.fetched_at)
	}

	/// True when a payload exists and is younger than `ttl` at `now`
	pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
		self.snapshot.as_ref().is_some_and(|s| now.saturating_duration_since(s.fetched_at) < ttl)
	}

	/// Replaces the payload with a newer successful fetch
	pub fn store(&mut self, payload: Value, fetched_at: Instant, fetch_duration: Duration) {
		self.snapshot = Some(Snapshot { payload, fetched_at });
		self.last_fetch_ms = u64::try_from(fetch_duration.as_millis()).unwrap_or(u64::MAX);
	}

	pub fn stats(&self) -> EntryStats {
		EntryStats { hits: self.hits, misses: self.misses, stale_serves: self.stale_serves, last_fetch_ms: self.last_fetch_ms, fetched_at: self.fetched_at() }
	}
}

/// Point-in-time copy of an entry's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryStats {
	pub hits: u64,
	pub misses: u64,
	pub stale_serves: u64,
	pub last_fetch_ms: u64,
	pub fetched_at: Option<Instant>,
}

/// Key of the chart series cache
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChartKey {
	pub coin_id: String,
	pub days: String,
}

impl ChartKey {
	pub fn new(coin_id: impl Into<String>, days: impl Into<String>) -> Self {
		Self { coin_id: coin_id.into(), days: days.into() }
	}
}

impl fmt::Display for ChartKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "chart:{}:{}", self.coin_id, self.days)
	}
}

/// Keyed map of [`CacheEntry`]. Never holds a lock across an await.
pub struct CacheStore<K> {
	entries: DashMap<K, CacheEntry>,
}

impl<K: Eq + Hash + Clone> CacheStore<K> {
	pub fn new() -> Self {
		Self { entries: DashMap::new() }
	}

	/// Runs `f` on the entry for `key`, creating an empty entry first if needed.
	/// The shard lock is held only while `f` runs.
	pub fn update<R>(&self, key: &K, f: impl FnOnce(&mut CacheEntry) -> R) -> R {
		let mut entry = self.entries.entry(key.clone()).or_default();
		f(entry.value_mut())
	}

	pub fn stats(&self, key: &K) -> Option<EntryStats> {
		self.entries.get(key).map(|entry| entry.stats())
	}

	pub fn all_stats(&self) -> Vec<EntryStats> {
		self.entries.iter().map(|entry| entry.stats()).collect()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl<K: Eq + Hash + Clone> Default for CacheStore<K> {
	fn default() -> Self {
		Self::new()
	}
}

/// Both caches of the gateway, owned by the app state
#[derive(Default)]
pub struct GatewayCaches {
	pub market: CacheStore<&'static str>,
	pub chart: CacheStore<ChartKey>,
}

impl GatewayCaches {
	pub fn new() -> Self {
		Self::default()
	}
}
