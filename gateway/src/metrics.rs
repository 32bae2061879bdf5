use {
	crate::{
		api_types::MetricsResponse,
		cache::{EntryStats, GatewayCaches},
		consts::MARKET_CACHE_KEY,
	},
};

/// Sums the counters of every chart key. `last_fetch_ms` is not a sum, max or
/// average: it is the non-zero duration of the key fetched most recently.
pub fn rollup_chart(stats: &[EntryStats]) -> EntryStats {
	let mut rollup = EntryStats::default();
	for s in stats {
		rollup.hits += s.hits;
		rollup.misses += s.misses;
		rollup.stale_serves += s.stale_serves;
		if s.last_fetch_ms > 0 && s.fetched_at >= rollup.fetched_at {
			rollup.last_fetch_ms = s.last_fetch_ms;
			rollup.fetched_at = s.fetched_at;
		}
	}
	rollup
}

/// Point-in-time read of both caches; no side effects
pub fn snapshot(caches: &GatewayCaches) -> MetricsResponse {
	let market = caches.market.stats(&MARKET_CACHE_KEY).unwrap_or_default();
	let chart = rollup_chart(&caches.chart.all_stats());

	MetricsResponse {
		market_cache_hits: market.hits,
		market_cache_misses: market.misses,
		market_cache_stale_returns: market.stale_serves,
		market_last_fetch_ms: market.last_fetch_ms,
		chart_cache_hits: chart.hits,
		chart_cache_misses: chart.misses,
		chart_cache_stale_returns: chart.stale_serves,
		chart_last_fetch_ms: chart.last_fetch_ms,
	}
}
