//! Cache-aware fetch: HIT / MISS / STALE decisions and counters.
//!
//! Runs on paused tokio time so that TTL expiry is driven by `advance`.

use {
	gateway::{
		cache::{CacheStatus, CacheStore, ChartKey},
		consts::MARKET_CACHE_KEY,
		fetch::resolve,
	},
	serde_json::{Value, json},
	std::{
		sync::{
			Arc,
			atomic::{AtomicUsize, Ordering},
		},
		time::Duration,
	},
	tokio::time::{advance, sleep},
};

const TTL: Duration = Duration::from_secs(60);

fn bitcoin_snapshot() -> Value {
	json!([{ "id": "bitcoin", "price": 50000 }])
}

/// 返回固定 payload 并记录调用次数
async fn fetch_ok(calls: &AtomicUsize, payload: Value) -> Result<Value, String> {
	calls.fetch_add(1, Ordering::SeqCst);
	Ok(payload)
}

async fn fetch_err(calls: &AtomicUsize) -> Result<Value, String> {
	calls.fetch_add(1, Ordering::SeqCst);
	Err("upstream unavailable".to_string())
}

#[tokio::test(start_paused = true)]
async fn test_first_call_misses_then_hits() {
	let store = CacheStore::new();
	let calls = AtomicUsize::new(0);

	let (payload, status) = resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_ok(&calls, bitcoin_snapshot())).await.unwrap();
	assert_eq!(status, CacheStatus::Miss);
	assert_eq!(payload, bitcoin_snapshot());
	let stats = store.stats(&MARKET_CACHE_KEY).unwrap();
	assert_eq!(stats.misses, 1);
	assert_eq!(stats.hits, 0);

	let (payload, status) = resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_ok(&calls, json!(["should not be fetched"]))).await.unwrap();
	assert_eq!(status, CacheStatus::Hit);
	assert_eq!(payload, bitcoin_snapshot());
	assert_eq!(calls.load(Ordering::SeqCst), 1, "a hit must not call upstream");

	let stats = store.stats(&MARKET_CACHE_KEY).unwrap();
	assert_eq!(stats.hits, 1);
	assert_eq!(stats.misses, 1, "misses unchanged by a hit");
	assert_eq!(stats.stale_serves, 0);
}

#[tokio::test(start_paused = true)]
async fn test_hit_just_before_ttl_and_refetch_at_ttl() {
	let store = CacheStore::new();
	let calls = AtomicUsize::new(0);

	resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_ok(&calls, json!([1]))).await.unwrap();

	advance(TTL - Duration::from_millis(1)).await;
	let (_, status) = resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_ok(&calls, json!([2]))).await.unwrap();
	assert_eq!(status, CacheStatus::Hit);

	advance(Duration::from_millis(1)).await;
	let (payload, status) = resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_ok(&calls, json!([2]))).await.unwrap();
	assert_eq!(status, CacheStatus::Miss, "an entry exactly ttl old is no longer fresh");
	assert_eq!(payload, json!([2]));
	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_expired_success_replaces_payload() {
	let store = CacheStore::new();
	let calls = AtomicUsize::new(0);

	resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_ok(&calls, json!([{ "id": "bitcoin", "price": 50000 }]))).await.unwrap();
	advance(Duration::from_secs(61)).await;

	let (payload, status) = resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_ok(&calls, json!([{ "id": "bitcoin", "price": 51000 }]))).await.unwrap();
	assert_eq!(status, CacheStatus::Miss);
	assert_eq!(payload[0]["price"], 51000);

	let (payload, status) = resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_ok(&calls, json!([]))).await.unwrap();
	assert_eq!(status, CacheStatus::Hit);
	assert_eq!(payload[0]["price"], 51000, "the hit serves the newly fetched payload");
	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_stale_served_after_ttl_when_upstream_fails() {
	let store = CacheStore::new();
	let calls = AtomicUsize::new(0);

	resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_ok(&calls, bitcoin_snapshot())).await.unwrap();
	resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_ok(&calls, bitcoin_snapshot())).await.unwrap();

	advance(Duration::from_secs(61)).await;
	let (payload, status) = resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_err(&calls)).await.unwrap();
	assert_eq!(status, CacheStatus::Stale);
	assert_eq!(payload, bitcoin_snapshot());

	let stats = store.stats(&MARKET_CACHE_KEY).unwrap();
	assert_eq!(stats.stale_serves, 1);
	assert_eq!(stats.hits, 1);
	assert_eq!(stats.misses, 2, "the failed fetch still counts as a miss");
}

#[tokio::test(start_paused = true)]
async fn test_stale_served_regardless_of_age() {
	let store = CacheStore::new();
	let calls = AtomicUsize::new(0);

	resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_ok(&calls, bitcoin_snapshot())).await.unwrap();

	for _ in 0..3 {
		advance(Duration::from_secs(24 * 3600)).await;
		let (payload, status) = resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_err(&calls)).await.unwrap();
		assert_eq!(status, CacheStatus::Stale);
		assert_eq!(payload, bitcoin_snapshot());
	}
	assert_eq!(store.stats(&MARKET_CACHE_KEY).unwrap().stale_serves, 3);
}

#[tokio::test(start_paused = true)]
async fn test_fresh_key_failure_propagates() {
	let store: CacheStore<ChartKey> = CacheStore::new();
	let calls = AtomicUsize::new(0);
	let key = ChartKey::new("bitcoin", "7");

	let result = resolve(&store, key.clone(), TTL, false, || fetch_err(&calls)).await;
	assert_eq!(result.unwrap_err(), "upstream unavailable");

	let stats = store.stats(&key).expect("entry is created on first request");
	assert_eq!(stats.stale_serves, 0);
	assert_eq!(stats.misses, 1);
	assert!(stats.fetched_at.is_none(), "no payload after a failed first fetch");

	// 失败之后再成功 与普通首次请求一样
	let (_, status) = resolve(&store, key.clone(), TTL, false, || fetch_ok(&calls, json!({ "prices": [] }))).await.unwrap();
	assert_eq!(status, CacheStatus::Miss);
}

#[tokio::test(start_paused = true)]
async fn test_force_refresh_bypasses_valid_cache() {
	let store = CacheStore::new();
	let calls = AtomicUsize::new(0);

	resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_ok(&calls, json!([1]))).await.unwrap();
	let (payload, status) = resolve(&store, MARKET_CACHE_KEY, TTL, true, || fetch_ok(&calls, json!([2]))).await.unwrap();

	assert_eq!(status, CacheStatus::Miss);
	assert_eq!(payload, json!([2]));
	assert_eq!(calls.load(Ordering::SeqCst), 2);

	let stats = store.stats(&MARKET_CACHE_KEY).unwrap();
	assert_eq!(stats.misses, 2);
	assert_eq!(stats.hits, 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_force_refresh_keeps_payload_and_fetch_time() {
	let store = CacheStore::new();
	let calls = AtomicUsize::new(0);

	resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_ok(&calls, bitcoin_snapshot())).await.unwrap();
	let fetched_at = store.stats(&MARKET_CACHE_KEY).unwrap().fetched_at;

	advance(Duration::from_secs(10)).await;
	let (payload, status) = resolve(&store, MARKET_CACHE_KEY, TTL, true, || fetch_err(&calls)).await.unwrap();
	assert_eq!(status, CacheStatus::Stale);
	assert_eq!(payload, bitcoin_snapshot());
	assert_eq!(store.stats(&MARKET_CACHE_KEY).unwrap().fetched_at, fetched_at);

	// 原来的 payload 还在有效期内
	let (_, status) = resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_err(&calls)).await.unwrap();
	assert_eq!(status, CacheStatus::Hit);
}

#[tokio::test(start_paused = true)]
async fn test_hits_plus_misses_equals_requests() {
	let store = CacheStore::new();
	let calls = AtomicUsize::new(0);
	let mut requests = 0u64;

	// 空 key 上先失败一次
	let _ = resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_err(&calls)).await;
	requests += 1;

	for round in 0..5u64 {
		let _ = resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_ok(&calls, json!([round]))).await;
		let _ = resolve(&store, MARKET_CACHE_KEY, TTL, false, || fetch_ok(&calls, json!([round]))).await;
		let _ = resolve(&store, MARKET_CACHE_KEY, TTL, round % 2 == 0, || fetch_err(&calls)).await;
		requests += 3;
		advance(Duration::from_secs(45)).await;
	}

	let stats = store.stats(&MARKET_CACHE_KEY).unwrap();
	assert_eq!(stats.hits + stats.misses, requests);
	assert!(stats.stale_serves <= stats.misses);
	assert_eq!(stats.misses, calls.load(Ordering::SeqCst) as u64, "every miss issued exactly one upstream call");
}

#[tokio::test(start_paused = true)]
async fn test_chart_keys_are_independent() {
	let store: CacheStore<ChartKey> = CacheStore::new();
	let calls = AtomicUsize::new(0);
	let week = ChartKey::new("bitcoin", "7");
	let month = ChartKey::new("bitcoin", "30");

	resolve(&store, week.clone(), TTL, false, || fetch_ok(&calls, json!({ "prices": [[1, 1.0]] }))).await.unwrap();
	let (payload, status) = resolve(&store, month.clone(), TTL, false, || fetch_ok(&calls, json!({ "prices": [[1, 2.0]] }))).await.unwrap();
	assert_eq!(status, CacheStatus::Miss);
	assert_eq!(payload["prices"][0][1], 2.0);

	let (payload, status) = resolve(&store, week.clone(), TTL, false, || fetch_err(&calls)).await.unwrap();
	assert_eq!(status, CacheStatus::Hit);
	assert_eq!(payload["prices"][0][1], 1.0);

	assert_eq!(store.len(), 2);
	assert_eq!(store.stats(&week).unwrap().hits, 1);
	assert_eq!(store.stats(&month).unwrap().hits, 0);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_misses_last_completed_fetch_wins() {
	let store = CacheStore::new();
	let calls = Arc::new(AtomicUsize::new(0));

	let slow_calls = calls.clone();
	let slow = resolve(&store, MARKET_CACHE_KEY, TTL, false, move || async move {
		slow_calls.fetch_add(1, Ordering::SeqCst);
		sleep(Duration::from_millis(200)).await;
		Ok::<_, String>(json!(["slow"]))
	});
	let fast_calls = calls.clone();
	let fast = resolve(&store, MARKET_CACHE_KEY, TTL, false, move || async move {
		fast_calls.fetch_add(1, Ordering::SeqCst);
		sleep(Duration::from_millis(50)).await;
		Ok::<_, String>(json!(["fast"]))
	});

	let (slow, fast) = tokio::join!(slow, fast);
	assert_eq!(slow.unwrap().1, CacheStatus::Miss);
	assert_eq!(fast.unwrap().1, CacheStatus::Miss);
	assert_eq!(calls.load(Ordering::SeqCst), 2, "concurrent misses are not coalesced");

	let (payload, status) = resolve(&store, MARKET_CACHE_KEY, TTL, false, || async { Err::<Value, _>("unused".to_string()) }).await.unwrap();
	assert_eq!(status, CacheStatus::Hit);
	assert_eq!(payload, json!(["slow"]), "the fetch that completed last owns the entry");
	assert_eq!(store.stats(&MARKET_CACHE_KEY).unwrap().misses, 2);
}

#[tokio::test(start_paused = true)]
async fn test_last_fetch_duration_recorded() {
	let store = CacheStore::new();

	resolve(&store, MARKET_CACHE_KEY, TTL, false, || async {
		sleep(Duration::from_millis(120)).await;
		Ok::<_, String>(json!([]))
	})
	.await
	.unwrap();

	let last_fetch_ms = store.stats(&MARKET_CACHE_KEY).unwrap().last_fetch_ms;
	assert!((120..130).contains(&last_fetch_ms), "last_fetch_ms = {}", last_fetch_ms);

	// 失败的请求不更新耗时
	advance(Duration::from_secs(61)).await;
	resolve(&store, MARKET_CACHE_KEY, TTL, false, || async {
		sleep(Duration::from_millis(500)).await;
		Err::<Value, _>("timeout".to_string())
	})
	.await
	.unwrap();
	assert_eq!(store.stats(&MARKET_CACHE_KEY).unwrap().last_fetch_ms, last_fetch_ms);
}
