use {
	crate::{
		api_error::ApiError,
		api_types::{MarketChartQuery, MetricsResponse, PingResponse, RefreshQuery, is_valid_coin_id},
		cache::{CacheStatus, ChartKey},
		consts::{MARKET_CACHE_KEY, X_CACHE_HEADER},
		fetch, metrics,
		server::{AppState, ClientInfo},
		upstream::UpstreamError,
	},
	axum::{
		extract::{Extension, Path, Query, State, rejection::QueryRejection},
		response::{IntoResponse, Json, Response},
	},
	serde_json::Value,
};

/// Orchestrated routes always report their outcome in `X-Cache`
fn cached_response(result: Result<(Value, CacheStatus), UpstreamError>) -> Response {
	match result {
		Ok((payload, status)) => ([(X_CACHE_HEADER, status.as_str())], Json(payload)).into_response(),
		Err(err) => ([(X_CACHE_HEADER, CacheStatus::Miss.as_str())], ApiError::from(err)).into_response(),
	}
}

/// Logs a pass-through failure and turns it into the error envelope
pub(crate) fn upstream_failure(client_info: &ClientInfo, route: &str, err: UpstreamError) -> ApiError {
	match &err {
		UpstreamError::ConfigMissing { .. } => tracing::error!("request_id={} - {} not served: {}", client_info.request_id, route, err),
		_ => tracing::warn!("request_id={} - {} failed: {}", client_info.request_id, route, err),
	}
	ApiError::from(err)
}

fn query_error(rejection: QueryRejection) -> Response {
	ApiError::bad_request(rejection.body_text(), "Check the query string parameters").into_response()
}

pub async fn handle_ping() -> Json<PingResponse> {
	Json(PingResponse { message: "gateway ok".to_string() })
}

/// 市场快照 (60s 缓存)
pub async fn handle_market(State(state): State<AppState>, query: Result<Query<RefreshQuery>, QueryRejection>) -> Response {
	let Query(query) = match query {
		Ok(query) => query,
		Err(rejection) => return query_error(rejection),
	};

	let upstream = state.upstream.clone();
	let result = fetch::resolve(&state.caches.market, MARKET_CACHE_KEY, state.cache_ttl, query.force_refresh(), move || async move { upstream.market_snapshot().await }).await;
	cached_response(result)
}

/// 历史价格 按 (coin, days) 缓存
pub async fn handle_market_chart(State(state): State<AppState>, Path(id): Path<String>, query: Result<Query<MarketChartQuery>, QueryRejection>) -> Response {
	let Query(query) = match query {
		Ok(query) => query,
		Err(rejection) => return query_error(rejection),
	};

	if !is_valid_coin_id(&id) {
		return ApiError::bad_request(format!("'{}' is not a valid coin id", id), "Use the coin id from the market list, e.g. 'bitcoin'").into_response();
	}
	let days = match query.validate_days() {
		Ok(days) => days,
		Err(msg) => return ApiError::bad_request(msg, "Pass days=1, 7, 30, 365 or max").into_response(),
	};

	let key = ChartKey::new(id, days);
	let upstream = state.upstream.clone();
	let fetch_key = key.clone();
	let result = fetch::resolve(&state.caches.chart, key, state.cache_ttl, query.force_refresh(), move || async move { upstream.market_chart(&fetch_key.coin_id, &fetch_key.days).await }).await;
	cached_response(result)
}

/// 币种详情 不缓存
pub async fn handle_coin_detail(State(state): State<AppState>, Extension(client_info): Extension<ClientInfo>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
	if !is_valid_coin_id(&id) {
		return Err(ApiError::bad_request(format!("'{}' is not a valid coin id", id), "Use the coin id from the market list, e.g. 'bitcoin'"));
	}

	state.upstream.coin_detail(&id).await.map(Json).map_err(|err| upstream_failure(&client_info, "coin detail", err))
}

pub async fn handle_metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
	Json(metrics::snapshot(&state.caches))
}
