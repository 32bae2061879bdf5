use {
	crate::{
		cache::GatewayCaches,
		handlers::{handle_coin_detail, handle_market, handle_market_chart, handle_metrics, handle_ping},
		upstream::UpstreamClient,
		wallet_handlers::{handle_contact, handle_token_metadata, handle_wallet_balance, handle_wallet_tokens, handle_wallet_transactions},
	},
	axum::{
		Router,
		extract::{ConnectInfo, Request},
		http::HeaderName,
		middleware::{self, Next},
		response::Response,
		routing::{get, post},
	},
	std::{net::SocketAddr, sync::Arc, time::Duration},
	tower_http::{
		compression::CompressionLayer,
		cors::{Any, CorsLayer},
		request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	},
	tracing::info,
	uuid::Uuid,
};

/// Shared by every handler. Built once at startup; the caches start empty.
#[derive(Clone)]
pub struct AppState {
	pub caches: Arc<GatewayCaches>,
	pub upstream: Arc<UpstreamClient>,
	pub cache_ttl: Duration,
}

impl AppState {
	pub fn new(upstream: UpstreamClient, cache_ttl: Duration) -> Self {
		Self { caches: Arc::new(GatewayCaches::new()), upstream: Arc::new(upstream), cache_ttl }
	}
}

#[derive(Clone)]
pub struct ClientInfo {
	pub request_id: String,
	pub ip: String,
}

//中间件 记录每个请求
async fn trace_request(mut request: Request, next: Next) -> Response {
	// 真实IP优先级：X-Real-IP > X-Forwarded-For > ConnectInfo
	let ip = request
		.headers()
		.get("x-real-ip")
		.and_then(|header| header.to_str().ok())
		.map(|s| s.trim().to_string())
		.or_else(|| request.headers().get("x-forwarded-for").and_then(|header| header.to_str().ok()).and_then(|value| value.split(',').next()).map(|s| s.trim().to_string()))
		.or_else(|| request.extensions().get::<ConnectInfo<SocketAddr>>().map(|connect_info| connect_info.ip().to_string()))
		.unwrap_or_else(|| "unknown".to_string());

	let x_request_id = HeaderName::from_static("x-request-id");
	let request_id = request.headers().get(x_request_id).and_then(|header| header.to_str().ok()).map(|header| header.to_string()).unwrap_or_else(|| Uuid::new_v4().to_string());

	let method = request.method().clone();
	let path = request.uri().path().to_string();
	request.extensions_mut().insert(ClientInfo { request_id: request_id.clone(), ip: ip.clone() });

	let started = std::time::Instant::now();
	let response = next.run(request).await;
	info!("request_id={}, ip={} - {} {} -> {} in {}ms", request_id, ip, method, path, response.status().as_u16(), started.elapsed().as_millis());
	response
}

pub fn app(state: AppState) -> Router {
	let x_request_id = HeaderName::from_static("x-request-id");
	Router::new()
		.route("/ping", get(handle_ping))
		.route("/market", get(handle_market))
		.route("/coin/{id}", get(handle_coin_detail))
		.route("/coin/{id}/market_chart", get(handle_market_chart))
		.route("/metrics", get(handle_metrics))
		.route("/wallet/{address}", get(handle_wallet_balance))
		.route("/wallet/{address}/tokens", get(handle_wallet_tokens))
		.route("/wallet/{address}/tx", get(handle_wallet_transactions))
		.route("/token/{contract}/metadata", get(handle_token_metadata))
		.route("/contact", post(handle_contact))
		.layer(PropagateRequestIdLayer::new(x_request_id.clone())) //将请求id从请求头中传递到响应头中
		.layer(CompressionLayer::new())
		.layer(middleware::from_fn(trace_request))
		.layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid)) //生成请求id 并放到请求头中
		.layer(CorsLayer::new().allow_methods(Any).allow_origin(Any).allow_credentials(false).allow_headers(Any).expose_headers(Any).max_age(Duration::from_secs(60) * 10))
		.with_state(state)
}
