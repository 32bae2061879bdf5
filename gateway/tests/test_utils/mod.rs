#![allow(dead_code)]

use {
	axum::{
		Router,
		body::{Body, to_bytes},
		http::{HeaderMap, Request, StatusCode, header::CONTENT_TYPE},
	},
	gateway::{
		server::{AppState, app},
		upstream::{MailSettings, ProviderSettings, UpstreamClient},
	},
	serde_json::Value,
	std::time::Duration,
	tower::ServiceExt,
};

pub const TEST_TTL: Duration = Duration::from_secs(60);
pub const TEST_ADDRESS: &str = "0xabababababababababababababababababababab";
pub const TEST_CONTRACT: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";

/// 所有 provider 都指向 mock server
pub fn mock_settings(uri: &str) -> ProviderSettings {
	ProviderSettings {
		market_api_url: uri.to_string(),
		market_api_key: None,
		chain_rpc_url: Some(format!("{}/rpc", uri)),
		explorer_api_url: format!("{}/api", uri),
		explorer_api_key: Some("explorer-key".to_string()),
		mail: MailSettings {
			api_url: Some(format!("{}/emails", uri)),
			api_key: Some("mail-key".to_string()),
			from: "Dashboard <noreply@example.com>".to_string(),
			to: Some("ops@example.com".to_string()),
		},
	}
}

pub fn build_state(settings: ProviderSettings) -> AppState {
	let upstream = UpstreamClient::new(settings, Duration::from_secs(5), Duration::from_secs(2)).unwrap();
	AppState::new(upstream, TEST_TTL)
}

/// 创建测试用的 router 和它的 state
pub fn build_app(settings: ProviderSettings) -> (Router, AppState) {
	let state = build_state(settings);
	(app(state.clone()), state)
}

pub struct TestResponse {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Value,
}

impl TestResponse {
	pub fn x_cache(&self) -> Option<&str> {
		self.headers.get("x-cache").and_then(|v| v.to_str().ok())
	}

	pub fn error_code(&self) -> &str {
		self.body["error"]["code"].as_str().unwrap_or_default()
	}

	pub fn error_provider(&self) -> &str {
		self.body["error"]["provider"].as_str().unwrap_or_default()
	}
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
	let response = app.clone().oneshot(request).await.unwrap();
	let status = response.status();
	let headers = response.headers().clone();
	let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
	let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string())) };
	TestResponse { status, headers, body }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
	send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: &Router, uri: &str, body: &Value) -> TestResponse {
	let request = Request::post(uri).header(CONTENT_TYPE, "application/json").body(Body::from(body.to_string())).unwrap();
	send(app, request).await
}

pub async fn post_raw(app: &Router, uri: &str, body: &str) -> TestResponse {
	let request = Request::post(uri).header(CONTENT_TYPE, "application/json").body(Body::from(body.to_string())).unwrap();
	send(app, request).await
}
