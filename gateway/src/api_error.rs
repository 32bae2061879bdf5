use {
	crate::{
		api_types::{ErrorBody, ErrorEnvelope},
		upstream::{Provider, UpstreamError},
	},
	axum::{
		Json,
		http::StatusCode,
		response::{IntoResponse, Response},
	},
};

/// Provider name used for errors raised by the gateway itself
pub const GATEWAY_PROVIDER: &str = "gateway";

/// API 错误码定义
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
	/// 缺少外部服务配置 在发起上游请求之前检测
	ConfigMissing,
	/// 上游请求失败
	UpstreamError,
	/// 参数错误
	BadRequest,
}

impl ApiErrorCode {
	pub fn as_str(&self) -> &'static str {
		match self {
			ApiErrorCode::ConfigMissing => "CONFIG_MISSING",
			ApiErrorCode::UpstreamError => "UPSTREAM_ERROR",
			ApiErrorCode::BadRequest => "BAD_REQUEST",
		}
	}

	pub fn status(&self) -> StatusCode {
		match self {
			ApiErrorCode::ConfigMissing => StatusCode::INTERNAL_SERVER_ERROR,
			ApiErrorCode::UpstreamError => StatusCode::BAD_GATEWAY,
			ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
		}
	}
}

/// Error response of every route, rendered as `{error: {code, message, provider, hint}}`
#[derive(Debug, Clone)]
pub struct ApiError {
	pub code: ApiErrorCode,
	pub message: String,
	pub provider: String,
	pub hint: String,
}

impl ApiError {
	pub fn bad_request(message: impl Into<String>, hint: impl Into<String>) -> Self {
		Self { code: ApiErrorCode::BadRequest, message: message.into(), provider: GATEWAY_PROVIDER.to_string(), hint: hint.into() }
	}

	pub fn status(&self) -> StatusCode {
		self.code.status()
	}
}

fn upstream_hint(provider: Provider) -> &'static str {
	match provider {
		Provider::MarketData => "The market data provider may be rate limiting or unavailable, retry in a minute",
		Provider::ChainRpc => "Check CHAIN_RPC_URL and the RPC provider status",
		Provider::Explorer => "Check EXPLORER_API_KEY and the block explorer status",
		Provider::Mail => "Check the mail API credentials and recipient address",
	}
}

impl From<UpstreamError> for ApiError {
	fn from(err: UpstreamError) -> Self {
		let provider = err.provider();
		let (code, hint) = match &err {
			UpstreamError::ConfigMissing { setting, .. } => (ApiErrorCode::ConfigMissing, format!("Set {} in the gateway environment and restart it", setting)),
			_ => (ApiErrorCode::UpstreamError, upstream_hint(provider).to_string()),
		};
		Self { code, message: err.to_string(), provider: provider.name().to_string(), hint }
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = self.status();
		let body = ErrorEnvelope { error: ErrorBody { code: self.code.as_str().to_string(), message: self.message, provider: self.provider, hint: self.hint } };
		(status, Json(body)).into_response()
	}
}
