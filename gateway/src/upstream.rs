use {
	common::common_env::{GatewayEnv, non_empty},
	reqwest::{Client, RequestBuilder, Response},
	serde_json::Value,
	std::{fmt, time::Duration},
	thiserror::Error,
};

/// Upstream error bodies are cut to this many chars before logging / reporting
const ERROR_BODY_MAX_CHARS: usize = 200;

/// External collaborators the gateway talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
	MarketData,
	ChainRpc,
	Explorer,
	Mail,
}

impl Provider {
	/// Name reported in the `provider` field of error envelopes
	pub fn name(&self) -> &'static str {
		match self {
			Provider::MarketData => "coingecko",
			Provider::ChainRpc => "alchemy",
			Provider::Explorer => "etherscan",
			Provider::Mail => "mail",
		}
	}
}

impl fmt::Display for Provider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

#[derive(Debug, Error)]
pub enum UpstreamError {
	#[error("{provider} is not configured: {setting} is missing")]
	ConfigMissing { provider: Provider, setting: &'static str },

	#[error("{provider} request failed: {source}")]
	Request { provider: Provider, source: reqwest::Error },

	#[error("{provider} returned status {status}: {body}")]
	Status { provider: Provider, status: u16, body: String },

	#[error("{provider} rpc error {code}: {message}")]
	Rpc { provider: Provider, code: i64, message: String },

	#[error("{provider} returned a malformed body: {reason}")]
	Malformed { provider: Provider, reason: String },
}

impl UpstreamError {
	pub fn provider(&self) -> Provider {
		match self {
			UpstreamError::ConfigMissing { provider, .. }
			| UpstreamError::Request { provider, .. }
			| UpstreamError::Status { provider, .. }
			| UpstreamError::Rpc { provider, .. }
			| UpstreamError::Malformed { provider, .. } => *provider,
		}
	}

	pub fn malformed(provider: Provider, reason: impl Into<String>) -> Self {
		UpstreamError::Malformed { provider, reason: reason.into() }
	}
}

#[derive(Debug, Clone, Default)]
pub struct MailSettings {
	pub api_url: Option<String>,
	pub api_key: Option<String>,
	pub from: String,
	pub to: Option<String>,
}

/// Resolved provider endpoints. Blank values are already folded into `None`.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
	pub market_api_url: String,
	pub market_api_key: Option<String>,
	pub chain_rpc_url: Option<String>,
	pub explorer_api_url: String,
	pub explorer_api_key: Option<String>,
	pub mail: MailSettings,
}

fn owned(value: &Option<String>) -> Option<String> {
	non_empty(value).map(str::to_string)
}

impl From<&GatewayEnv> for ProviderSettings {
	fn from(env: &GatewayEnv) -> Self {
		Self {
			market_api_url: env.market_api_url().trim_end_matches('/').to_string(),
			market_api_key: owned(&env.market_api_key),
			chain_rpc_url: owned(&env.chain_rpc_url),
			explorer_api_url: env.explorer_api_url().trim_end_matches('/').to_string(),
			explorer_api_key: owned(&env.explorer_api_key),
			mail: MailSettings { api_url: owned(&env.mail_api_url), api_key: owned(&env.mail_api_key), from: env.mail_from().to_string(), to: owned(&env.mail_to) },
		}
	}
}

/// Returns the configured value or the `CONFIG_MISSING` error for it
pub fn require<'a>(value: &'a Option<String>, provider: Provider, setting: &'static str) -> Result<&'a str, UpstreamError> {
	value.as_deref().ok_or(UpstreamError::ConfigMissing { provider, setting })
}

/// Shared HTTP client for all providers. One attempt per call, no retries.
pub struct UpstreamClient {
	http: Client,
	settings: ProviderSettings,
}

impl UpstreamClient {
	pub fn new(settings: ProviderSettings, timeout: Duration, connect_timeout: Duration) -> anyhow::Result<Self> {
		let http = Client::builder().timeout(timeout).connect_timeout(connect_timeout).build()?;
		Ok(Self { http, settings })
	}

	pub fn settings(&self) -> &ProviderSettings {
		&self.settings
	}

	pub(crate) fn http(&self) -> &Client {
		&self.http
	}

	/// Sends the request; anything but a 2xx is an error
	pub(crate) async fn send_checked(&self, provider: Provider, request: RequestBuilder) -> Result<Response, UpstreamError> {
		let response = request.send().await.map_err(|source| UpstreamError::Request { provider, source })?;

		let status = response.status();
		if !status.is_success() {
			let body: String = response.text().await.unwrap_or_default().chars().take(ERROR_BODY_MAX_CHARS).collect();
			return Err(UpstreamError::Status { provider, status: status.as_u16(), body });
		}
		Ok(response)
	}

	/// Sends the request and decodes a JSON body from a 2xx response
	pub(crate) async fn send_json(&self, provider: Provider, request: RequestBuilder) -> Result<Value, UpstreamError> {
		let response = self.send_checked(provider, request).await?;
		response.json::<Value>().await.map_err(|e| UpstreamError::malformed(provider, e.to_string()))
	}
}
