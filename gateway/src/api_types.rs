use {
	crate::consts::{CONTACT_MESSAGE_MAX_CHARS, DEFAULT_CHART_DAYS},
	serde::{Deserialize, Serialize},
};

/// 错误响应格式
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
	pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
	pub code: String,
	pub message: String,
	pub provider: String,
	pub hint: String,
}

fn is_truthy(value: &Option<String>) -> bool {
	matches!(value.as_deref(), Some("true") | Some("1"))
}

/// `?refresh=true` on the market snapshot
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshQuery {
	pub refresh: Option<String>,
}

impl RefreshQuery {
	pub fn force_refresh(&self) -> bool {
		is_truthy(&self.refresh)
	}
}

/// `?days=N&refresh=true` on the chart route
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketChartQuery {
	pub days: Option<String>,
	pub refresh: Option<String>,
}

impl MarketChartQuery {
	pub fn force_refresh(&self) -> bool {
		is_truthy(&self.refresh)
	}

	/// 校验 days: 正整数或者 "max"，缺省为 7
	pub fn validate_days(&self) -> Result<String, String> {
		let days = self.days.as_deref().map(str::trim).filter(|d| !d.is_empty()).unwrap_or(DEFAULT_CHART_DAYS);
		if days == "max" {
			return Ok(days.to_string());
		}
		match days.parse::<u32>() {
			Ok(n) if n > 0 => Ok(n.to_string()),
			_ => Err(format!("days must be a positive integer or 'max', got '{}'", days)),
		}
	}
}

/// CoinGecko ids are lowercase slugs such as `usd-coin`
pub fn is_valid_coin_id(id: &str) -> bool {
	!id.is_empty() && id.len() <= 128 && id.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')) && !id.chars().all(|c| c == '.')
}

/// `0x` followed by 40 hex digits
pub fn is_valid_address(address: &str) -> bool {
	match address.strip_prefix("0x").or_else(|| address.strip_prefix("0X")) {
		Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
		None => false,
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletBalanceResponse {
	pub address: String,
	/// whole ether
	pub balance: f64,
}

/// Contact form body; fields are optional here so that missing ones map to BAD_REQUEST
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactRequest {
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub message: Option<String>,
}

impl ContactRequest {
	/// 校验参数值，返回去掉首尾空白后的 (email, message)
	/// - email 与 message 都不能为空
	/// - email 必须包含 '@'
	/// - message 不超过 5000 个字符
	pub fn validate(&self) -> Result<(String, String), String> {
		let email = self.email.as_deref().map(str::trim).unwrap_or_default();
		let message = self.message.as_deref().map(str::trim).unwrap_or_default();

		if email.is_empty() || message.is_empty() {
			return Err("email and message are required".to_string());
		}
		if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
			return Err(format!("'{}' is not a valid email address", email));
		}
		if message.chars().count() > CONTACT_MESSAGE_MAX_CHARS {
			return Err(format!("message must be at most {} characters", CONTACT_MESSAGE_MAX_CHARS));
		}
		Ok((email.to_string(), message.to_string()))
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponse {
	pub status: String,
}

/// Cache counters exposed on `/metrics`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
	pub market_cache_hits: u64,
	pub market_cache_misses: u64,
	pub market_cache_stale_returns: u64,
	pub market_last_fetch_ms: u64,
	pub chart_cache_hits: u64,
	pub chart_cache_misses: u64,
	pub chart_cache_stale_returns: u64,
	pub chart_last_fetch_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
	pub message: String,
}
