use {
	crate::consts::{COMMON_ENV_PATH, DEFAULT_EXPLORER_API_URL, DEFAULT_MAIL_FROM, DEFAULT_MARKET_API_URL, RUN_MODE_DEV},
	config::{Config, Environment},
	serde::{Deserialize, Serialize},
	std::path::Path,
	tokio::sync::OnceCell,
};

/// Provider endpoints and credentials, read from the process environment.
///
/// Every provider setting is optional here: a missing value only disables the
/// routes that need it, and those routes answer `CONFIG_MISSING` on their own.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GatewayEnv {
	#[serde(default = "default_run_mode")]
	pub run_mode: String,

	// market data (CoinGecko)
	#[serde(default)]
	pub market_api_url: Option<String>,
	#[serde(default)]
	pub market_api_key: Option<String>,

	// chain RPC (Alchemy)
	#[serde(default)]
	pub chain_rpc_url: Option<String>,

	// block explorer (Etherscan)
	#[serde(default)]
	pub explorer_api_url: Option<String>,
	#[serde(default)]
	pub explorer_api_key: Option<String>,

	// contact mail transport
	#[serde(default)]
	pub mail_api_url: Option<String>,
	#[serde(default)]
	pub mail_api_key: Option<String>,
	#[serde(default)]
	pub mail_from: Option<String>,
	#[serde(default)]
	pub mail_to: Option<String>,
}

fn default_run_mode() -> String {
	RUN_MODE_DEV.to_string()
}

/// Treats unset and blank values the same way
pub fn non_empty(value: &Option<String>) -> Option<&str> {
	value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl GatewayEnv {
	pub fn market_api_url(&self) -> &str {
		non_empty(&self.market_api_url).unwrap_or(DEFAULT_MARKET_API_URL)
	}

	pub fn explorer_api_url(&self) -> &str {
		non_empty(&self.explorer_api_url).unwrap_or(DEFAULT_EXPLORER_API_URL)
	}

	pub fn mail_from(&self) -> &str {
		non_empty(&self.mail_from).unwrap_or(DEFAULT_MAIL_FROM)
	}
}

pub static COMMON_ENV: OnceCell<GatewayEnv> = OnceCell::const_new();

pub fn load_common_env() -> anyhow::Result<()> {
	// env 文件可选 部署时可以直接用进程环境变量
	if Path::new(COMMON_ENV_PATH).exists() {
		dotenvy::from_path(COMMON_ENV_PATH)?;
	}

	let config = Config::builder().add_source(Environment::default()).build()?;

	let common_env: GatewayEnv = config.try_deserialize()?;
	COMMON_ENV.set(common_env)?;
	check_common_env()?;
	Ok(())
}

pub fn check_common_env() -> anyhow::Result<()> {
	let common_env = get_common_env();
	crate::consts::validate_run_mode(&common_env.run_mode)?;
	Ok(())
}

/// 缺少的 provider 配置只打日志 不阻止启动 (需要在日志初始化之后调用)
pub fn warn_missing_providers() {
	let common_env = get_common_env();
	if non_empty(&common_env.chain_rpc_url).is_none() {
		tracing::warn!("CHAIN_RPC_URL is not set, wallet and token routes will answer CONFIG_MISSING");
	}
	if non_empty(&common_env.explorer_api_key).is_none() {
		tracing::warn!("EXPLORER_API_KEY is not set, transaction history will answer CONFIG_MISSING");
	}
	if non_empty(&common_env.mail_api_url).is_none() || non_empty(&common_env.mail_api_key).is_none() || non_empty(&common_env.mail_to).is_none() {
		tracing::warn!("Mail transport is not fully configured, contact route will answer CONFIG_MISSING");
	}
}

pub fn get_common_env() -> &'static GatewayEnv {
	COMMON_ENV.get().expect("Common env not loaded")
}
