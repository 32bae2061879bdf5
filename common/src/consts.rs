pub const COMMON_ENV_PATH: &str = "./deploy/gateway.env";
pub const GATEWAY_CONFIG_PATH: &str = "./deploy/gateway";

pub const RUN_MODE_DEV: &str = "dev";
pub const RUN_MODE_TEST: &str = "test";
pub const RUN_MODE_PROD: &str = "prod";

/// Public CoinGecko v3 endpoint, used when MARKET_API_URL is not set
pub const DEFAULT_MARKET_API_URL: &str = "https://api.coingecko.com/api/v3";
/// Etherscan v1 endpoint, used when EXPLORER_API_URL is not set
pub const DEFAULT_EXPLORER_API_URL: &str = "https://api.etherscan.io/api";
pub const DEFAULT_MAIL_FROM: &str = "Crypto Dashboard <noreply@cryptodashboard.local>";

/// 验证运行模式是否有效
pub fn validate_run_mode(run_mode: &str) -> anyhow::Result<()> {
	match run_mode {
		RUN_MODE_DEV | RUN_MODE_TEST | RUN_MODE_PROD => Ok(()),
		_ => Err(anyhow::anyhow!("Invalid RUN_MODE: {}. Must be one of '{}', '{}' or '{}'", run_mode, RUN_MODE_DEV, RUN_MODE_TEST, RUN_MODE_PROD)),
	}
}
