use {
	common::logging::LoggingConfig,
	config::{Config, File},
	serde::{Deserialize, Serialize},
	std::time::Duration,
	tokio::sync::OnceCell,
};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
	pub logging: LoggingConfig,
	pub server: ServerConfig,
	pub cache: CacheConfig,
	pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
	pub port: u16,
}

impl ServerConfig {
	pub fn get_addr(&self) -> String {
		format!("0.0.0.0:{}", self.port)
	}
}

/// TTL shared by the market snapshot and chart caches
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
	pub ttl_secs: u64,
}

impl CacheConfig {
	pub fn ttl(&self) -> Duration {
		Duration::from_secs(self.ttl_secs)
	}
}

/// Timeouts applied to every outbound provider call
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
	pub timeout_secs: u64,
	pub connect_timeout_secs: u64,
}

pub static CONFIG: OnceCell<GatewayConfig> = OnceCell::const_new();

pub fn load_config(config_path: &str) -> anyhow::Result<()> {
	let run_mode = &common::common_env::get_common_env().run_mode;

	let config = Config::builder().add_source(File::with_name(&format!("{}/{}", config_path, run_mode)).required(true)).build()?;

	let gateway_config: GatewayConfig = config.try_deserialize()?;
	println!("Configuration loaded for mode: {}", run_mode);
	println!("Configuration: {:?}", gateway_config);
	CONFIG.set(gateway_config)?;
	check_config()?;
	Ok(())
}

fn check_config() -> anyhow::Result<()> {
	let config = get_config();
	config.logging.check()?;
	if config.cache.ttl_secs == 0 {
		return Err(anyhow::anyhow!("Cache ttl_secs must be greater than 0"));
	}
	if config.upstream.timeout_secs == 0 || config.upstream.connect_timeout_secs == 0 {
		return Err(anyhow::anyhow!("Upstream timeouts must be greater than 0"));
	}
	Ok(())
}

pub fn get_config() -> &'static GatewayConfig {
	CONFIG.get().expect("Config not loaded")
}
