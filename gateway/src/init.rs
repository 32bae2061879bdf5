use {
	crate::{
		config::{get_config, load_config},
		server::AppState,
		upstream::{ProviderSettings, UpstreamClient},
	},
	common::common_env,
	std::time::Duration,
	tracing::info,
};

/// Loads env and config, starts logging and builds the shared app state
pub fn init_all() -> anyhow::Result<AppState> {
	init_load()?;
	init_logging()?;
	common_env::warn_missing_providers();
	init_state()
}

fn init_load() -> anyhow::Result<()> {
	common_env::load_common_env()?;
	load_config(common::consts::GATEWAY_CONFIG_PATH)?;
	Ok(())
}

fn init_logging() -> anyhow::Result<()> {
	let config = get_config();
	if config.logging.console {
		common::logging::init_console_logging(&config.logging.level)?;
	} else if let Some(file) = config.logging.file.as_ref() {
		common::logging::init_file_logging(&config.logging.level, file, config.logging.rotation_max_files)?;
	}
	Ok(())
}

fn init_state() -> anyhow::Result<AppState> {
	let config = get_config();
	let settings = ProviderSettings::from(common_env::get_common_env());
	info!("Market data provider: {}", settings.market_api_url);
	info!("Block explorer: {}", settings.explorer_api_url);

	let upstream = UpstreamClient::new(settings, Duration::from_secs(config.upstream.timeout_secs), Duration::from_secs(config.upstream.connect_timeout_secs))?;
	info!("Cache ttl: {}s", config.cache.ttl_secs);
	Ok(AppState::new(upstream, config.cache.ttl()))
}
