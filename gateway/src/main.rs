use {gateway::init, std::net::SocketAddr, tracing::info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let state = init::init_all()?;

	let config = gateway::config::get_config();
	let addr = config.server.get_addr();
	let listener = tokio::net::TcpListener::bind(&addr).await?;
	info!("🚀 Gateway is running at {}", listener.local_addr()?);

	let app = gateway::server::app(state);

	// 使用 axum 的 with_graceful_shutdown 实现优雅停机
	axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).with_graceful_shutdown(common::graceful::shutdown_signal()).await?;

	info!("Gateway stopped");
	Ok(())
}
