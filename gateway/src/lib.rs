pub mod api_error;
pub mod api_types;
pub mod cache;
pub mod chain_service;
pub mod config;
pub mod consts;
pub mod explorer_service;
pub mod fetch;
pub mod handlers;
pub mod init;
pub mod mail_service;
pub mod market_service;
pub mod metrics;
pub mod server;
pub mod upstream;
pub mod wallet_handlers;
