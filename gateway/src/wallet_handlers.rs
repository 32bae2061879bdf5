use {
	crate::{
		api_error::ApiError,
		api_types::{ContactRequest, ContactResponse, WalletBalanceResponse, is_valid_address},
		handlers::upstream_failure,
		server::{AppState, ClientInfo},
		upstream::{Provider, UpstreamError},
	},
	axum::{
		extract::{Extension, Path, State, rejection::JsonRejection},
		response::Json,
	},
	rust_decimal::prelude::ToPrimitive,
	serde_json::Value,
};

const ADDRESS_HINT: &str = "Addresses are 0x followed by 40 hex characters";

fn check_address(address: &str) -> Result<(), ApiError> {
	if is_valid_address(address) { Ok(()) } else { Err(ApiError::bad_request(format!("'{}' is not a valid address", address), ADDRESS_HINT)) }
}

/// ETH 余额 (wei -> ether)
pub async fn handle_wallet_balance(State(state): State<AppState>, Extension(client_info): Extension<ClientInfo>, Path(address): Path<String>) -> Result<Json<WalletBalanceResponse>, ApiError> {
	check_address(&address)?;

	let ether = state.upstream.eth_balance(&address).await.map_err(|err| upstream_failure(&client_info, "wallet balance", err))?;
	let balance = ether.to_f64().ok_or_else(|| upstream_failure(&client_info, "wallet balance", UpstreamError::malformed(Provider::ChainRpc, format!("balance {} does not fit a float", ether))))?;

	Ok(Json(WalletBalanceResponse { address, balance }))
}

/// ERC-20 余额列表
pub async fn handle_wallet_tokens(State(state): State<AppState>, Extension(client_info): Extension<ClientInfo>, Path(address): Path<String>) -> Result<Json<Value>, ApiError> {
	check_address(&address)?;

	state.upstream.token_balances(&address).await.map(Json).map_err(|err| upstream_failure(&client_info, "wallet tokens", err))
}

pub async fn handle_token_metadata(State(state): State<AppState>, Extension(client_info): Extension<ClientInfo>, Path(contract): Path<String>) -> Result<Json<Value>, ApiError> {
	check_address(&contract)?;

	state.upstream.token_metadata(&contract).await.map(Json).map_err(|err| upstream_failure(&client_info, "token metadata", err))
}

/// 最近 10 笔交易 按时间倒序
pub async fn handle_wallet_transactions(State(state): State<AppState>, Extension(client_info): Extension<ClientInfo>, Path(address): Path<String>) -> Result<Json<Vec<Value>>, ApiError> {
	check_address(&address)?;

	state.upstream.transactions(&address).await.map(Json).map_err(|err| upstream_failure(&client_info, "wallet transactions", err))
}

/// 联系表单 发送邮件
pub async fn handle_contact(State(state): State<AppState>, Extension(client_info): Extension<ClientInfo>, body: Result<Json<ContactRequest>, JsonRejection>) -> Result<Json<ContactResponse>, ApiError> {
	let Json(params) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text(), "Send a JSON body with email and message"))?;

	let (email, message) = params.validate().map_err(|msg| ApiError::bad_request(msg, "Fill in both the email and message fields"))?;

	state.upstream.send_contact_mail(&email, &message).await.map_err(|err| upstream_failure(&client_info, "contact", err))?;

	tracing::info!("request_id={} - contact message from {} sent", client_info.request_id, email);
	Ok(Json(ContactResponse { status: "sent".to_string() }))
}
