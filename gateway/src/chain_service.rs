use {
	crate::{
		consts::WEI_DECIMALS,
		upstream::{Provider, UpstreamClient, UpstreamError, require},
	},
	rust_decimal::Decimal,
	serde::Deserialize,
	serde_json::{Value, json},
};

/// 96-bit mantissa
const DECIMAL_MAX_HEX_DIGITS: usize = 24;

#[derive(Debug, Deserialize)]
struct RpcResponse {
	#[serde(default)]
	result: Option<Value>,
	#[serde(default)]
	error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
	#[serde(default)]
	code: i64,
	#[serde(default)]
	message: String,
}

/// Converts a hex wei quantity (`0x...`) into whole ether
pub fn wei_hex_to_ether(balance_hex: &str) -> Result<Decimal, String> {
	let digits = balance_hex.strip_prefix("0x").or_else(|| balance_hex.strip_prefix("0X")).ok_or_else(|| format!("balance is not a hex quantity: {}", balance_hex))?;
	if digits.is_empty() {
		return Err("balance hex quantity is empty".to_string());
	}
	// Decimal 尾数只有 96 位 超出会被静默截断
	if digits.trim_start_matches('0').len() > DECIMAL_MAX_HEX_DIGITS {
		return Err(format!("balance {} exceeds the 96-bit decimal range", balance_hex));
	}

	let wei = Decimal::from_str_radix(&digits.to_ascii_lowercase(), 16).map_err(|e| format!("invalid balance {}: {}", balance_hex, e))?;
	let divisor = Decimal::from(10u64.pow(WEI_DECIMALS));
	wei.checked_div(divisor).map(|ether| ether.normalize()).ok_or_else(|| "balance division overflow".to_string())
}

impl UpstreamClient {
	/// One JSON-RPC 2.0 call against the chain provider
	async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, UpstreamError> {
		let url = require(&self.settings().chain_rpc_url, Provider::ChainRpc, "CHAIN_RPC_URL")?;
		let body = json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params,
		});

		let payload = self.send_json(Provider::ChainRpc, self.http().post(url).json(&body)).await?;
		let response: RpcResponse = serde_json::from_value(payload).map_err(|e| UpstreamError::malformed(Provider::ChainRpc, e.to_string()))?;

		if let Some(error) = response.error {
			return Err(UpstreamError::Rpc { provider: Provider::ChainRpc, code: error.code, message: error.message });
		}
		match response.result {
			Some(Value::Null) | None => Err(UpstreamError::malformed(Provider::ChainRpc, format!("{} returned no result", method))),
			Some(result) => Ok(result),
		}
	}

	/// Native balance in whole ether
	pub async fn eth_balance(&self, address: &str) -> Result<Decimal, UpstreamError> {
		let result = self.rpc_call("eth_getBalance", json!([address, "latest"])).await?;
		let balance_hex = result.as_str().ok_or_else(|| UpstreamError::malformed(Provider::ChainRpc, "balance is not a string"))?;
		wei_hex_to_ether(balance_hex).map_err(|reason| UpstreamError::malformed(Provider::ChainRpc, reason))
	}

	/// ERC-20 balances, `{address, tokenBalances: [...]}`
	pub async fn token_balances(&self, address: &str) -> Result<Value, UpstreamError> {
		self.rpc_call("alchemy_getTokenBalances", json!([address, "erc20"])).await
	}

	/// `{name, symbol, decimals, logo}` of one token contract
	pub async fn token_metadata(&self, contract: &str) -> Result<Value, UpstreamError> {
		self.rpc_call("alchemy_getTokenMetadata", json!([contract])).await
	}
}
