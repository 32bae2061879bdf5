use {
	crate::{
		consts::{EXPLORER_NO_TX_MESSAGE, TX_HISTORY_LIMIT},
		upstream::{Provider, UpstreamClient, UpstreamError, require},
	},
	serde::Deserialize,
	serde_json::Value,
};

/// Etherscan-style envelope: `status` is "1" on success
#[derive(Debug, Deserialize)]
struct ExplorerResponse {
	status: String,
	#[serde(default)]
	message: String,
	#[serde(default)]
	result: Value,
}

impl UpstreamClient {
	/// Most recent transactions of an address, newest first, at most 10
	pub async fn transactions(&self, address: &str) -> Result<Vec<Value>, UpstreamError> {
		let settings = self.settings();
		let api_key = require(&settings.explorer_api_key, Provider::Explorer, "EXPLORER_API_KEY")?;
		let offset = TX_HISTORY_LIMIT.to_string();

		let request = self.http().get(&settings.explorer_api_url).query(&[
			("module", "account"),
			("action", "txlist"),
			("address", address),
			("startblock", "0"),
			("endblock", "99999999"),
			("page", "1"),
			("offset", offset.as_str()),
			("sort", "desc"),
			("apikey", api_key),
		]);

		let payload = self.send_json(Provider::Explorer, request).await?;
		let response: ExplorerResponse = serde_json::from_value(payload).map_err(|e| UpstreamError::malformed(Provider::Explorer, e.to_string()))?;

		if response.status != "1" {
			if response.message == EXPLORER_NO_TX_MESSAGE {
				return Ok(Vec::new());
			}
			// 失败时 result 里是错误描述
			let detail = response.result.as_str().unwrap_or_default().to_string();
			return Err(UpstreamError::Rpc { provider: Provider::Explorer, code: 0, message: format!("{} {}", response.message, detail).trim().to_string() });
		}

		match response.result {
			Value::Array(mut txs) => {
				txs.truncate(TX_HISTORY_LIMIT);
				Ok(txs)
			}
			_ => Err(UpstreamError::malformed(Provider::Explorer, "transaction list is not an array")),
		}
	}
}
