use {
	crate::{
		consts::VS_CURRENCY,
		upstream::{Provider, UpstreamClient, UpstreamError},
	},
	reqwest::RequestBuilder,
	serde_json::Value,
};

const MARKET_API_KEY_HEADER: &str = "x-cg-demo-api-key";

impl UpstreamClient {
	fn market_request(&self, path: &str) -> RequestBuilder {
		let settings = self.settings();
		let url = format!("{}{}", settings.market_api_url, path);
		let request = self.http().get(url);
		match settings.market_api_key.as_deref() {
			Some(key) => request.header(MARKET_API_KEY_HEADER, key),
			None => request,
		}
	}

	/// Aggregate market snapshot, an array of coin rows
	pub async fn market_snapshot(&self) -> Result<Value, UpstreamError> {
		let request = self.market_request("/coins/markets").query(&[("vs_currency", VS_CURRENCY)]);
		let payload = self.send_json(Provider::MarketData, request).await?;
		if !payload.is_array() {
			return Err(UpstreamError::malformed(Provider::MarketData, "market snapshot is not an array"));
		}
		Ok(payload)
	}

	/// Per-coin detail object
	pub async fn coin_detail(&self, coin_id: &str) -> Result<Value, UpstreamError> {
		let request = self.market_request(&format!("/coins/{}", coin_id)).query(&[
			("localization", "false"),
			("tickers", "false"),
			("community_data", "false"),
			("developer_data", "false"),
			("sparkline", "false"),
		]);
		let payload = self.send_json(Provider::MarketData, request).await?;
		if !payload.is_object() {
			return Err(UpstreamError::malformed(Provider::MarketData, "coin detail is not an object"));
		}
		Ok(payload)
	}

	/// Historical series for one coin over `days`
	pub async fn market_chart(&self, coin_id: &str, days: &str) -> Result<Value, UpstreamError> {
		let request = self.market_request(&format!("/coins/{}/market_chart", coin_id)).query(&[("vs_currency", VS_CURRENCY), ("days", days)]);
		let payload = self.send_json(Provider::MarketData, request).await?;
		if !payload.get("prices").is_some_and(Value::is_array) {
			return Err(UpstreamError::malformed(Provider::MarketData, "chart payload has no prices array"));
		}
		Ok(payload)
	}
}
