use {
	crate::{
		consts::CONTACT_SUBJECT,
		upstream::{Provider, UpstreamClient, UpstreamError, require},
	},
	chrono::Utc,
	serde_json::json,
};

impl UpstreamClient {
	/// Sends one contact-form message through the mail HTTP API. Fire and forget, no retries.
	pub async fn send_contact_mail(&self, sender_email: &str, message: &str) -> Result<(), UpstreamError> {
		let mail = &self.settings().mail;
		let api_url = require(&mail.api_url, Provider::Mail, "MAIL_API_URL")?;
		let api_key = require(&mail.api_key, Provider::Mail, "MAIL_API_KEY")?;
		let to = require(&mail.to, Provider::Mail, "MAIL_TO")?;

		let text = format!("From: {}\nReceived: {}\n\n{}", sender_email, Utc::now().to_rfc3339(), message);
		let body = json!({
			"from": mail.from,
			"to": [to],
			"reply_to": sender_email,
			"subject": CONTACT_SUBJECT,
			"text": text,
		});

		self.send_checked(Provider::Mail, self.http().post(api_url).bearer_auth(api_key).json(&body)).await?;
		Ok(())
	}
}
