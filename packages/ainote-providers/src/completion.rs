use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Sends one chat completion request and returns the first choice's message content.
pub async fn complete(
	client: &Client,
	cfg: &ainote_config::AiSettings,
	system: &str,
	user: &str,
) -> Result<String> {
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"max_tokens": cfg.max_tokens,
		"messages": [
			{ "role": "system", "content": system },
			{ "role": "user", "content": user },
		],
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = crate::check_status(res).await?.json().await?;

	parse_completion(&json)
}

fn parse_completion(json: &Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Completion response is missing choices[0].message.content.".to_string(),
		})?;
	let trimmed = content.trim();

	if trimmed.is_empty() {
		return Err(Error::InvalidResponse {
			message: "Completion response content is empty.".to_string(),
		});
	}

	Ok(trimmed.to_string())
}
