pub mod completion;
pub mod probe;

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{
	Client, Response,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

const MAX_ERROR_BODY_CHARS: usize = 512;

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

/// Builds the shared HTTP client. Every request it issues is bounded by `timeout_ms`.
pub fn client(cfg: &ainote_config::AiSettings) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?)
}

async fn check_status(res: Response) -> Result<Response> {
	let status = res.status();

	if status.is_success() {
		return Ok(res);
	}

	let body = res.text().await.unwrap_or_default();
	let body = body.chars().take(MAX_ERROR_BODY_CHARS).collect();

	Err(Error::Status { status: status.as_u16(), body })
}
