use reqwest::Client;

use crate::Result;

/// Lists models once to confirm the endpoint is reachable and the key is accepted.
pub async fn list_models(client: &Client, cfg: &ainote_config::AiSettings) -> Result<()> {
	let url = format!("{}/models", cfg.api_base);
	let res = client
		.get(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.send()
		.await?;

	crate::check_status(res).await?;

	Ok(())
}
