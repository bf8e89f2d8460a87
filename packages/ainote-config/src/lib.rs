mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Ai, AiSettings, Config, Service, Startup, Store, StoreSettings};

use std::{env, fs, net::SocketAddr, path::Path};

/// Loads the optional TOML file, overlays the process environment, and validates the result.
///
/// Absent dependency settings are not an error here. They surface later as an unconfigured
/// dependency.
pub fn load(path: Option<&Path>) -> Result<Config> {
	let mut cfg = match path {
		Some(path) => {
			let raw = fs::read_to_string(path)
				.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

			toml::from_str(&raw)
				.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?
		},
		None => Config::default(),
	};

	apply_env(&mut cfg, |name| env::var(name).ok());
	normalize(&mut cfg);
	validate(&cfg)?;

	Ok(cfg)
}

/// Overlays environment values onto `cfg`. Unparsable numeric values are ignored.
pub fn apply_env<F>(cfg: &mut Config, lookup: F)
where
	F: Fn(&str) -> Option<String>,
{
	if let Some(value) = lookup("AINOTE_HTTP_BIND") {
		cfg.service.http_bind = value;
	}
	if let Some(value) = lookup("AINOTE_LOG_LEVEL") {
		cfg.service.log_level = value;
	}
	if let Some(value) = lookup("DB_HOST") {
		cfg.store.host = Some(value);
	}
	if let Some(port) = lookup("DB_PORT").and_then(|value| value.trim().parse().ok()) {
		cfg.store.port = port;
	}
	if let Some(value) = lookup("DB_USER") {
		cfg.store.user = Some(value);
	}
	if let Some(value) = lookup("DB_PASSWORD") {
		cfg.store.password = Some(value);
	}
	if let Some(value) = lookup("DB_NAME") {
		cfg.store.database = Some(value);
	}
	if let Some(value) = lookup("OPENAI_API_KEY") {
		cfg.ai.api_key = Some(value);
	}
	if let Some(value) = lookup("OPENAI_API_BASE") {
		cfg.ai.api_base = value;
	}
	if let Some(value) = lookup("OPENAI_MODEL") {
		cfg.ai.model = value;
	}
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.parse::<SocketAddr>().is_err() {
		return Err(Error::Validation {
			message: "service.http_bind must be a socket address such as 0.0.0.0:8000."
				.to_string(),
		});
	}
	if cfg.store.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "store.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.store.connect_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "store.connect_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.ai.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "ai.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.ai.max_tokens == 0 {
		return Err(Error::Validation {
			message: "ai.max_tokens must be greater than zero.".to_string(),
		});
	}
	if cfg.ai.api_base.trim().is_empty() {
		return Err(Error::Validation { message: "ai.api_base must be non-empty.".to_string() });
	}
	if cfg.ai.model.trim().is_empty() {
		return Err(Error::Validation { message: "ai.model must be non-empty.".to_string() });
	}
	if !cfg.ai.path.starts_with('/') {
		return Err(Error::Validation { message: "ai.path must start with '/'.".to_string() });
	}
	if cfg.ai.default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation {
			message: "ai.default_headers values must be strings.".to_string(),
		});
	}
	if cfg.startup.connect_attempts == 0 {
		return Err(Error::Validation {
			message: "startup.connect_attempts must be greater than zero.".to_string(),
		});
	}
	if cfg.startup.max_backoff_ms < cfg.startup.initial_backoff_ms {
		return Err(Error::Validation {
			message: "startup.max_backoff_ms must be at least startup.initial_backoff_ms."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for value in [
		&mut cfg.store.host,
		&mut cfg.store.user,
		&mut cfg.store.password,
		&mut cfg.store.database,
		&mut cfg.ai.api_key,
		&mut cfg.ai.system_prompt,
	] {
		if value.as_deref().map(|raw| raw.trim().is_empty()).unwrap_or(false) {
			*value = None;
		}
	}
}
