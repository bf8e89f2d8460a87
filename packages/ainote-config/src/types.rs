use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	pub service: Service,
	pub store: Store,
	pub ai: Ai,
	pub startup: Startup,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { http_bind: "0.0.0.0:8000".to_string(), log_level: "info".to_string() }
	}
}

/// Relational store settings. Host, user, password, and database are required; a store with any
/// of them absent stays unconfigured.
#[derive(Deserialize)]
#[serde(default)]
pub struct Store {
	pub host: Option<String>,
	pub port: u16,
	pub user: Option<String>,
	pub password: Option<String>,
	pub database: Option<String>,
	pub pool_max_conns: u32,
	pub connect_timeout_ms: u64,
}
impl Store {
	/// Returns complete settings, or the environment names of every missing required setting.
	pub fn resolve(&self) -> Result<StoreSettings, Vec<&'static str>> {
		let mut missing = Vec::new();

		for (name, value) in [
			("DB_HOST", &self.host),
			("DB_USER", &self.user),
			("DB_PASSWORD", &self.password),
			("DB_NAME", &self.database),
		] {
			if value.is_none() {
				missing.push(name);
			}
		}

		match (&self.host, &self.user, &self.password, &self.database) {
			(Some(host), Some(user), Some(password), Some(database)) => Ok(StoreSettings {
				host: host.clone(),
				port: self.port,
				user: user.clone(),
				password: password.clone(),
				database: database.clone(),
				pool_max_conns: self.pool_max_conns,
				connect_timeout_ms: self.connect_timeout_ms,
			}),
			_ => Err(missing),
		}
	}
}
impl Default for Store {
	fn default() -> Self {
		Self {
			host: None,
			port: 5_432,
			user: None,
			password: None,
			database: None,
			pool_max_conns: 5,
			connect_timeout_ms: 5_000,
		}
	}
}
impl fmt::Debug for Store {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Store")
			.field("host", &self.host)
			.field("port", &self.port)
			.field("user", &self.user)
			.field("password", &self.password.as_ref().map(|_| "********"))
			.field("database", &self.database)
			.field("pool_max_conns", &self.pool_max_conns)
			.field("connect_timeout_ms", &self.connect_timeout_ms)
			.finish()
	}
}

#[derive(Clone)]
pub struct StoreSettings {
	pub host: String,
	pub port: u16,
	pub user: String,
	pub password: String,
	pub database: String,
	pub pool_max_conns: u32,
	pub connect_timeout_ms: u64,
}
impl fmt::Debug for StoreSettings {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StoreSettings")
			.field("host", &self.host)
			.field("port", &self.port)
			.field("user", &self.user)
			.field("password", &"********")
			.field("database", &self.database)
			.field("pool_max_conns", &self.pool_max_conns)
			.field("connect_timeout_ms", &self.connect_timeout_ms)
			.finish()
	}
}

/// AI completion provider settings. Only the API key is required.
#[derive(Deserialize)]
#[serde(default)]
pub struct Ai {
	pub api_key: Option<String>,
	pub api_base: String,
	pub path: String,
	pub model: String,
	pub max_tokens: u32,
	pub timeout_ms: u64,
	/// Probe the provider once at startup instead of trusting the key.
	pub verify_on_start: bool,
	/// Overrides the built-in advice instruction.
	pub system_prompt: Option<String>,
	pub default_headers: Map<String, Value>,
}
impl Ai {
	pub fn resolve(&self) -> Result<AiSettings, Vec<&'static str>> {
		let Some(api_key) = self.api_key.as_ref() else {
			return Err(vec!["OPENAI_API_KEY"]);
		};

		Ok(AiSettings {
			api_key: api_key.clone(),
			api_base: self.api_base.trim_end_matches('/').to_string(),
			path: self.path.clone(),
			model: self.model.clone(),
			max_tokens: self.max_tokens,
			timeout_ms: self.timeout_ms,
			verify_on_start: self.verify_on_start,
			system_prompt: self.system_prompt.clone(),
			default_headers: self.default_headers.clone(),
		})
	}
}
impl Default for Ai {
	fn default() -> Self {
		Self {
			api_key: None,
			api_base: "https://api.openai.com/v1".to_string(),
			path: "/chat/completions".to_string(),
			model: "gpt-3.5-turbo".to_string(),
			max_tokens: 1_000,
			timeout_ms: 30_000,
			verify_on_start: true,
			system_prompt: None,
			default_headers: Map::new(),
		}
	}
}
impl fmt::Debug for Ai {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Ai")
			.field("api_key", &self.api_key.as_ref().map(|_| "********"))
			.field("api_base", &self.api_base)
			.field("path", &self.path)
			.field("model", &self.model)
			.field("max_tokens", &self.max_tokens)
			.field("timeout_ms", &self.timeout_ms)
			.field("verify_on_start", &self.verify_on_start)
			.field("system_prompt", &self.system_prompt)
			.finish_non_exhaustive()
	}
}

#[derive(Clone)]
pub struct AiSettings {
	pub api_key: String,
	pub api_base: String,
	pub path: String,
	pub model: String,
	pub max_tokens: u32,
	pub timeout_ms: u64,
	pub verify_on_start: bool,
	pub system_prompt: Option<String>,
	pub default_headers: Map<String, Value>,
}
impl fmt::Debug for AiSettings {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AiSettings")
			.field("api_key", &"********")
			.field("api_base", &self.api_base)
			.field("path", &self.path)
			.field("model", &self.model)
			.field("max_tokens", &self.max_tokens)
			.field("timeout_ms", &self.timeout_ms)
			.field("verify_on_start", &self.verify_on_start)
			.finish_non_exhaustive()
	}
}

/// Bounded retry applied to each dependency while the process starts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Startup {
	pub connect_attempts: u32,
	pub initial_backoff_ms: u64,
	pub max_backoff_ms: u64,
}
impl Default for Startup {
	fn default() -> Self {
		Self { connect_attempts: 3, initial_backoff_ms: 500, max_backoff_ms: 5_000 }
	}
}
