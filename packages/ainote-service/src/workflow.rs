use std::time::Duration;

use ainote_config::Config;

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a study advisor. Based on the note provided by the user, recommend exactly one related \
topic the user can learn next. Ensure the response is at least three sentences long and in English.";

/// Sequences note operations against admitted clients. Operations live next to their request
/// types in `add_note`, `list`, and `delete`.
#[derive(Debug, Clone)]
pub struct NoteWorkflow {
	pub(crate) system_prompt: String,
	pub(crate) ai_timeout: Duration,
}
impl NoteWorkflow {
	pub fn new(system_prompt: impl Into<String>, ai_timeout: Duration) -> Self {
		Self { system_prompt: system_prompt.into(), ai_timeout }
	}

	pub fn from_config(cfg: &Config) -> Self {
		Self::new(
			cfg.ai.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT),
			Duration::from_millis(cfg.ai.timeout_ms),
		)
	}

	pub fn system_prompt(&self) -> &str {
		&self.system_prompt
	}
}
