use std::{sync::Arc, time::Duration};

use serde::Serialize;

use crate::{
	CompletionProvider, NoteStore,
	connectors::{OpenAiConnector, PgConnector},
	dependency::{DependencyHandle, DependencyKind, DependencyState},
};
use ainote_config::{Config, Startup};

/// Startup retry schedule. Exponential backoff from `initial_backoff`, capped at `max_backoff`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
	pub max_attempts: u32,
	pub initial_backoff: Duration,
	pub max_backoff: Duration,
}
impl RetryPolicy {
	/// One attempt and no retry.
	pub fn once() -> Self {
		Self { max_attempts: 1, initial_backoff: Duration::ZERO, max_backoff: Duration::ZERO }
	}

	/// Delay after the given failed attempt (1-based).
	pub fn backoff(&self, attempt: u32) -> Duration {
		let exponent = attempt.saturating_sub(1).min(16);

		self.initial_backoff.saturating_mul(1 << exponent).min(self.max_backoff)
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self::from(&Startup::default())
	}
}
impl From<&Startup> for RetryPolicy {
	fn from(cfg: &Startup) -> Self {
		Self {
			max_attempts: cfg.connect_attempts.max(1),
			initial_backoff: Duration::from_millis(cfg.initial_backoff_ms),
			max_backoff: Duration::from_millis(cfg.max_backoff_ms),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessSnapshot {
	pub store: DependencyState,
	pub ai_provider: DependencyState,
}
impl ReadinessSnapshot {
	pub fn state(&self, kind: DependencyKind) -> &DependencyState {
		match kind {
			DependencyKind::Store => &self.store,
			DependencyKind::AiProvider => &self.ai_provider,
		}
	}
}

/// Owns every dependency handle. Mutated only by [`ConnectionSupervisor::bring_up`]; shared
/// read-only afterwards.
pub struct ConnectionSupervisor {
	store: DependencyHandle<Arc<dyn NoteStore>>,
	ai_provider: DependencyHandle<Arc<dyn CompletionProvider>>,
}
impl ConnectionSupervisor {
	pub fn new(
		store: DependencyHandle<Arc<dyn NoteStore>>,
		ai_provider: DependencyHandle<Arc<dyn CompletionProvider>>,
	) -> Self {
		Self { store, ai_provider }
	}

	/// Builds handles backed by Postgres and the OpenAI-compatible provider.
	pub fn from_config(cfg: &Config) -> Self {
		let store =
			DependencyHandle::configure(DependencyKind::Store, cfg.store.resolve(), PgConnector::boxed);
		let ai_provider = DependencyHandle::configure(
			DependencyKind::AiProvider,
			cfg.ai.resolve(),
			OpenAiConnector::boxed,
		);

		Self::new(store, ai_provider)
	}

	/// Connects every handle concurrently. Never fails: outcomes are recorded per handle.
	pub async fn bring_up(&mut self, policy: &RetryPolicy) {
		let Self { store, ai_provider } = self;

		tokio::join!(bring_up_handle(store, policy), bring_up_handle(ai_provider, policy));
	}

	/// Point-in-time view of every dependency. No I/O.
	pub fn snapshot(&self) -> ReadinessSnapshot {
		ReadinessSnapshot {
			store: self.store.state().clone(),
			ai_provider: self.ai_provider.state().clone(),
		}
	}

	pub fn store(&self) -> &DependencyHandle<Arc<dyn NoteStore>> {
		&self.store
	}

	pub fn ai_provider(&self) -> &DependencyHandle<Arc<dyn CompletionProvider>> {
		&self.ai_provider
	}
}

async fn bring_up_handle<C>(handle: &mut DependencyHandle<C>, policy: &RetryPolicy)
where
	C: Clone,
{
	let kind = handle.kind();
	let target = handle.target().unwrap_or_default();

	for attempt in 1..=policy.max_attempts {
		match handle.connect().await {
			DependencyState::Ready => {
				tracing::info!(dependency = %kind, %target, attempt, "Dependency ready.");

				return;
			},
			DependencyState::Unconfigured { missing } => {
				tracing::warn!(
					dependency = %kind,
					missing = %missing.join(", "),
					"Dependency is not configured. Requests that need it will be rejected."
				);

				return;
			},
			DependencyState::Unreachable { reason, detail } => {
				if !reason.is_retryable() || attempt == policy.max_attempts {
					tracing::error!(
						dependency = %kind,
						%target,
						attempt,
						reason = reason.describe(),
						%detail,
						"Dependency is unreachable. Requests that need it will be rejected until restart."
					);

					return;
				}

				let delay = policy.backoff(attempt);

				tracing::warn!(
					dependency = %kind,
					%target,
					attempt,
					reason = reason.describe(),
					retry_in_ms = delay.as_millis() as u64,
					"Dependency connection attempt failed. Retrying."
				);
				tokio::time::sleep(delay).await;
			},
		}
	}
}
