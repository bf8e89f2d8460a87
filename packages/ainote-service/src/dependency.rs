use std::fmt;

use serde::Serialize;

use crate::BoxFuture;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
	Store,
	AiProvider,
}
impl DependencyKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Store => "store",
			Self::AiProvider => "ai_provider",
		}
	}
}
impl fmt::Display for DependencyKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Why the last connection attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
	AuthenticationRejected,
	EndpointUnreachable,
	ResourceAbsent,
	Other,
}
impl FailureReason {
	/// Credentials and missing resources do not change between attempts.
	pub fn is_retryable(self) -> bool {
		matches!(self, Self::EndpointUnreachable | Self::Other)
	}

	pub fn describe(self) -> &'static str {
		match self {
			Self::AuthenticationRejected => "authentication rejected",
			Self::EndpointUnreachable => "endpoint unreachable",
			Self::ResourceAbsent => "target resource absent",
			Self::Other => "connection failed",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DependencyState {
	Unconfigured {
		missing: Vec<String>,
	},
	Unreachable {
		reason: FailureReason,
		#[serde(skip)]
		detail: String,
	},
	Ready,
}
impl DependencyState {
	pub fn is_ready(&self) -> bool {
		matches!(self, Self::Ready)
	}

	/// Human-readable reason, safe to return to clients.
	pub fn describe(&self) -> String {
		match self {
			Self::Unconfigured { missing } =>
				format!("not configured; missing {}", missing.join(", ")),
			Self::Unreachable { reason, .. } => format!("unreachable: {}", reason.describe()),
			Self::Ready => "ready".to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectFailure {
	pub reason: FailureReason,
	pub detail: String,
}

/// Performs a single connection attempt and yields the client on success.
pub trait Connector<C>
where
	Self: Send + Sync,
{
	fn connect(&self) -> BoxFuture<'_, Result<C, ConnectFailure>>;

	/// Non-secret description of the connection target for diagnostics.
	fn target(&self) -> String;
}

/// Owns one external dependency: its connector, its state, and its client once ready.
///
/// `state` is `Ready` exactly when `client` is `Some`.
pub struct DependencyHandle<C> {
	kind: DependencyKind,
	connector: Option<Box<dyn Connector<C>>>,
	state: DependencyState,
	client: Option<C>,
}
impl<C> DependencyHandle<C>
where
	C: Clone,
{
	/// Builds a handle from resolved settings. Incomplete settings leave the handle
	/// `Unconfigured` and no connector is ever built.
	pub fn configure<S, F>(
		kind: DependencyKind,
		settings: Result<S, Vec<&'static str>>,
		build: F,
	) -> Self
	where
		F: FnOnce(S) -> Box<dyn Connector<C>>,
	{
		match settings {
			Ok(settings) => Self::with_connector(kind, build(settings)),
			Err(missing) =>
				Self::unconfigured(kind, missing.into_iter().map(str::to_string).collect()),
		}
	}

	pub fn with_connector(kind: DependencyKind, connector: Box<dyn Connector<C>>) -> Self {
		Self {
			kind,
			connector: Some(connector),
			state: DependencyState::Unreachable {
				reason: FailureReason::Other,
				detail: "No connection attempt has been made.".to_string(),
			},
			client: None,
		}
	}

	pub fn unconfigured(kind: DependencyKind, missing: Vec<String>) -> Self {
		Self { kind, connector: None, state: DependencyState::Unconfigured { missing }, client: None }
	}

	/// Makes exactly one connection attempt. Failures are recorded in the state, never
	/// returned as errors. An unconfigured or ready handle is left untouched.
	pub async fn connect(&mut self) -> DependencyState {
		let Some(connector) = self.connector.as_ref() else {
			return self.state.clone();
		};

		if self.client.is_some() {
			return self.state.clone();
		}

		match connector.connect().await {
			Ok(client) => {
				self.client = Some(client);
				self.state = DependencyState::Ready;
			},
			Err(ConnectFailure { reason, detail }) => {
				tracing::debug!(
					dependency = %self.kind,
					target = %connector.target(),
					reason = reason.describe(),
					%detail,
					"Connection attempt failed."
				);

				self.state = DependencyState::Unreachable { reason, detail };
			},
		}

		self.state.clone()
	}

	pub fn is_ready(&self) -> bool {
		self.state.is_ready()
	}

	pub fn kind(&self) -> DependencyKind {
		self.kind
	}

	pub fn state(&self) -> &DependencyState {
		&self.state
	}

	pub fn target(&self) -> Option<String> {
		self.connector.as_ref().map(|connector| connector.target())
	}

	pub fn client(&self) -> Option<C> {
		self.client.clone()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	};

	use super::*;

	struct CountingConnector {
		calls: Arc<AtomicUsize>,
		outcome: Result<u32, ConnectFailure>,
	}
	impl Connector<u32> for CountingConnector {
		fn connect(&self) -> BoxFuture<'_, Result<u32, ConnectFailure>> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let outcome = self.outcome.clone();

			Box::pin(async move { outcome })
		}

		fn target(&self) -> String {
			"counting".to_string()
		}
	}

	fn counting(outcome: Result<u32, ConnectFailure>) -> (Box<dyn Connector<u32>>, Arc<AtomicUsize>) {
		let calls = Arc::new(AtomicUsize::new(0));

		(Box::new(CountingConnector { calls: calls.clone(), outcome }), calls)
	}

	#[tokio::test]
	async fn incomplete_settings_never_connect() {
		let calls = Arc::new(AtomicUsize::new(0));
		let built = calls.clone();
		let mut handle = DependencyHandle::<u32>::configure(
			DependencyKind::Store,
			Err::<(), _>(vec!["DB_HOST", "DB_PASSWORD"]),
			move |_| {
				built.fetch_add(1, Ordering::SeqCst);

				counting(Ok(1)).0
			},
		);
		let state = handle.connect().await;

		assert_eq!(
			state,
			DependencyState::Unconfigured {
				missing: vec!["DB_HOST".to_string(), "DB_PASSWORD".to_string()]
			}
		);
		assert!(!handle.is_ready());
		assert!(handle.client().is_none());
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn failure_is_captured_as_state() {
		let failure = ConnectFailure {
			reason: FailureReason::AuthenticationRejected,
			detail: "password authentication failed".to_string(),
		};
		let (connector, calls) = counting(Err(failure));
		let mut handle = DependencyHandle::with_connector(DependencyKind::Store, connector);
		let state = handle.connect().await;

		assert!(matches!(
			state,
			DependencyState::Unreachable { reason: FailureReason::AuthenticationRejected, .. }
		));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert!(handle.client().is_none());
	}

	#[tokio::test]
	async fn ready_handle_exposes_client_and_skips_reconnect() {
		let (connector, calls) = counting(Ok(7));
		let mut handle = DependencyHandle::with_connector(DependencyKind::AiProvider, connector);

		assert!(!handle.is_ready());
		assert_eq!(handle.connect().await, DependencyState::Ready);
		assert_eq!(handle.connect().await, DependencyState::Ready);
		assert_eq!(handle.client(), Some(7));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn describes_states_without_details() {
		let state = DependencyState::Unreachable {
			reason: FailureReason::EndpointUnreachable,
			detail: "connect to 10.0.0.5:5432 refused".to_string(),
		};

		assert_eq!(state.describe(), "unreachable: endpoint unreachable");

		let json = serde_json::to_value(&state).expect("Failed to serialize state.");

		assert_eq!(json, serde_json::json!({ "state": "unreachable", "reason": "endpoint_unreachable" }));
	}

	#[test]
	fn only_transient_reasons_retry() {
		assert!(FailureReason::EndpointUnreachable.is_retryable());
		assert!(FailureReason::Other.is_retryable());
		assert!(!FailureReason::AuthenticationRejected.is_retryable());
		assert!(!FailureReason::ResourceAbsent.is_retryable());
	}
}
