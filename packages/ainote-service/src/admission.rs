use std::{fmt, sync::Arc};

use serde::Serialize;

use crate::{
	CompletionProvider, Error, NoteStore, Result, dependency::DependencyKind,
	supervisor::ConnectionSupervisor,
};

/// Plain CRUD.
pub const STORE_ONLY: &[DependencyKind] = &[DependencyKind::Store];
/// Annotation calls the provider before writing.
pub const STORE_AND_AI: &[DependencyKind] = &[DependencyKind::Store, DependencyKind::AiProvider];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unavailable {
	pub dependency: DependencyKind,
	pub reason: String,
}
impl fmt::Display for Unavailable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} is {}", self.dependency, self.reason)
	}
}

/// Proof that a request was admitted. Carries the clients of exactly the dependencies it was
/// admitted for.
#[derive(Clone, Default)]
pub struct Admission {
	store: Option<Arc<dyn NoteStore>>,
	ai_provider: Option<Arc<dyn CompletionProvider>>,
}
impl Admission {
	pub fn store(&self) -> Result<&dyn NoteStore> {
		self.store.as_deref().ok_or_else(|| not_admitted(DependencyKind::Store))
	}

	pub fn ai_provider(&self) -> Result<&dyn CompletionProvider> {
		self.ai_provider.as_deref().ok_or_else(|| not_admitted(DependencyKind::AiProvider))
	}
}

pub struct AdmissionGate {
	supervisor: Arc<ConnectionSupervisor>,
}
impl AdmissionGate {
	pub fn new(supervisor: Arc<ConnectionSupervisor>) -> Self {
		Self { supervisor }
	}

	/// Checks the current snapshot on every call. Rejects with one reason per dependency that is
	/// not ready.
	pub fn admit(&self, required: &[DependencyKind]) -> Result<Admission> {
		let snapshot = self.supervisor.snapshot();
		let mut admission = Admission::default();
		let mut unavailable = Vec::new();

		for &kind in required {
			let state = snapshot.state(kind);

			if !state.is_ready() {
				unavailable.push(Unavailable { dependency: kind, reason: state.describe() });

				continue;
			}

			match kind {
				DependencyKind::Store => admission.store = self.supervisor.store().client(),
				DependencyKind::AiProvider =>
					admission.ai_provider = self.supervisor.ai_provider().client(),
			}
		}

		if !unavailable.is_empty() {
			tracing::warn!(
				unavailable = %unavailable.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "),
				"Request rejected by admission gate."
			);

			return Err(Error::ServiceUnavailable { unavailable });
		}

		Ok(admission)
	}
}

fn not_admitted(kind: DependencyKind) -> Error {
	Error::ServiceUnavailable {
		unavailable: vec![Unavailable {
			dependency: kind,
			reason: "not admitted for this request".to_string(),
		}],
	}
}
