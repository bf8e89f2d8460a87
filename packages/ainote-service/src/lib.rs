pub mod add_note;
pub mod admission;
pub mod connectors;
pub mod delete;
pub mod dependency;
pub mod list;
pub mod supervisor;
pub mod workflow;

mod error;

pub use add_note::AddNoteResponse;
pub use admission::{Admission, AdmissionGate, STORE_AND_AI, STORE_ONLY, Unavailable};
pub use delete::DeleteResponse;
pub use dependency::{DependencyKind, DependencyState, FailureReason};
pub use error::{Error, Result};
pub use list::NoteItem;
pub use supervisor::{ConnectionSupervisor, ReadinessSnapshot, RetryPolicy};
pub use workflow::{DEFAULT_SYSTEM_PROMPT, NoteWorkflow};

use std::{future::Future, pin::Pin, sync::Arc};

use reqwest::Client;

use ainote_config::AiSettings;
use ainote_providers::completion;
use ainote_storage::{
	db::Db,
	models::{NewNote, Note},
	queries,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Persistence seam for notes. Postgres in production, in-memory in tests.
pub trait NoteStore
where
	Self: Send + Sync,
{
	fn insert_note<'a>(&'a self, note: &'a NewNote) -> BoxFuture<'a, ainote_storage::Result<i64>>;

	fn list_notes(&self) -> BoxFuture<'_, ainote_storage::Result<Vec<Note>>>;

	fn delete_note(&self, id: i64) -> BoxFuture<'_, ainote_storage::Result<u64>>;

	fn delete_all_notes(&self) -> BoxFuture<'_, ainote_storage::Result<u64>>;
}

pub trait CompletionProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		system: &'a str,
		user: &'a str,
	) -> BoxFuture<'a, ainote_providers::Result<String>>;
}

pub struct OpenAiCompletion {
	client: Client,
	cfg: AiSettings,
}
impl OpenAiCompletion {
	pub fn new(client: Client, cfg: AiSettings) -> Self {
		Self { client, cfg }
	}
}
impl CompletionProvider for OpenAiCompletion {
	fn complete<'a>(
		&'a self,
		system: &'a str,
		user: &'a str,
	) -> BoxFuture<'a, ainote_providers::Result<String>> {
		Box::pin(completion::complete(&self.client, &self.cfg, system, user))
	}
}

impl NoteStore for Db {
	fn insert_note<'a>(&'a self, note: &'a NewNote) -> BoxFuture<'a, ainote_storage::Result<i64>> {
		Box::pin(queries::insert_note(self, note))
	}

	fn list_notes(&self) -> BoxFuture<'_, ainote_storage::Result<Vec<Note>>> {
		Box::pin(queries::list_notes(self))
	}

	fn delete_note(&self, id: i64) -> BoxFuture<'_, ainote_storage::Result<u64>> {
		Box::pin(queries::delete_note(self, id))
	}

	fn delete_all_notes(&self) -> BoxFuture<'_, ainote_storage::Result<u64>> {
		Box::pin(queries::delete_all_notes(self))
	}
}

/// Request entry point: every operation is admitted by the gate before the workflow runs.
pub struct NoteService {
	supervisor: Arc<ConnectionSupervisor>,
	gate: AdmissionGate,
	workflow: NoteWorkflow,
}
impl NoteService {
	/// Freezes a supervisor whose bring-up has completed.
	pub fn new(supervisor: ConnectionSupervisor, workflow: NoteWorkflow) -> Self {
		let supervisor = Arc::new(supervisor);
		let gate = AdmissionGate::new(supervisor.clone());

		Self { supervisor, gate, workflow }
	}

	pub fn snapshot(&self) -> ReadinessSnapshot {
		self.supervisor.snapshot()
	}

	pub async fn create_note(&self, content: &str) -> Result<AddNoteResponse> {
		let admission = self.gate.admit(STORE_ONLY)?;

		self.workflow.create_note(&admission, content).await
	}

	pub async fn annotate_note(&self, content: &str) -> Result<AddNoteResponse> {
		let admission = self.gate.admit(STORE_AND_AI)?;

		self.workflow.annotate_note(&admission, content).await
	}

	pub async fn list_notes(&self) -> Result<Vec<NoteItem>> {
		let admission = self.gate.admit(STORE_ONLY)?;

		self.workflow.list_notes(&admission).await
	}

	pub async fn delete_note(&self, id: i64) -> Result<DeleteResponse> {
		let admission = self.gate.admit(STORE_ONLY)?;

		self.workflow.delete_note(&admission, id).await
	}

	/// Deletes by a raw path key. Admission runs first, so a key that is not a note id is only
	/// reported as missing when the store is ready.
	pub async fn delete_note_by_key(&self, key: &str) -> Result<DeleteResponse> {
		let admission = self.gate.admit(STORE_ONLY)?;
		// Store ids are integers, so anything else can never match a note.
		let Ok(id) = key.parse::<i64>() else {
			return Err(Error::NotFound { message: format!("No note with id {key}.") });
		};

		self.workflow.delete_note(&admission, id).await
	}

	pub async fn delete_all_notes(&self) -> Result<DeleteResponse> {
		let admission = self.gate.admit(STORE_ONLY)?;

		self.workflow.delete_all_notes(&admission).await
	}
}
