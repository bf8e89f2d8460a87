use serde::{Deserialize, Serialize};

use crate::{Error, NoteWorkflow, Result, admission::Admission};
use ainote_storage::models::NewNote;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddNoteResponse {
	pub id: i64,
}

impl NoteWorkflow {
	/// Persists the note as written, without an AI suggestion.
	pub async fn create_note(&self, admission: &Admission, content: &str) -> Result<AddNoteResponse> {
		let store = admission.store()?;
		let user_note = validate_content(content)?;
		let id = store
			.insert_note(&NewNote { user_note, ai_note: None })
			.await
			.map_err(|err| persistence_failure("create", err))?;

		tracing::info!(note_id = id, "Note created.");

		Ok(AddNoteResponse { id })
	}

	/// Asks the provider for a suggestion, then stores the note and the suggestion in one write.
	///
	/// Nothing is written unless the provider call succeeds. A failed write drops the suggestion.
	pub async fn annotate_note(
		&self,
		admission: &Admission,
		content: &str,
	) -> Result<AddNoteResponse> {
		let store = admission.store()?;
		let provider = admission.ai_provider()?;
		let user_note = validate_content(content)?;
		let ai_note = match tokio::time::timeout(
			self.ai_timeout,
			provider.complete(&self.system_prompt, &user_note),
		)
		.await
		{
			Ok(Ok(ai_note)) if !ai_note.trim().is_empty() => ai_note,
			Ok(Ok(_)) => {
				tracing::error!("AI provider returned an empty completion.");

				return Err(Error::AiServiceFailure {
					message: "AI provider returned an empty completion.".to_string(),
				});
			},
			Ok(Err(err)) => {
				tracing::error!(error = %err, "AI provider call failed.");

				return Err(Error::AiServiceFailure { message: err.to_string() });
			},
			Err(_) => {
				tracing::error!(
					timeout_ms = self.ai_timeout.as_millis() as u64,
					"AI provider call timed out."
				);

				return Err(Error::AiServiceFailure {
					message: "AI provider call timed out.".to_string(),
				});
			},
		};
		let id = store
			.insert_note(&NewNote { user_note, ai_note: Some(ai_note) })
			.await
			.map_err(|err| persistence_failure("annotate", err))?;

		tracing::info!(note_id = id, "Annotated note created.");

		Ok(AddNoteResponse { id })
	}
}

fn validate_content(content: &str) -> Result<String> {
	if content.trim().is_empty() {
		return Err(Error::InvalidInput { message: "content must be non-empty.".to_string() });
	}

	Ok(content.to_string())
}

fn persistence_failure(op: &'static str, err: ainote_storage::Error) -> Error {
	let err = Error::from(err);

	if let Error::PersistenceFailure { message } = &err {
		tracing::error!(op, error = %message, "Failed to persist note.");
	}

	err
}
