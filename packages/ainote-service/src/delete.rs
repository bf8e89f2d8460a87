use serde::{Deserialize, Serialize};

use crate::{Error, NoteWorkflow, Result, admission::Admission};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
	pub deleted_count: u64,
}

impl NoteWorkflow {
	pub async fn delete_note(&self, admission: &Admission, id: i64) -> Result<DeleteResponse> {
		let deleted_count = admission.store()?.delete_note(id).await.map_err(|err| {
			tracing::error!(note_id = id, error = %err, "Failed to delete note.");

			err
		})?;

		if deleted_count == 0 {
			return Err(Error::NotFound { message: format!("No note with id {id}.") });
		}

		tracing::info!(note_id = id, "Note deleted.");

		Ok(DeleteResponse { deleted_count })
	}

	/// Succeeds with a zero count when there is nothing to delete.
	pub async fn delete_all_notes(&self, admission: &Admission) -> Result<DeleteResponse> {
		let deleted_count = admission.store()?.delete_all_notes().await.map_err(|err| {
			tracing::error!(error = %err, "Failed to delete all notes.");

			err
		})?;

		tracing::info!(deleted_count, "All notes deleted.");

		Ok(DeleteResponse { deleted_count })
	}
}
