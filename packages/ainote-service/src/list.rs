use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{NoteWorkflow, Result, admission::Admission};
use ainote_storage::models::Note;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteItem {
	pub id: i64,
	pub user_note: String,
	pub ai_note: Option<String>,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}
impl From<Note> for NoteItem {
	fn from(note: Note) -> Self {
		let Note { id, user_note, ai_note, created_at } = note;

		Self { id, user_note, ai_note, created_at }
	}
}

impl NoteWorkflow {
	/// Newest first, ties broken by id.
	pub async fn list_notes(&self, admission: &Admission) -> Result<Vec<NoteItem>> {
		let notes = admission.store()?.list_notes().await.map_err(|err| {
			tracing::error!(error = %err, "Failed to list notes.");

			err
		})?;

		Ok(notes.into_iter().map(NoteItem::from).collect())
	}
}
