use crate::{
	Error, Result,
	db::Db,
	models::{NewNote, Note},
};

pub async fn insert_note(db: &Db, note: &NewNote) -> Result<i64> {
	if note.user_note.trim().is_empty() {
		return Err(Error::InvalidArgument("user_note must be non-empty.".to_string()));
	}

	let id: i64 = sqlx::query_scalar(
		"\
INSERT INTO notes (user_note, ai_note)
VALUES ($1, $2)
RETURNING id",
	)
	.bind(note.user_note.as_str())
	.bind(note.ai_note.as_deref())
	.fetch_one(&db.pool)
	.await?;

	Ok(id)
}

pub async fn list_notes(db: &Db) -> Result<Vec<Note>> {
	let notes = sqlx::query_as::<_, Note>(
		"\
SELECT id, user_note, ai_note, created_at
FROM notes
ORDER BY created_at DESC, id DESC",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(notes)
}

pub async fn delete_note(db: &Db, id: i64) -> Result<u64> {
	let result = sqlx::query("DELETE FROM notes WHERE id = $1").bind(id).execute(&db.pool).await?;

	Ok(result.rows_affected())
}

pub async fn delete_all_notes(db: &Db) -> Result<u64> {
	let result = sqlx::query("DELETE FROM notes").execute(&db.pool).await?;

	Ok(result.rows_affected())
}
