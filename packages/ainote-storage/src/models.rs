use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Note {
	pub id: i64,
	pub user_note: String,
	pub ai_note: Option<String>,
	pub created_at: OffsetDateTime,
}

/// A note as submitted for its single insert. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
	pub user_note: String,
	pub ai_note: Option<String>,
}
