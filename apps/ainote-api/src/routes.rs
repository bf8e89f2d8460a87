use std::any::Any;

use axum::{
	Json, Router,
	body::Body,
	extract::{Path, State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use ainote_service::{Error, NoteItem, ReadinessSnapshot};

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
	#[serde(default)]
	pub content: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatusBody {
	message: &'static str,
	version: &'static str,
	status: ReadinessSnapshot,
}

#[derive(Debug, Serialize)]
struct CreatedBody {
	message: &'static str,
	id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeletedBody {
	message: &'static str,
	deleted_count: u64,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidInput { message } => json_error(
				StatusCode::BAD_REQUEST,
				"INVALID_INPUT",
				message,
				Some(vec!["$.content".to_string()]),
			),
			Error::ServiceUnavailable { unavailable } => json_error(
				StatusCode::SERVICE_UNAVAILABLE,
				"SERVICE_UNAVAILABLE",
				"A required service is currently unavailable. Try again later.",
				Some(unavailable.iter().map(ToString::to_string).collect()),
			),
			// Logged where they occur. The body never carries the underlying message.
			Error::AiServiceFailure { .. } => json_error(
				StatusCode::INTERNAL_SERVER_ERROR,
				"AI_SERVICE_FAILURE",
				"The AI service failed to respond.",
				None,
			),
			Error::PersistenceFailure { .. } => json_error(
				StatusCode::INTERNAL_SERVER_ERROR,
				"PERSISTENCE_FAILURE",
				"Failed to access stored notes.",
				None,
			),
			Error::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "NOT_FOUND", message, None),
		}
	}
}
impl From<JsonRejection> for ApiError {
	fn from(err: JsonRejection) -> Self {
		json_error(StatusCode::BAD_REQUEST, "INVALID_INPUT", err.body_text(), None)
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/", get(status))
		.route("/health", get(health))
		.route("/notes", post(annotate_note).get(list_notes).delete(delete_all_notes))
		.route("/notes/plain", post(create_note))
		.route("/notes/{id}", delete(delete_note))
		.fallback(not_found)
		.with_state(state)
		.layer(CatchPanicLayer::custom(handle_panic))
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}

async fn status(State(state): State<AppState>) -> Json<StatusBody> {
	Json(StatusBody {
		message: "Server is running.",
		version: ainote_cli::VERSION,
		status: state.service.snapshot(),
	})
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn annotate_note(
	State(state): State<AppState>,
	payload: Result<Json<NoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedBody>), ApiError> {
	let Json(payload) = payload?;
	let response =
		state.service.annotate_note(payload.content.as_deref().unwrap_or_default()).await?;

	Ok((StatusCode::CREATED, Json(CreatedBody { message: "Note saved.", id: response.id })))
}

async fn create_note(
	State(state): State<AppState>,
	payload: Result<Json<NoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedBody>), ApiError> {
	let Json(payload) = payload?;
	let response =
		state.service.create_note(payload.content.as_deref().unwrap_or_default()).await?;

	Ok((StatusCode::CREATED, Json(CreatedBody { message: "Note saved.", id: response.id })))
}

async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<NoteItem>>, ApiError> {
	let notes = state.service.list_notes().await?;

	Ok(Json(notes))
}

async fn delete_note(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<DeletedBody>, ApiError> {
	let response = state.service.delete_note_by_key(&id).await?;

	Ok(Json(DeletedBody { message: "Note deleted.", deleted_count: response.deleted_count }))
}

async fn delete_all_notes(State(state): State<AppState>) -> Result<Json<DeletedBody>, ApiError> {
	let response = state.service.delete_all_notes().await?;

	Ok(Json(DeletedBody { message: "All notes deleted.", deleted_count: response.deleted_count }))
}

async fn not_found() -> ApiError {
	json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found.", None)
}

fn handle_panic(_: Box<dyn Any + Send + 'static>) -> Response<Body> {
	tracing::error!("Request handler panicked.");

	json_error(
		StatusCode::INTERNAL_SERVER_ERROR,
		"INTERNAL_ERROR",
		"An unexpected error occurred.",
		None,
	)
	.into_response()
}
