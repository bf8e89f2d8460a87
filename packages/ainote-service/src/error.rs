use crate::admission::Unavailable;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid input: {message}")]
	InvalidInput { message: String },
	#[error("Service unavailable: {}", describe_unavailable(.unavailable))]
	ServiceUnavailable { unavailable: Vec<Unavailable> },
	#[error("AI service failure: {message}")]
	AiServiceFailure { message: String },
	#[error("Persistence failure: {message}")]
	PersistenceFailure { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
}
impl From<ainote_storage::Error> for Error {
	fn from(err: ainote_storage::Error) -> Self {
		match err {
			ainote_storage::Error::InvalidArgument(message) => Self::InvalidInput { message },
			ainote_storage::Error::Sqlx(inner) =>
				Self::PersistenceFailure { message: inner.to_string() },
		}
	}
}

fn describe_unavailable(unavailable: &[Unavailable]) -> String {
	unavailable.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
