pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("No admin database accepted a connection on {host}:{port}: {source}")]
	AdminUnavailable { host: String, port: u16, source: sqlx::Error },
	#[error("Failed to {action} test database {name}: {source}")]
	Database { action: &'static str, name: String, source: sqlx::Error },
	#[error(transparent)]
	Runtime(#[from] std::io::Error),
}
