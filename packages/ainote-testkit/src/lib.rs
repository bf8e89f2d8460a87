mod error;

pub use error::{Error, Result};

use std::{env, thread};

use sqlx::{
	Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

use ainote_config::StoreSettings;

/// Admin database used when the configured one refuses the connection.
const FALLBACK_ADMIN_DATABASE: &str = "template1";

/// A throwaway database on the server named by the `AINOTE_TEST_DB_*` variables.
///
/// Dropped by [`TestDatabase::cleanup`], or on `Drop` as a fallback.
pub struct TestDatabase {
	settings: StoreSettings,
	admin: StoreSettings,
	dropped: bool,
}
impl TestDatabase {
	pub async fn new(base: &StoreSettings) -> Result<Self> {
		let (admin, mut conn) = connect_admin(base).await?;
		let name = format!("ainote_test_{}", Uuid::new_v4().simple());

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str()).await.map_err(|source| {
			Error::Database { action: "create", name: name.clone(), source }
		})?;

		Ok(Self { settings: StoreSettings { database: name, ..base.clone() }, admin, dropped: false })
	}

	/// Store settings pointing at the test database.
	pub fn settings(&self) -> &StoreSettings {
		&self.settings
	}

	pub async fn cleanup(mut self) -> Result<()> {
		drop_database(&self.admin, &self.settings.database).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let admin = self.admin.clone();
		let name = self.settings.database.clone();
		// The test runtime may already be shutting down, so cleanup gets its own.
		let outcome = thread::spawn(move || -> Result<()> {
			Builder::new_current_thread()
				.enable_all()
				.build()?
				.block_on(drop_database(&admin, &name))
		})
		.join();

		match outcome {
			Ok(Ok(())) => {},
			Ok(Err(err)) => eprintln!("Test database cleanup failed: {err}."),
			Err(_) => eprintln!("Test database cleanup thread panicked."),
		}
	}
}

/// Reads the base server settings for database-backed tests.
///
/// Returns `None` unless host, user, and password are all set, so such tests can skip.
pub fn env_settings() -> Option<StoreSettings> {
	let var = |name| env::var(name).ok().filter(|value: &String| !value.trim().is_empty());

	Some(StoreSettings {
		host: var("AINOTE_TEST_DB_HOST")?,
		port: var("AINOTE_TEST_DB_PORT").and_then(|value| value.parse().ok()).unwrap_or(5_432),
		user: var("AINOTE_TEST_DB_USER")?,
		password: var("AINOTE_TEST_DB_PASSWORD")?,
		database: "postgres".to_string(),
		pool_max_conns: 2,
		connect_timeout_ms: 5_000,
	})
}

fn connect_options(settings: &StoreSettings) -> PgConnectOptions {
	PgConnectOptions::new()
		.host(&settings.host)
		.port(settings.port)
		.username(&settings.user)
		.password(&settings.password)
		.database(&settings.database)
}

async fn connect_admin(base: &StoreSettings) -> Result<(StoreSettings, PgConnection)> {
	let primary = base.clone();
	let source = match PgConnection::connect_with(&connect_options(&primary)).await {
		Ok(conn) => return Ok((primary, conn)),
		Err(err) => err,
	};
	let fallback = StoreSettings { database: FALLBACK_ADMIN_DATABASE.to_string(), ..base.clone() };

	match PgConnection::connect_with(&connect_options(&fallback)).await {
		Ok(conn) => Ok((fallback, conn)),
		Err(_) => Err(Error::AdminUnavailable { host: base.host.clone(), port: base.port, source }),
	}
}

async fn drop_database(admin: &StoreSettings, name: &str) -> Result<()> {
	let database_error =
		|source| Error::Database { action: "drop", name: name.to_string(), source };
	let mut conn =
		PgConnection::connect_with(&connect_options(admin)).await.map_err(database_error)?;

	// FORCE terminates sessions still attached from pools the test did not close.
	conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE)"#).as_str())
		.await
		.map_err(database_error)?;

	Ok(())
}
