use std::time::Duration;

use sqlx::{
	PgPool,
	postgres::{PgConnectOptions, PgPoolOptions},
};

use crate::{Result, schema};

pub struct Db {
	pub pool: PgPool,
}
impl Db {
	/// Opens the pool and waits for the first connection, so a bad target fails here rather than
	/// on the first request.
	pub async fn connect(cfg: &ainote_config::StoreSettings) -> Result<Self> {
		let options = PgConnectOptions::new()
			.host(&cfg.host)
			.port(cfg.port)
			.username(&cfg.user)
			.password(&cfg.password)
			.database(&cfg.database);
		let pool = PgPoolOptions::new()
			.max_connections(cfg.pool_max_conns)
			.acquire_timeout(Duration::from_millis(cfg.connect_timeout_ms))
			.connect_with(options)
			.await?;

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema();
		let lock_id: i64 = 4_610_221;
		// Advisory locks are held per connection. Use a single transaction so the lock is scoped to
		// one connection and automatically released when the transaction ends.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)").bind(lock_id).execute(&mut *tx).await?;

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		Ok(())
	}
}
