use std::sync::Arc;

use crate::{
	BoxFuture, CompletionProvider, NoteStore, OpenAiCompletion,
	dependency::{ConnectFailure, Connector, FailureReason},
};
use ainote_config::{AiSettings, StoreSettings};
use ainote_providers::probe;
use ainote_storage::db::Db;

pub struct PgConnector {
	settings: StoreSettings,
}
impl PgConnector {
	pub fn new(settings: StoreSettings) -> Self {
		Self { settings }
	}

	pub fn boxed(settings: StoreSettings) -> Box<dyn Connector<Arc<dyn NoteStore>>> {
		Box::new(Self::new(settings))
	}
}
impl Connector<Arc<dyn NoteStore>> for PgConnector {
	fn connect(&self) -> BoxFuture<'_, Result<Arc<dyn NoteStore>, ConnectFailure>> {
		Box::pin(async move {
			let db = Db::connect(&self.settings).await.map_err(classify_store_error)?;

			if let Err(err) = db.ensure_schema().await {
				db.pool.close().await;

				return Err(classify_store_error(err));
			}

			Ok(Arc::new(db) as Arc<dyn NoteStore>)
		})
	}

	fn target(&self) -> String {
		let StoreSettings { host, port, user, database, .. } = &self.settings;

		format!("postgres://{user}@{host}:{port}/{database}")
	}
}

pub struct OpenAiConnector {
	settings: AiSettings,
}
impl OpenAiConnector {
	pub fn new(settings: AiSettings) -> Self {
		Self { settings }
	}

	pub fn boxed(settings: AiSettings) -> Box<dyn Connector<Arc<dyn CompletionProvider>>> {
		Box::new(Self::new(settings))
	}
}
impl Connector<Arc<dyn CompletionProvider>> for OpenAiConnector {
	fn connect(&self) -> BoxFuture<'_, Result<Arc<dyn CompletionProvider>, ConnectFailure>> {
		Box::pin(async move {
			let client = ainote_providers::client(&self.settings).map_err(classify_ai_error)?;

			if self.settings.verify_on_start {
				probe::list_models(&client, &self.settings).await.map_err(classify_ai_error)?;
			}

			Ok(Arc::new(OpenAiCompletion::new(client, self.settings.clone()))
				as Arc<dyn CompletionProvider>)
		})
	}

	fn target(&self) -> String {
		format!("{}{} ({})", self.settings.api_base, self.settings.path, self.settings.model)
	}
}

pub fn classify_store_error(err: ainote_storage::Error) -> ConnectFailure {
	let reason = match &err {
		ainote_storage::Error::Sqlx(sqlx::Error::Database(db_err)) =>
			match db_err.code().as_deref() {
				// invalid_password, invalid_authorization_specification
				Some("28P01" | "28000") => FailureReason::AuthenticationRejected,
				// invalid_catalog_name
				Some("3D000") => FailureReason::ResourceAbsent,
				_ => FailureReason::Other,
			},
		ainote_storage::Error::Sqlx(
			sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut,
		) => FailureReason::EndpointUnreachable,
		_ => FailureReason::Other,
	};

	ConnectFailure { reason, detail: err.to_string() }
}

pub fn classify_ai_error(err: ainote_providers::Error) -> ConnectFailure {
	let reason = match &err {
		ainote_providers::Error::Status { status: 401 | 403, .. } =>
			FailureReason::AuthenticationRejected,
		ainote_providers::Error::Status { status: 404, .. } => FailureReason::ResourceAbsent,
		err if err.is_unreachable() => FailureReason::EndpointUnreachable,
		_ => FailureReason::Other,
	};

	ConnectFailure { reason, detail: err.to_string() }
}
