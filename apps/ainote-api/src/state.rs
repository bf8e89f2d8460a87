use std::sync::Arc;

use ainote_config::Config;
use ainote_service::{ConnectionSupervisor, NoteService, NoteWorkflow, RetryPolicy};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<NoteService>,
}
impl AppState {
	/// Brings every dependency up before the server accepts requests. Never fails: a dependency
	/// that cannot be reached is recorded and its requests are rejected later.
	pub async fn new(config: &Config) -> Self {
		let mut supervisor = ConnectionSupervisor::from_config(config);

		supervisor.bring_up(&RetryPolicy::from(&config.startup)).await;

		Self::from_service(NoteService::new(supervisor, NoteWorkflow::from_config(config)))
	}

	pub fn from_service(service: NoteService) -> Self {
		Self { service: Arc::new(service) }
	}
}
