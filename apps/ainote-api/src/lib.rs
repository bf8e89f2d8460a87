pub mod routes;
pub mod state;

use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use color_eyre::eyre::eyre;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::EnvFilter;

use crate::state::AppState;
use ainote_service::ReadinessSnapshot;

#[derive(Debug, Parser)]
#[command(
	version = ainote_cli::VERSION,
	rename_all = "kebab",
	styles = ainote_cli::styles(),
)]
pub struct Args {
	/// Optional TOML file. Environment variables take precedence over it.
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: Option<PathBuf>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = ainote_config::load(args.config.as_deref())?;

	init_tracing(&config)?;

	let http_addr: SocketAddr = config.service.http_bind.parse()?;
	let state = AppState::new(&config).await;

	log_summary(http_addr, &state.service.snapshot());

	let app = routes::router(state);
	let listener = TcpListener::bind(http_addr).await.inspect_err(|err| {
		tracing::error!(%http_addr, error = %err, "Failed to bind HTTP listener.");
	})?;

	tracing::info!(%http_addr, "HTTP server listening.");

	axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await.inspect_err(
		|err| {
			tracing::error!(error = %err, "HTTP server failed.");
		},
	)?;

	tracing::info!("HTTP server stopped.");

	Ok(())
}

fn init_tracing(config: &ainote_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.try_init()
		.map_err(|err| eyre!("Failed to install tracing subscriber: {err}"))
}

fn log_summary(http_addr: SocketAddr, snapshot: &ReadinessSnapshot) {
	tracing::info!(
		port = http_addr.port(),
		store = %snapshot.store.describe(),
		ai_provider = %snapshot.ai_provider.describe(),
		"Startup complete."
	);
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(err) = signal::ctrl_c().await {
			tracing::error!(error = %err, "Failed to listen for Ctrl+C.");

			std::future::pending::<()>().await;
		}
	};
	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			},
			Err(err) => {
				tracing::error!(error = %err, "Failed to listen for SIGTERM.");

				std::future::pending::<()>().await;
			},
		}
	};
	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		() = ctrl_c => tracing::info!("Received Ctrl+C. Draining in-flight requests."),
		() = terminate => tracing::info!("Received SIGTERM. Draining in-flight requests."),
	}
}
