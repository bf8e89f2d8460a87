use std::{future::IntoFuture, time::Duration};

use axum::{
	Json, Router,
	http::{HeaderMap, StatusCode},
	response::IntoResponse,
	routing,
};
use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value};
use tokio::{
	net::TcpListener,
	sync::{oneshot, oneshot::Sender},
};

use ainote_config::AiSettings;
use ainote_providers::{Error, completion, probe};

fn settings(api_base: String, api_key: &str, timeout_ms: u64) -> AiSettings {
	AiSettings {
		api_key: api_key.to_string(),
		api_base,
		path: "/chat/completions".to_string(),
		model: "test-model".to_string(),
		max_tokens: 64,
		timeout_ms,
		verify_on_start: true,
		system_prompt: None,
		default_headers: Map::new(),
	}
}

async fn start_provider_server() -> (String, Sender<()>) {
	let app = Router::new()
		.route("/v1/models", routing::get(models_handler))
		.route("/v1/chat/completions", routing::post(completion_handler));
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind provider server.");
	let addr = listener.local_addr().expect("Failed to read provider server address.");
	let (tx, rx) = oneshot::channel();
	let server = axum::serve(listener, app).with_graceful_shutdown(async move {
		let _ = rx.await;
	});

	tokio::spawn(async move {
		let _ = server.into_future().await;
	});

	(format!("http://{addr}/v1"), tx)
}

fn authorized(headers: &HeaderMap) -> bool {
	headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()) == Some("Bearer good-key")
}

async fn models_handler(headers: HeaderMap) -> impl IntoResponse {
	if !authorized(&headers) {
		return (StatusCode::UNAUTHORIZED, "invalid api key").into_response();
	}

	Json(serde_json::json!({ "data": [{ "id": "test-model" }] })).into_response()
}

async fn completion_handler(headers: HeaderMap, Json(payload): Json<Value>) -> impl IntoResponse {
	if !authorized(&headers) {
		return (StatusCode::UNAUTHORIZED, "invalid api key").into_response();
	}

	let user = payload["messages"][1]["content"].as_str().unwrap_or_default().to_string();

	if user == "slow" {
		tokio::time::sleep(Duration::from_millis(500)).await;
	}

	let system_present = payload["messages"][0]["role"] == "system";
	let content = format!("system={system_present} echo={user}");

	Json(serde_json::json!({
		"choices": [{ "message": { "role": "assistant", "content": content } }]
	}))
	.into_response()
}

#[test]
fn builds_bearer_auth_header() {
	let headers =
		ainote_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn rejects_non_string_default_header() {
	let mut defaults = Map::new();

	defaults.insert("x-org".to_string(), serde_json::json!(1));

	let result = ainote_providers::auth_headers("secret", &defaults);

	assert!(matches!(result, Err(Error::InvalidConfig { .. })));
}

#[tokio::test]
async fn completion_returns_first_choice() {
	let (api_base, shutdown) = start_provider_server().await;
	let cfg = settings(api_base, "good-key", 2_000);
	let client = ainote_providers::client(&cfg).expect("Failed to build client.");
	let content = completion::complete(&client, &cfg, "advise", "Studied TCP")
		.await
		.expect("Completion should succeed.");

	assert_eq!(content, "system=true echo=Studied TCP");

	let _ = shutdown.send(());
}

#[tokio::test]
async fn rejected_key_keeps_http_status() {
	let (api_base, shutdown) = start_provider_server().await;
	let cfg = settings(api_base, "bad-key", 2_000);
	let client = ainote_providers::client(&cfg).expect("Failed to build client.");
	let err = probe::list_models(&client, &cfg).await.expect_err("Probe should be rejected.");

	assert!(matches!(err, Error::Status { status: 401, .. }), "Unexpected error: {err}");
	assert!(!err.is_unreachable());

	let _ = shutdown.send(());
}

#[tokio::test]
async fn probe_accepts_valid_key() {
	let (api_base, shutdown) = start_provider_server().await;
	let cfg = settings(api_base, "good-key", 2_000);
	let client = ainote_providers::client(&cfg).expect("Failed to build client.");

	probe::list_models(&client, &cfg).await.expect("Probe should succeed.");

	let _ = shutdown.send(());
}

#[tokio::test]
async fn completion_times_out() {
	let (api_base, shutdown) = start_provider_server().await;
	let cfg = settings(api_base, "good-key", 100);
	let client = ainote_providers::client(&cfg).expect("Failed to build client.");
	let err = completion::complete(&client, &cfg, "advise", "slow")
		.await
		.expect_err("Completion should time out.");

	assert!(err.is_unreachable(), "Unexpected error: {err}");

	let _ = shutdown.send(());
}

#[tokio::test]
async fn closed_port_is_unreachable() {
	let cfg = settings("http://127.0.0.1:1/v1".to_string(), "good-key", 1_000);
	let client = ainote_providers::client(&cfg).expect("Failed to build client.");
	let err = probe::list_models(&client, &cfg).await.expect_err("Probe should fail.");

	assert!(err.is_unreachable(), "Unexpected error: {err}");
}
