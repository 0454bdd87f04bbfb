use std::sync::Arc;

use axum::{
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::{Map, Value};
use tower::util::ServiceExt;

use reco_api::{routes, state::AppState};
use reco_config::{Config, EmbeddingProviderConfig, Providers, Ranking, Security, Service};
use reco_service::{BoxFuture, EmbeddingProvider, RecoService};
use reco_testkit::{MockBehavior, MockEmbeddingServer};

struct FixedVectors(Vec<Vec<f32>>);

impl EmbeddingProvider for FixedVectors {
	fn embed<'a>(
		&'a self,
		_texts: &'a [String],
	) -> BoxFuture<'a, reco_providers::Result<Vec<Vec<f32>>>> {
		let vectors = self.0.clone();

		Box::pin(async move { Ok(vectors) })
	}
}

struct FailingProvider(fn() -> reco_providers::Error);

impl EmbeddingProvider for FailingProvider {
	fn embed<'a>(
		&'a self,
		_texts: &'a [String],
	) -> BoxFuture<'a, reco_providers::Result<Vec<Vec<f32>>>> {
		let err = (self.0)();

		Box::pin(async move { Err(err) })
	}
}

fn test_config(api_base: String) -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		security: Security { bind_localhost_only: true },
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base,
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "test-model".to_string(),
				dimensions: 4,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		ranking: Ranking { top_k: 10, max_candidates: 64 },
	}
}

fn app_with_provider(provider: Arc<dyn EmbeddingProvider>) -> axum::Router {
	let config = test_config("http://127.0.0.1:1".to_string());
	let state = AppState::with_service(RecoService::with_provider(config, provider));

	routes::router(state)
}

fn reco_request(payload: Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri("/reco")
		.header("content-type", "application/json")
		.body(Body::from(payload.to_string()))
		.expect("Failed to build request.")
}

async fn response_json(response: axum::response::Response) -> Value {
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&bytes).expect("Failed to parse response.")
}

#[tokio::test]
async fn health_ok() {
	let app = app_with_provider(Arc::new(FixedVectors(Vec::new())));
	let response = app
		.oneshot(
			Request::builder().uri("/health").body(Body::empty()).expect("Failed to build request."),
		)
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn recommend_returns_ranked_ids() {
	let app = app_with_provider(Arc::new(FixedVectors(vec![
		vec![1.0, 0.0],
		vec![1.0, 0.0],
		vec![0.0, 1.0],
		vec![0.7, 0.7],
	])));
	let payload = serde_json::json!({
		"user_id": "u-1",
		"lat": 12.97,
		"lon": 77.59,
		"now_iso": "2026-08-07T10:00:00Z",
		"candidate_items": [
			{ "id": "a", "name": "Clay vase" },
			{ "id": "b", "name": "Steel bottle" },
			{ "id": "c", "name": "Terracotta bowl" }
		],
		"context": { "festival": "diwali" }
	});
	let response = app.oneshot(reco_request(payload)).await.expect("Failed to call /reco.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = response_json(response).await;

	assert_eq!(json["recommendations"], serde_json::json!(["a", "c", "b"]));
}

#[tokio::test]
async fn empty_candidate_list_yields_empty_recommendations() {
	// A failing provider proves the endpoint never reaches it.
	let app = app_with_provider(Arc::new(FailingProvider(|| reco_providers::Error::Unavailable {
		message: "must not be called".to_string(),
	})));
	let payload = serde_json::json!({ "candidate_items": [] });
	let response = app.oneshot(reco_request(payload)).await.expect("Failed to call /reco.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = response_json(response).await;

	assert_eq!(json["recommendations"], serde_json::json!([]));
}

#[tokio::test]
async fn provider_rejection_maps_to_upstream_status() {
	let app = app_with_provider(Arc::new(FailingProvider(|| reco_providers::Error::Rejected {
		status: 429,
		message: "quota exceeded".to_string(),
	})));
	let payload = serde_json::json!({ "candidate_items": [{ "id": "a" }] });
	let response = app.oneshot(reco_request(payload)).await.expect("Failed to call /reco.");

	assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

	let json = response_json(response).await;

	assert_eq!(json["message"], "Embedding/Ranking failed");
	assert!(json["detail"].as_str().expect("Missing detail.").contains("quota exceeded"));
	assert!(json.get("recommendations").is_none());
}

#[tokio::test]
async fn provider_unavailable_defaults_to_bad_gateway() {
	let app = app_with_provider(Arc::new(FailingProvider(|| reco_providers::Error::Unavailable {
		message: "connection refused".to_string(),
	})));
	let payload = serde_json::json!({ "candidate_items": [{ "id": "a" }] });
	let response = app.oneshot(reco_request(payload)).await.expect("Failed to call /reco.");

	assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

	let json = response_json(response).await;

	assert_eq!(json["message"], "Embedding/Ranking failed");
	assert!(json.get("recommendations").is_none());
}

#[tokio::test]
async fn blank_candidate_id_is_a_bad_request() {
	let app = app_with_provider(Arc::new(FixedVectors(Vec::new())));
	let payload = serde_json::json!({ "candidate_items": [{ "id": "  " }] });
	let response = app.oneshot(reco_request(payload)).await.expect("Failed to call /reco.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let json = response_json(response).await;

	assert!(
		json["message"].as_str().expect("Missing message.").contains("id must be non-empty"),
		"Unexpected message: {json}"
	);
}

#[tokio::test]
async fn candidate_without_id_is_rejected_by_the_extractor() {
	let app = app_with_provider(Arc::new(FixedVectors(Vec::new())));
	let payload = serde_json::json!({ "candidate_items": [{ "name": "Clay vase" }] });
	let response = app.oneshot(reco_request(payload)).await.expect("Failed to call /reco.");

	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn ranks_through_the_real_embedding_client() {
	let server = MockEmbeddingServer::start(MockBehavior::Deterministic { dimensions: 4 })
		.await
		.expect("Failed to start mock server.");
	let config = test_config(server.api_base());
	let state = AppState::new(config).expect("Failed to initialize app state.");
	let app = routes::router(state);
	let payload = serde_json::json!({
		"user_id": "u-1",
		"candidate_items": [
			{ "id": "a", "name": "Clay vase" },
			{ "id": "b", "name": "Silk scarf" },
			{ "id": "c", "name": "Walnut tray" }
		]
	});
	let response = app.oneshot(reco_request(payload)).await.expect("Failed to call /reco.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = response_json(response).await;
	let mut returned: Vec<String> = json["recommendations"]
		.as_array()
		.expect("Missing recommendations.")
		.iter()
		.map(|id| id.as_str().expect("Non-string id.").to_string())
		.collect();

	returned.sort();

	assert_eq!(returned, vec!["a", "b", "c"]);
}
