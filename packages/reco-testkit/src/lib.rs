mod error;

pub use error::{Error, Result};

use std::{net::SocketAddr, time::Duration};

use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
};
use serde_json::Value;
use tokio::{net::TcpListener, task::JoinHandle};

/// Scripted behavior for [`MockEmbeddingServer`].
#[derive(Debug, Clone)]
pub enum MockBehavior {
	/// One deterministic vector of the given dimension per input text.
	Deterministic { dimensions: usize },
	/// A fixed vector batch, regardless of the inputs.
	Vectors(Vec<Vec<f32>>),
	/// Reply with the given status and an error message body.
	Reject { status: u16, message: String },
	/// Return one vector fewer than requested.
	DropLast { dimensions: usize },
	/// Sleep before answering; long enough to trip client timeouts.
	Delay(Duration),
}

/// In-process HTTP server speaking the embedding-provider wire format.
///
/// Binds an ephemeral loopback port so provider-client tests exercise real
/// request/response plumbing without any external service.
pub struct MockEmbeddingServer {
	addr: SocketAddr,
	handle: JoinHandle<()>,
}

impl MockEmbeddingServer {
	pub async fn start(behavior: MockBehavior) -> Result<Self> {
		let listener = TcpListener::bind("127.0.0.1:0").await.map_err(|err| {
			Error::Message(format!("Failed to bind mock embedding server: {err}."))
		})?;
		let addr = listener.local_addr().map_err(|err| {
			Error::Message(format!("Failed to read mock embedding server address: {err}."))
		})?;
		let app = Router::new().fallback(handle_embed).with_state(behavior);
		let handle = tokio::spawn(async move {
			if let Err(err) = axum::serve(listener, app).await {
				eprintln!("Mock embedding server failed: {err}.");
			}
		});

		Ok(Self { addr, handle })
	}

	/// Base URL to use as `providers.embedding.api_base`.
	pub fn api_base(&self) -> String {
		format!("http://{}", self.addr)
	}

	pub fn addr(&self) -> SocketAddr {
		self.addr
	}
}

impl Drop for MockEmbeddingServer {
	fn drop(&mut self) {
		self.handle.abort();
	}
}

/// Deterministic pseudo-embedding derived from the text bytes.
///
/// Not semantically meaningful; equal texts map to equal vectors, which is
/// all the pipeline tests need.
pub fn deterministic_vector(text: &str, dimensions: usize) -> Vec<f32> {
	let seed = text.bytes().fold(7u32, |acc, byte| acc.wrapping_mul(31).wrapping_add(byte as u32));

	(0..dimensions).map(|i| (((seed >> (i % 24)) & 0xff) as f32) / 255.0).collect()
}

async fn handle_embed(State(behavior): State<MockBehavior>, Json(body): Json<Value>) -> Response {
	let inputs: Vec<String> = body
		.get("input")
		.and_then(|v| v.as_array())
		.map(|texts| {
			texts.iter().map(|text| text.as_str().unwrap_or_default().to_string()).collect()
		})
		.unwrap_or_default();

	match behavior {
		MockBehavior::Deterministic { dimensions } => {
			let vectors: Vec<Vec<f32>> =
				inputs.iter().map(|text| deterministic_vector(text, dimensions)).collect();

			vectors_response(&vectors)
		},
		MockBehavior::Vectors(vectors) => vectors_response(&vectors),
		MockBehavior::Reject { status, message } => {
			let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST);

			(status, Json(serde_json::json!({ "error": { "message": message } }))).into_response()
		},
		MockBehavior::DropLast { dimensions } => {
			let vectors: Vec<Vec<f32>> = inputs
				.iter()
				.take(inputs.len().saturating_sub(1))
				.map(|text| deterministic_vector(text, dimensions))
				.collect();

			vectors_response(&vectors)
		},
		MockBehavior::Delay(duration) => {
			tokio::time::sleep(duration).await;

			let vectors: Vec<Vec<f32>> =
				inputs.iter().map(|text| deterministic_vector(text, 4)).collect();

			vectors_response(&vectors)
		},
	}
}

fn vectors_response(vectors: &[Vec<f32>]) -> Response {
	let data: Vec<Value> = vectors
		.iter()
		.enumerate()
		.map(|(index, vector)| serde_json::json!({ "index": index, "embedding": vector }))
		.collect();

	Json(serde_json::json!({ "data": data })).into_response()
}
