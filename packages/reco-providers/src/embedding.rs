use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{Error, Result};

/// HTTP client for the text-embedding provider.
///
/// Holds one pooled `reqwest::Client` with the configured request timeout
/// and precomputed auth headers; a single instance is shared by all
/// in-flight requests.
pub struct EmbeddingClient {
	http: Client,
	endpoint: String,
	headers: reqwest::header::HeaderMap,
	model: String,
	dimensions: u32,
}

impl EmbeddingClient {
	pub fn new(cfg: &reco_config::EmbeddingProviderConfig) -> Result<Self> {
		let http = Client::builder()
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.build()
			.map_err(|err| Error::InvalidConfig {
				message: format!("Failed to build embedding HTTP client: {err}"),
			})?;
		let headers = crate::auth_headers(&cfg.api_key, &cfg.default_headers)?;
		let endpoint = format!("{}{}", cfg.api_base, cfg.path);

		Ok(Self { http, endpoint, headers, model: cfg.model.clone(), dimensions: cfg.dimensions })
	}

	/// Embeds all `texts` in one batched call.
	///
	/// Returns exactly one vector per input, in input order; any count
	/// mismatch from the provider is reported as a malformed response.
	pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		let body = serde_json::json!({
			"model": self.model,
			"input": texts,
			"dimensions": self.dimensions,
		});
		let res = self
			.http
			.post(&self.endpoint)
			.headers(self.headers.clone())
			.json(&body)
			.send()
			.await
			.map_err(transport_error)?;
		let status = res.status();

		if status.is_client_error() {
			let detail = res.text().await.unwrap_or_default();

			return Err(Error::Rejected {
				status: status.as_u16(),
				message: rejection_detail(status, &detail),
			});
		}
		if !status.is_success() {
			return Err(Error::Unavailable {
				message: format!("Embedding provider returned status {status}."),
			});
		}

		let json: Value = res.json().await.map_err(|err| Error::MalformedResponse {
			message: format!("Failed to decode embedding response: {err}"),
		})?;
		let vectors = parse_embedding_response(json)?;

		if vectors.len() != texts.len() {
			return Err(Error::MalformedResponse {
				message: format!("Expected {} vectors, got {}.", texts.len(), vectors.len()),
			});
		}

		Ok(vectors)
	}
}

fn transport_error(err: reqwest::Error) -> Error {
	if err.is_timeout() {
		Error::Unavailable { message: "Embedding request timed out.".to_string() }
	} else {
		Error::Unavailable { message: err.to_string() }
	}
}

fn rejection_detail(status: StatusCode, detail: &str) -> String {
	let trimmed = detail.trim();

	if trimmed.is_empty() { format!("status {status}, no detail") } else { trimmed.to_string() }
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json
		.get("data")
		.and_then(|v| v.as_array())
		.ok_or_else(|| malformed("Embedding response is missing data array."))?;

	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item
			.get("embedding")
			.and_then(|v| v.as_array())
			.ok_or_else(|| malformed("Embedding item missing embedding array."))?;

		if embedding.is_empty() {
			return Err(malformed("Embedding vector is empty."));
		}

		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number =
				value.as_f64().ok_or_else(|| malformed("Embedding value must be numeric."))?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}

fn malformed(message: &str) -> Error {
	Error::MalformedResponse { message: message.to_string() }
}
