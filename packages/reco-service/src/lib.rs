pub mod ranking;
pub mod recommend;

pub use recommend::{RecommendRequest, RecommendResponse};

use std::{future::Future, pin::Pin, sync::Arc};

use reco_config::Config;
use reco_providers::EmbeddingClient;

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Text-to-vector collaborator.
///
/// The ranking pipeline only ever talks to this trait, so tests inject
/// deterministic stubs and no network is required outside
/// [`EmbeddingClient`].
pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		texts: &'a [String],
	) -> BoxFuture<'a, reco_providers::Result<Vec<Vec<f32>>>>;
}

impl EmbeddingProvider for EmbeddingClient {
	fn embed<'a>(
		&'a self,
		texts: &'a [String],
	) -> BoxFuture<'a, reco_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(EmbeddingClient::embed(self, texts))
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Embedding/Ranking failed: {detail}")]
	RankingFailed { status: Option<u16>, detail: String },
}

impl From<reco_providers::Error> for ServiceError {
	fn from(err: reco_providers::Error) -> Self {
		Self::RankingFailed { status: err.status(), detail: err.to_string() }
	}
}

pub struct RecoService {
	pub cfg: Config,
	pub provider: Arc<dyn EmbeddingProvider>,
}

impl RecoService {
	/// Builds the service with the default HTTP embedding client.
	pub fn new(cfg: Config) -> reco_providers::Result<Self> {
		let client = EmbeddingClient::new(&cfg.providers.embedding)?;

		Ok(Self::with_provider(cfg, Arc::new(client)))
	}

	pub fn with_provider(cfg: Config, provider: Arc<dyn EmbeddingProvider>) -> Self {
		Self { cfg, provider }
	}
}
