use std::sync::Arc;

use reco_service::RecoService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<RecoService>,
}
impl AppState {
	pub fn new(config: reco_config::Config) -> color_eyre::Result<Self> {
		let service = RecoService::new(config)?;

		Ok(Self { service: Arc::new(service) })
	}

	/// Wraps an already-built service; used by tests to inject stub
	/// embedding providers.
	pub fn with_service(service: RecoService) -> Self {
		Self { service: Arc::new(service) }
	}
}
