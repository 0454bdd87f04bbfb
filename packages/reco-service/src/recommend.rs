use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use reco_domain::{CandidateItem, SituationalContext, context_string, default_timestamp, item_text};

use crate::{RecoService, ServiceError, ServiceResult, ranking};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
	pub user_id: Option<String>,
	pub lat: Option<f64>,
	pub lon: Option<f64>,
	pub now_iso: Option<String>,
	#[serde(default)]
	pub candidate_items: Vec<CandidateItem>,
	#[serde(default)]
	pub context: SituationalContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
	pub recommendations: Vec<String>,
}

impl RecoService {
	/// Ranks the request's candidates against the synthesized context.
	///
	/// One batched provider call covers the context string and every
	/// candidate text; an empty candidate list resolves without any
	/// provider traffic.
	pub async fn recommend(&self, request: RecommendRequest) -> ServiceResult<RecommendResponse> {
		validate(&request, self.cfg.ranking.max_candidates)?;

		if request.candidate_items.is_empty() {
			return Ok(RecommendResponse { recommendations: Vec::new() });
		}

		let now_iso = request
			.now_iso
			.as_deref()
			.filter(|value| !value.trim().is_empty())
			.map(str::to_string)
			.unwrap_or_else(default_timestamp);
		let context_text = context_string(
			request.user_id.as_deref(),
			request.lat,
			request.lon,
			&now_iso,
			&request.context,
		);
		let mut texts = Vec::with_capacity(request.candidate_items.len() + 1);

		texts.push(context_text);

		for item in &request.candidate_items {
			texts.push(item_text(item));
		}

		let vectors = self.provider.embed(&texts).await?;

		// Providers must answer 1:1 with the inputs; recheck here so a
		// misbehaving stub cannot misalign ids and vectors.
		if vectors.len() != texts.len() {
			return Err(reco_providers::Error::MalformedResponse {
				message: format!("Expected {} vectors, got {}.", texts.len(), vectors.len()),
			}
			.into());
		}

		let mut vectors = vectors.into_iter();
		let Some(context_vector) = vectors.next() else {
			return Err(reco_providers::Error::MalformedResponse {
				message: "Embedding provider returned no vectors.".to_string(),
			}
			.into());
		};
		let items: Vec<(String, Vec<f32>)> =
			request.candidate_items.iter().map(|item| item.id.clone()).zip(vectors).collect();
		let ranked =
			ranking::rank_candidates(&context_vector, items, self.cfg.ranking.top_k as usize);

		tracing::debug!(
			candidates = request.candidate_items.len(),
			returned = ranked.len(),
			"Ranked recommendation candidates."
		);

		Ok(RecommendResponse { recommendations: ranked.into_iter().map(|item| item.id).collect() })
	}
}

fn validate(request: &RecommendRequest, max_candidates: u32) -> ServiceResult<()> {
	if request.candidate_items.len() > max_candidates as usize {
		return Err(ServiceError::InvalidRequest {
			message: format!("candidate_items must contain at most {max_candidates} items."),
		});
	}

	let mut seen = HashSet::new();

	for (index, item) in request.candidate_items.iter().enumerate() {
		if item.id.trim().is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: format!("candidate_items[{index}].id must be non-empty."),
			});
		}
		if !seen.insert(item.id.as_str()) {
			return Err(ServiceError::InvalidRequest {
				message: format!("candidate_items[{index}].id duplicates an earlier candidate."),
			});
		}
	}

	for (label, value) in [("lat", request.lat), ("lon", request.lon)] {
		if let Some(value) = value
			&& !value.is_finite()
		{
			return Err(ServiceError::InvalidRequest {
				message: format!("{label} must be a finite number."),
			});
		}
	}

	Ok(())
}
