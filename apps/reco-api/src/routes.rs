use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;

use reco_service::{RecommendRequest, RecommendResponse, ServiceError};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/reco", post(recommend))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn recommend(
	State(state): State<AppState>,
	Json(payload): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, ApiError> {
	let response = state.service.recommend(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	detail: Option<Value>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	message: String,
	detail: Option<Value>,
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } => {
				Self { status: StatusCode::BAD_REQUEST, message, detail: None }
			},
			ServiceError::RankingFailed { status, detail } => Self {
				status: status
					.and_then(|code| StatusCode::from_u16(code).ok())
					.unwrap_or(StatusCode::BAD_GATEWAY),
				message: "Embedding/Ranking failed".to_string(),
				detail: Some(Value::String(detail)),
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		if self.status.is_server_error() {
			tracing::warn!(status = %self.status, message = %self.message, "Request failed.");
		}

		let body = ErrorBody { message: self.message, detail: self.detail };

		(self.status, Json(body)).into_response()
	}
}
