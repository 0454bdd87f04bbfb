use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Sentinel used when the requesting actor is not identified.
pub const ANONYMOUS_ACTOR: &str = "guest";
/// Fallback for an absent festival signal.
pub const DEFAULT_FESTIVAL: &str = "none";
/// Fallback for an absent weather signal.
pub const DEFAULT_WEATHER: &str = "normal";
/// Fallback for an absent coordinate.
pub const UNKNOWN_COORDINATE: &str = "unknown";

/// Optional ambient signals accompanying a recommendation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SituationalContext {
	pub festival: Option<String>,
	pub weather: Option<String>,
}

/// Encodes the requesting actor and situation as a single query anchor string.
///
/// The field order and `key=value; ...` shape are fixed: equal inputs yield
/// byte-identical output, so two logically-identical requests produce the
/// same embedding input.
pub fn context_string(
	user_id: Option<&str>,
	lat: Option<f64>,
	lon: Option<f64>,
	time_iso: &str,
	situation: &SituationalContext,
) -> String {
	let user = non_blank(user_id).unwrap_or(ANONYMOUS_ACTOR);
	let festival = non_blank(situation.festival.as_deref()).unwrap_or(DEFAULT_FESTIVAL);
	let weather = non_blank(situation.weather.as_deref()).unwrap_or(DEFAULT_WEATHER);
	let lat = coordinate_text(lat);
	let lon = coordinate_text(lon);

	format!("user={user}; lat={lat}; lon={lon}; time={time_iso}; festival={festival}; weather={weather}")
}

/// Current UTC time in RFC 3339, used when the caller omits `now_iso`.
pub fn default_timestamp() -> String {
	OffsetDateTime::now_utc()
		.format(&Rfc3339)
		.unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

fn coordinate_text(value: Option<f64>) -> String {
	match value {
		Some(value) => value.to_string(),
		None => UNKNOWN_COORDINATE.to_string(),
	}
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.filter(|value| !value.trim().is_empty())
}
