use serde::{Deserialize, Serialize};

/// Separator between the surviving textual parts of a candidate.
pub const ITEM_TEXT_SEPARATOR: &str = " | ";

/// One item under consideration within a single request.
///
/// Only `id` is required; it is returned to the caller verbatim. All other
/// fields feed the item's descriptive text and may be absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateItem {
	pub id: String,
	pub name: Option<String>,
	pub category: Option<String>,
	pub material: Option<String>,
	pub description: Option<String>,
	pub tags: Option<Vec<String>>,
}

/// Projects a candidate's textual attributes into one embedding input string.
///
/// Fixed field order, blank parts omitted, tags joined by single spaces. An
/// item with no textual fields yields the empty string; callers must still
/// embed it to keep positional alignment with the returned vectors.
pub fn item_text(item: &CandidateItem) -> String {
	let mut parts = Vec::new();

	for field in [
		item.name.as_deref(),
		item.category.as_deref(),
		item.material.as_deref(),
		item.description.as_deref(),
	]
	.into_iter()
	.flatten()
	{
		let trimmed = field.trim();

		if !trimmed.is_empty() {
			parts.push(trimmed.to_string());
		}
	}

	if let Some(tags) = item.tags.as_ref() {
		let joined =
			tags.iter().map(|tag| tag.trim()).filter(|tag| !tag.is_empty()).collect::<Vec<_>>().join(" ");

		if !joined.is_empty() {
			parts.push(joined);
		}
	}

	parts.join(ITEM_TEXT_SEPARATOR)
}
