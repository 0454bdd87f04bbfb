use std::cmp::Ordering;

/// Guards the cosine denominator against all-zero vectors.
pub const SIMILARITY_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItem {
	pub id: String,
	pub score: f32,
}

/// Cosine similarity of two vectors, accumulated in f64.
///
/// Vectors of differing dimension are compared over the overlapping leading
/// dimensions; that is a defined degradation, not an error. An all-zero
/// vector scores ~0 rather than dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
	let n = a.len().min(b.len());
	let mut dot = 0.0_f64;
	let mut norm_a = 0.0_f64;
	let mut norm_b = 0.0_f64;

	for i in 0..n {
		let (x, y) = (a[i] as f64, b[i] as f64);

		dot += x * y;
		norm_a += x * x;
		norm_b += y * y;
	}

	(dot / (norm_a.sqrt() * norm_b.sqrt() + SIMILARITY_EPSILON)) as f32
}

/// Scores each `(id, vector)` pair against the context vector and returns
/// the top `top_k`, best first.
///
/// The sort is stable: equal scores keep the original candidate order, so
/// results are deterministic for fixed inputs.
pub fn rank_candidates(
	context: &[f32],
	items: Vec<(String, Vec<f32>)>,
	top_k: usize,
) -> Vec<ScoredItem> {
	let mut scored: Vec<ScoredItem> = items
		.into_iter()
		.map(|(id, vector)| ScoredItem { id, score: cosine_similarity(context, &vector) })
		.collect();

	scored.sort_by(|left, right| cmp_f32_desc(left.score, right.score));
	scored.truncate(top_k);

	scored
}

fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
