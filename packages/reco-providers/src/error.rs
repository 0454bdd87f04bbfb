pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Embedding provider is unreachable: {message}")]
	Unavailable { message: String },
	#[error("Embedding provider rejected the request ({status}): {message}")]
	Rejected { status: u16, message: String },
	#[error("Embedding provider returned a malformed response: {message}")]
	MalformedResponse { message: String },
	#[error("{message}")]
	InvalidConfig { message: String },
}

impl Error {
	/// Upstream HTTP status, when the provider produced one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Rejected { status, .. } => Some(*status),
			_ => None,
		}
	}
}
