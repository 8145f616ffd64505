//! Crate-wide error types and `Result` alias.

/// Library-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the ACME client registry crate.
#[allow(missing_docs)]
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Jsonwebtoken(#[from] jsonwebtoken::errors::Error),
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	Serde(#[from] serde_json::Error),
	#[error(transparent)]
	Url(#[from] url::ParseError),

	#[error("Failed to construct ACME client for issuer '{issuer_uid}': {source}")]
	ClientConstruction {
		issuer_uid: String,
		#[source]
		source: Box<Error>,
	},
	#[error("Upstream HTTP status {status} from {url}: {body:?}")]
	HttpStatus { status: reqwest::StatusCode, url: url::Url, body: Option<String> },
	#[error("Invalid account key: {0}")]
	InvalidKey(String),
	#[error("Metrics error: {0}")]
	Metrics(String),
	#[error("ACME client for issuer '{issuer_uid}' not initialised/available.")]
	NotFound { issuer_uid: String },
	#[error("Validation failed for {field}: {reason}")]
	Validation { field: &'static str, reason: String },
}
impl Error {
	/// Whether this error signals that no client is registered for the requested issuer.
	///
	/// Callers typically treat this as "not ready yet" and retry after the next reconciliation.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}
}
#[cfg(feature = "prometheus")]
impl From<metrics_exporter_prometheus::BuildError> for Error {
	fn from(value: metrics_exporter_prometheus::BuildError) -> Self {
		Self::Metrics(value.to_string())
	}
}
