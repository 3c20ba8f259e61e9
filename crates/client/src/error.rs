//! Error types for backend calls.

use thiserror::Error;

/// Failure to exchange a request with the backend at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
	/// The HTTP client could not be constructed.
	#[error("failed to build HTTP client: {0}")]
	Client(String),

	/// Connection, TLS or body transfer failure.
	#[error("network error: {0}")]
	Network(String),
}

/// Errors returned by [`ApiClient`](crate::ApiClient) calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
	/// The request never produced a response.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// A request body could not be serialized.
	#[error("failed to encode request: {0}")]
	Encode(String),

	/// A successful response carried a body that is not JSON.
	#[error("malformed response: {0}")]
	Decode(String),

	/// The backend answered with a non-success status or an `error` field.
	#[error("request rejected with HTTP {status}")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// The backend's `error` string, when it sent one.
		message: Option<String>,
	},
}

impl ApiError {
	/// The backend's own explanation, if it gave one.
	pub fn backend_message(&self) -> Option<&str> {
		match self {
			Self::Rejected { message, .. } => message.as_deref(),
			_ => None,
		}
	}
}

/// Result type for backend calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
