//! The seam between the typed API and the wire.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::TransportError;

/// HTTP method of a backend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
}

impl fmt::Display for Method {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Get => "GET",
			Self::Post => "POST",
		})
	}
}

/// A request relative to the configured backend base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Path and query, starting with `/`.
	pub path: String,
	/// JSON body, sent with `Content-Type: application/json`.
	pub body: Option<Value>,
}

impl ApiRequest {
	/// A `GET` without a body.
	pub fn get(path: impl Into<String>) -> Self {
		Self {
			method: Method::Get,
			path: path.into(),
			body: None,
		}
	}

	/// A `POST`, optionally carrying a JSON body.
	pub fn post(path: impl Into<String>, body: Option<Value>) -> Self {
		Self {
			method: Method::Post,
			path: path.into(),
			body,
		}
	}
}

/// Status and undecoded body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body as text.
	pub body: String,
}

impl RawResponse {
	/// Whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Sends requests to the backend.
///
/// Implementations report only transport failures as errors; any HTTP
/// status, including 4xx and 5xx, is a successful exchange.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Sends one request and waits for the full response.
	async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError>;
}

/// [`Transport`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: Client,
	base_url: Url,
}

impl HttpTransport {
	/// Creates a transport rooted at `base_url`.
	///
	/// Requests wait indefinitely unless `timeout` is set.
	pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, TransportError> {
		let mut builder = Client::builder();
		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}
		let client = builder
			.build()
			.map_err(|e| TransportError::Client(e.to_string()))?;

		Ok(Self { client, base_url })
	}

	fn url_for(&self, path: &str) -> String {
		format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
	}
}

#[async_trait]
impl Transport for HttpTransport {
	async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError> {
		let url = self.url_for(&request.path);
		debug!(method = %request.method, %url, "sending request");

		let mut builder = match request.method {
			Method::Get => self.client.get(&url),
			Method::Post => self.client.post(&url),
		};
		if let Some(body) = &request.body {
			builder = builder.json(body);
		}

		let response = builder
			.send()
			.await
			.map_err(|e| TransportError::Network(e.to_string()))?;
		let status = response.status().as_u16();
		let body = response
			.text()
			.await
			.map_err(|e| TransportError::Network(e.to_string()))?;

		debug!(%url, status, bytes = body.len(), "received response");
		Ok(RawResponse { status, body })
	}
}
