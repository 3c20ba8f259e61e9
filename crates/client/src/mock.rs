//! Scripted [`Transport`] for tests.
//!
//! Responses are queued per method and path and consumed in order. Every
//! request is recorded so tests can assert on what was sent.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::TransportError;
pub use crate::slot::MemorySlot;
use crate::transport::{ApiRequest, Method, RawResponse, Transport};

type Scripted = (Method, String, Result<RawResponse, TransportError>);

#[derive(Debug, Default)]
struct Inner {
	script: VecDeque<Scripted>,
	requests: Vec<ApiRequest>,
}

/// A [`Transport`] answering from a script.
///
/// Clones share the same script and request log.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
	inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
	/// Creates a transport with an empty script.
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues a JSON response.
	pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
		self.respond_raw(method, path, status, body.to_string())
	}

	/// Queues a response with an arbitrary text body.
	pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: impl Into<String>) -> &Self {
		self.push(
			method,
			path,
			Ok(RawResponse {
				status,
				body: body.into(),
			}),
		)
	}

	/// Queues a transport failure.
	pub fn fail(&self, method: Method, path: &str) -> &Self {
		self.push(
			method,
			path,
			Err(TransportError::Network("connection refused".into())),
		)
	}

	/// Every request sent so far, oldest first.
	pub fn requests(&self) -> Vec<ApiRequest> {
		self.inner.lock().requests.clone()
	}

	/// Number of scripted responses not consumed yet.
	pub fn pending(&self) -> usize {
		self.inner.lock().script.len()
	}

	fn push(&self, method: Method, path: &str, outcome: Result<RawResponse, TransportError>) -> &Self {
		self.inner
			.lock()
			.script
			.push_back((method, path.to_owned(), outcome));
		self
	}
}

#[async_trait]
impl Transport for MockTransport {
	async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError> {
		let mut inner = self.inner.lock();
		inner.requests.push(request.clone());

		let position = inner
			.script
			.iter()
			.position(|(method, path, _)| *method == request.method && *path == request.path);

		match position.and_then(|index| inner.script.remove(index)) {
			Some((_, _, outcome)) => outcome,
			None => Err(TransportError::Network(format!(
				"no scripted response for {} {}",
				request.method, request.path
			))),
		}
	}
}
