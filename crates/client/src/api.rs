//! Typed calls against the backend endpoints.

use std::fmt;
use std::sync::Arc;

use carebook_domain::{AppointmentAction, BookingPayload, RegistrationRequest};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::transport::{ApiRequest, Transport};

/// A decoded response whose status has not been judged yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
	/// HTTP status code.
	pub status: u16,
	/// JSON body. `None` when the body was empty, or when a failed
	/// response carried something other than JSON.
	pub body: Option<Value>,
}

impl Reply {
	/// Whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// A top-level string field of the body.
	pub fn str_field(&self, key: &str) -> Option<&str> {
		self.body.as_ref()?.get(key)?.as_str()
	}

	/// Whether the body carries a non-null `error` field of any type.
	pub fn has_error(&self) -> bool {
		self.body
			.as_ref()
			.and_then(|body| body.get("error"))
			.is_some_and(|error| !error.is_null())
	}

	/// Accepts the reply only if the status is 2xx and the body carries no
	/// `error` field.
	pub fn into_checked(self) -> ApiResult<Value> {
		if !self.is_success() || self.has_error() {
			return Err(ApiError::Rejected {
				status: self.status,
				message: self.str_field("error").map(str::to_owned),
			});
		}
		Ok(self.body.unwrap_or(Value::Null))
	}
}

/// Client for the booking backend.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct ApiClient {
	transport: Arc<dyn Transport>,
}

impl fmt::Debug for ApiClient {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ApiClient").finish_non_exhaustive()
	}
}

impl ApiClient {
	/// Creates a client over `transport`.
	pub fn new(transport: impl Transport + 'static) -> Self {
		Self {
			transport: Arc::new(transport),
		}
	}

	/// Sends a request and decodes its body without judging the status.
	pub async fn request(&self, request: ApiRequest) -> ApiResult<Reply> {
		let path = request.path.clone();
		let response = self.transport.send(request).await?;
		let success = response.is_success();

		let body = if response.body.trim().is_empty() {
			None
		} else {
			match serde_json::from_str::<Value>(&response.body) {
				Ok(body) => Some(body),
				Err(e) if success => return Err(ApiError::Decode(e.to_string())),
				Err(e) => {
					debug!(%path, status = response.status, error = %e, "ignoring non-JSON error body");
					None
				}
			}
		};

		Ok(Reply {
			status: response.status,
			body,
		})
	}

	/// `GET`s a path and accepts only a successful reply.
	pub async fn fetch(&self, path: &str) -> ApiResult<Value> {
		self.request(ApiRequest::get(path)).await?.into_checked()
	}

	/// `POST /login/`. The reply is returned unjudged; the session store
	/// decides what counts as a successful login.
	pub async fn login(&self, username: &str, password: &str) -> ApiResult<Reply> {
		let body = json!({ "username": username, "password": password });
		self.request(ApiRequest::post("/login/", Some(body))).await
	}

	/// `POST /register/`, returned unjudged.
	pub async fn register(&self, request: &RegistrationRequest) -> ApiResult<Reply> {
		let body = encode(request)?;
		self.request(ApiRequest::post("/register/", Some(body))).await
	}

	/// `POST /appointments/` with a validated booking.
	pub async fn create_appointment(&self, payload: &BookingPayload) -> ApiResult<Value> {
		let body = encode(payload)?;
		self.request(ApiRequest::post("/appointments/", Some(body)))
			.await?
			.into_checked()
	}

	/// `POST /appointments/{id}/cancel/` or `/complete/`.
	///
	/// Only the status counts; the body is ignored.
	pub async fn appointment_action(&self, id: u64, action: AppointmentAction) -> ApiResult<()> {
		let path = format!("/appointments/{id}/{}/", action.endpoint());
		let response = self.transport.send(ApiRequest::post(path, None)).await?;

		if !response.is_success() {
			warn!(id, status = response.status, ?action, "appointment action rejected");
			return Err(ApiError::Rejected {
				status: response.status,
				message: None,
			});
		}
		Ok(())
	}
}

fn encode(value: &impl Serialize) -> ApiResult<Value> {
	serde_json::to_value(value).map_err(|e| ApiError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;
	use crate::mock::MockTransport;
	use crate::transport::Method;

	#[tokio::test]
	async fn fetch_rejects_error_field_on_success_status() {
		let mock = MockTransport::new();
		mock.respond(Method::Get, "/providers/", 200, json!({"error": "maintenance"}));
		let api = ApiClient::new(mock);

		assert_eq!(
			api.fetch("/providers/").await,
			Err(ApiError::Rejected {
				status: 200,
				message: Some("maintenance".into())
			})
		);
	}

	#[tokio::test]
	async fn fetch_rejects_structured_error_field() {
		let mock = MockTransport::new();
		mock.respond(Method::Get, "/providers/", 200, json!({"error": {"detail": "maintenance"}}));
		mock.respond(Method::Get, "/providers/", 200, json!({"error": null, "items": []}));
		let api = ApiClient::new(mock);

		assert_eq!(
			api.fetch("/providers/").await,
			Err(ApiError::Rejected {
				status: 200,
				message: None
			})
		);
		assert_eq!(
			api.fetch("/providers/").await,
			Ok(json!({"error": null, "items": []}))
		);
	}

	#[tokio::test]
	async fn malformed_success_body_is_decode_error() {
		let mock = MockTransport::new();
		mock.respond_raw(Method::Get, "/providers/", 200, "<html>");
		let api = ApiClient::new(mock);

		assert!(matches!(api.fetch("/providers/").await, Err(ApiError::Decode(_))));
	}

	#[tokio::test]
	async fn non_json_error_body_keeps_status() {
		let mock = MockTransport::new();
		mock.respond_raw(Method::Post, "/login/", 502, "Bad Gateway");
		let api = ApiClient::new(mock);

		let reply = api.login("a", "b").await.unwrap();
		assert_eq!(reply, Reply { status: 502, body: None });
	}

	#[tokio::test]
	async fn login_sends_credentials() {
		let mock = MockTransport::new();
		mock.respond(Method::Post, "/login/", 200, json!({"status": "ok"}));
		let api = ApiClient::new(mock.clone());

		api.login("alice", "hunter2").await.unwrap();

		assert_eq!(
			mock.requests(),
			vec![ApiRequest::post(
				"/login/",
				Some(json!({"username": "alice", "password": "hunter2"}))
			)]
		);
	}

	#[tokio::test]
	async fn action_ignores_body_and_checks_status() {
		let mock = MockTransport::new();
		mock.respond_raw(Method::Post, "/appointments/5/complete/", 204, "");
		mock.respond_raw(Method::Post, "/appointments/6/cancel/", 200, "not json");
		mock.respond(Method::Post, "/appointments/7/cancel/", 409, json!({"error": "already cancelled"}));
		let api = ApiClient::new(mock);

		assert_eq!(api.appointment_action(5, AppointmentAction::Complete).await, Ok(()));
		assert_eq!(api.appointment_action(6, AppointmentAction::Cancel).await, Ok(()));
		assert_eq!(
			api.appointment_action(7, AppointmentAction::Cancel).await,
			Err(ApiError::Rejected {
				status: 409,
				message: None
			})
		);
	}

	#[tokio::test]
	async fn transport_failure_propagates() {
		let mock = MockTransport::new();
		mock.fail(Method::Get, "/providers/");
		let api = ApiClient::new(mock);

		let err = api.fetch("/providers/").await.unwrap_err();
		assert!(matches!(err, ApiError::Transport(_)));
	}
}
