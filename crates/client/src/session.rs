//! Login state, mirrored into a durable slot.
//!
//! The store holds at most one [`Session`]. It is read from the slot once at
//! startup and written only by [`SessionStore::login`] and
//! [`SessionStore::logout`]. Every failure is reported as an [`AuthFailure`]
//! carrying the text to show the user; nothing here is retried.

use carebook_domain::{RegistrationForm, Session};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::slot::SessionSlot;

const NETWORK_ERROR: &str = "Network error";
const INVALID_CREDENTIALS: &str = "Invalid credentials";
const UNEXPECTED_LOGIN_REPLY: &str = "Unexpected response from the server.";
const REGISTRATION_FAILED: &str = "Registration failed";

/// A login or registration attempt that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthFailure {
	/// Text shown to the user.
	pub message: String,
}

impl AuthFailure {
	fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
}

/// Holds the current session and its durable copy.
pub struct SessionStore {
	slot: Box<dyn SessionSlot>,
	current: Option<Session>,
}

impl std::fmt::Debug for SessionStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SessionStore")
			.field("current", &self.current)
			.finish_non_exhaustive()
	}
}

impl SessionStore {
	/// Rehydrates the session stored in `slot`.
	///
	/// An absent, unreadable or malformed entry means "not logged in".
	pub fn restore(slot: impl SessionSlot + 'static) -> Self {
		let current = match slot.read() {
			Ok(Some(raw)) => match serde_json::from_str::<Session>(&raw) {
				Ok(session) => {
					debug!(user = session.id, role = %session.role, "restored session");
					Some(session)
				}
				Err(e) => {
					warn!(error = %e, "ignoring malformed stored session");
					None
				}
			},
			Ok(None) => None,
			Err(e) => {
				warn!(error = %e, "could not read stored session");
				None
			}
		};

		Self {
			slot: Box::new(slot),
			current,
		}
	}

	/// The logged-in user, if any.
	pub fn session(&self) -> Option<&Session> {
		self.current.as_ref()
	}

	/// Whether a session is present.
	pub fn is_authenticated(&self) -> bool {
		self.current.is_some()
	}

	/// Logs in and stores the returned user.
	///
	/// Success requires a 2xx reply whose body has `status: "ok"` and a
	/// decodable `user`. On failure neither memory nor the slot changes.
	pub async fn login(
		&mut self,
		api: &ApiClient,
		username: &str,
		password: &str,
	) -> Result<Session, AuthFailure> {
		let reply = api.login(username, password).await.map_err(|e| {
			error!(error = %e, "login request failed");
			AuthFailure::new(NETWORK_ERROR)
		})?;

		if !reply.is_success() || reply.str_field("status") != Some("ok") {
			warn!(status = reply.status, "login rejected");
			return Err(AuthFailure::new(
				reply.str_field("error").unwrap_or(INVALID_CREDENTIALS),
			));
		}

		let user = reply
			.body
			.as_ref()
			.and_then(|body| body.get("user"))
			.cloned()
			.unwrap_or_default();
		let session = Session::deserialize(&user).map_err(|e| {
			warn!(error = %e, "login reply carried no usable user");
			AuthFailure::new(UNEXPECTED_LOGIN_REPLY)
		})?;

		// The slot keeps the backend's user object as sent, not the decoded subset.
		if let Err(e) = self.slot.write(&user.to_string()) {
			warn!(error = %e, "session not persisted");
		}

		info!(user = session.id, role = %session.role, "logged in");
		self.current = Some(session.clone());
		Ok(session)
	}

	/// Forgets the session in memory and in the slot. Always succeeds.
	pub fn logout(&mut self) {
		if let Some(session) = self.current.take() {
			info!(user = session.id, "logged out");
		}
		if let Err(e) = self.slot.clear() {
			warn!(error = %e, "stored session not cleared");
		}
	}

	/// Creates an account. Does not log in.
	///
	/// Accepts a 2xx reply without an `error` field whose `status`, when
	/// present, is `"created"`.
	pub async fn register(&self, api: &ApiClient, form: &RegistrationForm) -> Result<(), AuthFailure> {
		let request = form.validate().map_err(|e| AuthFailure::new(e.to_string()))?;

		let reply = api.register(&request).await.map_err(|e| {
			error!(error = %e, "registration request failed");
			AuthFailure::new(NETWORK_ERROR)
		})?;

		let created = reply.is_success()
			&& !reply.has_error()
			&& reply.str_field("status").is_none_or(|status| status == "created");
		if !created {
			warn!(status = reply.status, "registration rejected");
			return Err(AuthFailure::new(
				reply.str_field("error").unwrap_or(REGISTRATION_FAILED),
			));
		}

		info!(username = %request.username, "account created");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use carebook_domain::Role;
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;
	use crate::mock::{MemorySlot, MockTransport};
	use crate::slot::FileSlot;
	use crate::transport::Method;

	fn user() -> serde_json::Value {
		json!({"id": 3, "username": "alice", "first_name": "Alice", "role": "patient"})
	}

	#[test]
	fn restore_reads_stored_session() {
		let slot = MemorySlot::with_contents(user().to_string());
		let store = SessionStore::restore(slot);

		assert_eq!(store.session().map(Session::display_name), Some("Alice"));
	}

	#[test]
	fn restore_ignores_malformed_slot() {
		let store = SessionStore::restore(MemorySlot::with_contents("{not json"));
		assert!(!store.is_authenticated());
	}

	#[tokio::test]
	async fn login_stores_session() {
		let mock = MockTransport::new();
		mock.respond(Method::Post, "/login/", 200, json!({"status": "ok", "user": user()}));
		let slot = MemorySlot::new();
		let mut store = SessionStore::restore(slot.clone());

		let session = store
			.login(&ApiClient::new(mock), "alice", "pw")
			.await
			.unwrap();

		assert_eq!(session.role, Role::Patient);
		assert_eq!(store.session(), Some(&session));
		let stored: Session = serde_json::from_str(&slot.contents().unwrap()).unwrap();
		assert_eq!(stored, session);
	}

	#[tokio::test]
	async fn login_persists_backend_user_verbatim() {
		let user = json!({
			"id": 5,
			"username": "drlee",
			"email": "d@x.org",
			"last_name": "Lee",
			"role": "Provider",
			"provider_id": 2
		});
		let mock = MockTransport::new();
		mock.respond(Method::Post, "/login/", 200, json!({"status": "ok", "user": user.clone()}));
		let slot = MemorySlot::new();
		let mut store = SessionStore::restore(slot.clone());

		let session = store
			.login(&ApiClient::new(mock), "drlee", "pw")
			.await
			.unwrap();

		assert_eq!(session.role, Role::Provider);
		let stored: serde_json::Value = serde_json::from_str(&slot.contents().unwrap()).unwrap();
		assert_eq!(stored, user);

		let restored = SessionStore::restore(slot);
		assert_eq!(restored.session(), Some(&session));
	}

	#[test]
	fn restore_treats_unreadable_slot_as_logged_out() {
		let dir = tempfile::tempdir().unwrap();
		let slot = FileSlot::new(dir.path());
		std::fs::create_dir(slot.path()).unwrap();

		let store = SessionStore::restore(slot);

		assert!(!store.is_authenticated());
	}

	#[tokio::test]
	async fn unauthorized_login_shows_backend_message() {
		let mock = MockTransport::new();
		mock.respond(
			Method::Post,
			"/login/",
			401,
			json!({"status": "error", "error": "Wrong password"}),
		);
		let slot = MemorySlot::with_contents(user().to_string());
		let mut store = SessionStore::restore(slot.clone());

		let failure = store
			.login(&ApiClient::new(mock), "alice", "bad")
			.await
			.unwrap_err();

		assert_eq!(failure.message, "Wrong password");
		assert_eq!(slot.contents(), Some(user().to_string()));
		assert!(store.is_authenticated());
	}

	#[tokio::test]
	async fn status_other_than_ok_is_rejected() {
		let mock = MockTransport::new();
		mock.respond(Method::Post, "/login/", 200, json!({"status": "denied", "user": user()}));
		let slot = MemorySlot::new();
		let mut store = SessionStore::restore(slot.clone());

		let failure = store
			.login(&ApiClient::new(mock), "alice", "pw")
			.await
			.unwrap_err();

		assert_eq!(failure.message, "Invalid credentials");
		assert_eq!(slot.contents(), None);
	}

	#[tokio::test]
	async fn network_failure_is_reported() {
		let mock = MockTransport::new();
		mock.fail(Method::Post, "/login/");
		let mut store = SessionStore::restore(MemorySlot::new());

		let failure = store
			.login(&ApiClient::new(mock), "alice", "pw")
			.await
			.unwrap_err();

		assert_eq!(failure.message, "Network error");
	}

	#[test]
	fn logout_is_idempotent() {
		let slot = MemorySlot::with_contents(user().to_string());
		let mut store = SessionStore::restore(slot.clone());

		store.logout();
		assert_eq!(slot.contents(), None);
		assert!(!store.is_authenticated());

		store.logout();
		assert_eq!(slot.contents(), None);
	}

	#[tokio::test]
	async fn register_validates_before_sending() {
		let mock = MockTransport::new();
		let store = SessionStore::restore(MemorySlot::new());
		let form = RegistrationForm {
			username: "bob".into(),
			password: "a".into(),
			confirm: "b".into(),
			..RegistrationForm::default()
		};

		let failure = store
			.register(&ApiClient::new(mock.clone()), &form)
			.await
			.unwrap_err();

		assert_eq!(failure.message, "Passwords do not match.");
		assert!(mock.requests().is_empty());
	}

	#[tokio::test]
	async fn register_reports_backend_error_and_never_logs_in() {
		let mock = MockTransport::new();
		mock.respond(Method::Post, "/register/", 400, json!({"error": "Username taken"}));
		mock.respond(Method::Post, "/register/", 201, json!({"status": "created"}));
		let api = ApiClient::new(mock);
		let slot = MemorySlot::new();
		let store = SessionStore::restore(slot.clone());
		let form = RegistrationForm {
			username: "bob".into(),
			email: "bob@example.com".into(),
			password: "pw".into(),
			confirm: "pw".into(),
		};

		let failure = store.register(&api, &form).await.unwrap_err();
		assert_eq!(failure.message, "Username taken");

		store.register(&api, &form).await.unwrap();
		assert!(!store.is_authenticated());
		assert_eq!(slot.contents(), None);
	}

	#[tokio::test]
	async fn register_rejects_structured_error_field() {
		let mock = MockTransport::new();
		mock.respond(
			Method::Post,
			"/register/",
			201,
			json!({"status": "created", "error": {"username": ["taken"]}}),
		);
		let store = SessionStore::restore(MemorySlot::new());
		let form = RegistrationForm {
			username: "bob".into(),
			password: "pw".into(),
			confirm: "pw".into(),
			..RegistrationForm::default()
		};

		let failure = store
			.register(&ApiClient::new(mock), &form)
			.await
			.unwrap_err();

		assert_eq!(failure.message, "Registration failed");
	}
}
