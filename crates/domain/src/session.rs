//! The cached record of the authenticated user.

use serde::{Deserialize, Serialize};

/// Role a session acts under.
///
/// The backend sends the role as a free-form string. Anything other than
/// `"provider"` (including a missing or null role) is treated as a patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "&'static str")]
pub enum Role {
	/// Books and reviews appointments.
	#[default]
	Patient,
	/// Manages bookings made against them.
	Provider,
}

impl Role {
	/// Wire name of the role.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Patient => "patient",
			Self::Provider => "provider",
		}
	}
}

impl From<Option<String>> for Role {
	fn from(value: Option<String>) -> Self {
		match value.as_deref().map(str::trim) {
			Some(role) if role.eq_ignore_ascii_case("provider") => Self::Provider,
			_ => Self::Patient,
		}
	}
}

impl From<Role> for &'static str {
	fn from(role: Role) -> Self {
		role.as_str()
	}
}

impl std::fmt::Display for Role {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The logged-in user as returned by the backend's login endpoint.
///
/// Persisted as JSON in the durable session slot. Its presence is the only
/// signal that the client is authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
	/// Backend user id. Doubles as the patient id for patient sessions.
	pub id: u64,
	/// Login name.
	#[serde(default)]
	pub username: String,
	/// Preferred display name, when the backend knows one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	/// Role the session acts under.
	#[serde(default)]
	pub role: Role,
	/// Provider profile id; only meaningful for provider sessions.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub provider_id: Option<u64>,
}

impl Session {
	/// Creates a session without a display name or provider profile.
	pub fn new(id: u64, username: impl Into<String>, role: Role) -> Self {
		Self {
			id,
			username: username.into(),
			first_name: None,
			role,
			provider_id: None,
		}
	}

	/// Attaches a provider profile id.
	#[must_use]
	pub fn with_provider_id(mut self, provider_id: u64) -> Self {
		self.provider_id = Some(provider_id);
		self
	}

	/// Name to greet the user with: first name when set, otherwise username.
	pub fn display_name(&self) -> &str {
		self.first_name
			.as_deref()
			.map(str::trim)
			.filter(|name| !name.is_empty())
			.unwrap_or(&self.username)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	#[test]
	fn decodes_backend_user() {
		let session: Session = serde_json::from_value(json!({
			"id": 12,
			"username": "drsmith",
			"first_name": "Jane",
			"role": "provider",
			"provider_id": 4,
			"email": "jane@example.com"
		}))
		.unwrap();

		assert_eq!(
			session,
			Session {
				id: 12,
				username: "drsmith".into(),
				first_name: Some("Jane".into()),
				role: Role::Provider,
				provider_id: Some(4),
			}
		);
		assert_eq!(session.display_name(), "Jane");
	}

	#[test]
	fn missing_or_unknown_role_is_patient() {
		let missing: Session = serde_json::from_value(json!({"id": 1, "username": "a"})).unwrap();
		let null: Session =
			serde_json::from_value(json!({"id": 1, "username": "a", "role": null})).unwrap();
		let other: Session =
			serde_json::from_value(json!({"id": 1, "username": "a", "role": "admin"})).unwrap();

		assert_eq!(missing.role, Role::Patient);
		assert_eq!(null.role, Role::Patient);
		assert_eq!(other.role, Role::Patient);
	}

	#[test]
	fn display_name_falls_back_to_username() {
		let mut session = Session::new(1, "alice", Role::Patient);
		assert_eq!(session.display_name(), "alice");

		session.first_name = Some("  ".into());
		assert_eq!(session.display_name(), "alice");
	}

	#[test]
	fn serializes_role_as_wire_name() {
		let session = Session::new(7, "bob", Role::Provider).with_provider_id(2);
		let value = serde_json::to_value(&session).unwrap();

		assert_eq!(
			value,
			json!({"id": 7, "username": "bob", "role": "provider", "provider_id": 2})
		);
	}
}
