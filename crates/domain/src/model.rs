//! Records sourced from the backend.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of an appointment.
///
/// Only the first three values are produced locally; anything else the
/// backend sends is carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
	/// Booked and still due.
	Confirmed,
	/// Cancelled by either party.
	Cancelled,
	/// Marked as done by the provider.
	Completed,
	/// A status this client does not produce.
	Other(String),
}

impl AppointmentStatus {
	/// Wire name of the status.
	pub fn as_str(&self) -> &str {
		match self {
			Self::Confirmed => "confirmed",
			Self::Cancelled => "cancelled",
			Self::Completed => "completed",
			Self::Other(other) => other,
		}
	}
}

impl From<String> for AppointmentStatus {
	fn from(value: String) -> Self {
		match value.as_str() {
			"confirmed" => Self::Confirmed,
			"cancelled" => Self::Cancelled,
			"completed" => Self::Completed,
			_ => Self::Other(value),
		}
	}
}

impl From<AppointmentStatus> for String {
	fn from(status: AppointmentStatus) -> Self {
		match status {
			AppointmentStatus::Other(other) => other,
			known => known.as_str().to_owned(),
		}
	}
}

impl fmt::Display for AppointmentStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One of the two status changes a provider can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentAction {
	/// confirmed -> cancelled
	Cancel,
	/// confirmed -> completed
	Complete,
}

impl AppointmentAction {
	/// Path segment of the backend endpoint for this action.
	pub fn endpoint(self) -> &'static str {
		match self {
			Self::Cancel => "cancel",
			Self::Complete => "complete",
		}
	}

	/// Status the appointment holds once the backend accepts the action.
	pub fn resulting_status(self) -> AppointmentStatus {
		match self {
			Self::Cancel => AppointmentStatus::Cancelled,
			Self::Complete => AppointmentStatus::Completed,
		}
	}
}

/// A booking between a patient and a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
	/// Backend id.
	pub id: u64,
	/// Patient user id, absent for bookings made without a login.
	#[serde(default)]
	pub patient: Option<u64>,
	/// Provider profile id.
	#[serde(default)]
	pub provider: Option<u64>,
	/// Patient display name.
	#[serde(default)]
	pub patient_name: Option<String>,
	/// Provider display name.
	#[serde(default)]
	pub provider_name: Option<String>,
	/// Service or reason for the visit.
	#[serde(default)]
	pub service: Option<String>,
	/// Current status.
	pub status: AppointmentStatus,
	/// Start instant.
	pub start: DateTime<Utc>,
	/// End instant.
	pub end: DateTime<Utc>,
	/// Free-form notes for the provider.
	#[serde(default)]
	pub notes: Option<String>,
}

impl Appointment {
	/// Whether a provider may still cancel or complete this appointment.
	pub fn is_actionable(&self) -> bool {
		self.status == AppointmentStatus::Confirmed
	}

	/// Whether the appointment starts strictly after `now`.
	pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
		self.start > now
	}
}

/// A service professional patients book against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
	/// Provider profile id.
	pub id: u64,
	/// Display name.
	#[serde(rename = "user_name", default)]
	pub name: Option<String>,
	/// Specialty label.
	#[serde(rename = "specialty_name", default)]
	pub specialty: Option<String>,
	/// Location label.
	#[serde(default)]
	pub location: Option<String>,
}

impl Provider {
	/// Case-insensitive substring match on the location. An empty filter
	/// matches every provider.
	pub fn matches_location(&self, filter: &str) -> bool {
		if filter.is_empty() {
			return true;
		}
		self.location
			.as_deref()
			.unwrap_or_default()
			.to_lowercase()
			.contains(&filter.to_lowercase())
	}
}
