//! Local validation for the booking and registration forms.
//!
//! Validation only checks presence and format. Chronological order of the
//! start and end times and conflicts with other bookings are left to the
//! backend.

use chrono::{DateTime, MappedLocalTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::AppointmentStatus;

/// Service label a booking starts out with.
pub const DEFAULT_SERVICE: &str = "Physical";

/// A form the user must correct before anything is sent.
///
/// The display text is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	/// Date, start time or end time left blank.
	#[error("Please choose a date, start time, and end time.")]
	MissingSchedule,
	/// Patient name left blank.
	#[error("Please enter the patient name.")]
	MissingPatientName,
	/// Date not in `YYYY-MM-DD` form.
	#[error("Invalid date '{0}' (expected YYYY-MM-DD).")]
	InvalidDate(String),
	/// Time not in `HH:MM` form.
	#[error("Invalid time '{0}' (expected HH:MM).")]
	InvalidTime(String),
	/// The wall-clock time is skipped by a daylight-saving change.
	#[error("{0} does not exist in the local time zone.")]
	NonexistentLocalTime(String),
	/// Username or password left blank on registration.
	#[error("Username and password are required.")]
	MissingCredentials,
	/// Password and confirmation differ.
	#[error("Passwords do not match.")]
	PasswordMismatch,
}

/// Fields of the booking form as the user entered them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingForm {
	/// Patient display name.
	pub patient_name: String,
	/// Service or reason for the visit.
	pub service: String,
	/// Date as `YYYY-MM-DD`.
	pub date: String,
	/// Start time as `HH:MM`.
	pub start_time: String,
	/// End time as `HH:MM`.
	pub end_time: String,
	/// Optional notes.
	pub notes: String,
}

impl Default for BookingForm {
	fn default() -> Self {
		Self {
			patient_name: String::new(),
			service: DEFAULT_SERVICE.to_owned(),
			date: String::new(),
			start_time: String::new(),
			end_time: String::new(),
			notes: String::new(),
		}
	}
}

/// Body of `POST /appointments/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingPayload {
	/// Provider profile id.
	pub provider: u64,
	/// Patient user id, when logged in.
	pub patient: Option<u64>,
	/// Patient display name.
	pub patient_name: String,
	/// Provider display name, empty when unknown.
	pub provider_name: String,
	/// Service label.
	pub service: String,
	/// Start instant.
	pub start: DateTime<Utc>,
	/// End instant.
	pub end: DateTime<Utc>,
	/// Always `confirmed` for new bookings.
	pub status: AppointmentStatus,
	/// Notes, possibly empty.
	pub notes: String,
}

impl BookingForm {
	/// Validates the form and builds the request body.
	///
	/// Date and times are read as wall-clock values in `tz` and converted
	/// to UTC instants.
	pub fn to_payload<Tz: TimeZone>(
		&self,
		provider: u64,
		provider_name: Option<&str>,
		patient: Option<u64>,
		tz: &Tz,
	) -> Result<BookingPayload, ValidationError> {
		let date = self.date.trim();
		let start_time = self.start_time.trim();
		let end_time = self.end_time.trim();

		if date.is_empty() || start_time.is_empty() || end_time.is_empty() {
			return Err(ValidationError::MissingSchedule);
		}
		let patient_name = self.patient_name.trim();
		if patient_name.is_empty() {
			return Err(ValidationError::MissingPatientName);
		}

		let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
			.map_err(|_| ValidationError::InvalidDate(date.to_owned()))?;

		Ok(BookingPayload {
			provider,
			patient,
			patient_name: patient_name.to_owned(),
			provider_name: provider_name.unwrap_or_default().to_owned(),
			service: self.service.trim().to_owned(),
			start: local_instant(date, start_time, tz)?,
			end: local_instant(date, end_time, tz)?,
			status: AppointmentStatus::Confirmed,
			notes: self.notes.trim().to_owned(),
		})
	}
}

fn local_instant<Tz: TimeZone>(
	date: NaiveDate,
	time: &str,
	tz: &Tz,
) -> Result<DateTime<Utc>, ValidationError> {
	let time = NaiveTime::parse_from_str(time, "%H:%M")
		.map_err(|_| ValidationError::InvalidTime(time.to_owned()))?;
	let naive = date.and_time(time);
	earliest_instant(naive, tz.from_local_datetime(&naive))
}

// Ambiguous wall-clock times (DST fall-back) take the earlier instant.
fn earliest_instant<Tz: TimeZone>(
	naive: NaiveDateTime,
	local: MappedLocalTime<DateTime<Tz>>,
) -> Result<DateTime<Utc>, ValidationError> {
	local
		.earliest()
		.map(|local| local.with_timezone(&Utc))
		.ok_or_else(|| ValidationError::NonexistentLocalTime(naive.to_string()))
}

/// Fields of the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
	/// Requested username.
	pub username: String,
	/// Contact email, may be empty.
	pub email: String,
	/// Password.
	pub password: String,
	/// Password typed a second time.
	pub confirm: String,
}

/// Body of `POST /register/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationRequest {
	/// Requested username.
	pub username: String,
	/// Contact email.
	pub email: String,
	/// Password.
	pub password: String,
}

impl RegistrationForm {
	/// Validates the form and builds the request body.
	pub fn validate(&self) -> Result<RegistrationRequest, ValidationError> {
		if self.username.is_empty() || self.password.is_empty() {
			return Err(ValidationError::MissingCredentials);
		}
		if self.password != self.confirm {
			return Err(ValidationError::PasswordMismatch);
		}

		Ok(RegistrationRequest {
			username: self.username.clone(),
			email: self.email.clone(),
			password: self.password.clone(),
		})
	}
}
