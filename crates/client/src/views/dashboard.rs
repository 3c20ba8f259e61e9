use std::sync::Arc;

use carebook_domain::{Appointment, AppointmentCache, AppointmentList, Session, ViewState};
use chrono::{DateTime, Utc};

use super::{AppointmentsView, PROVIDER_LOAD_FAILED};
use crate::api::ApiClient;
use crate::query::{AppointmentFilter, AppointmentsQuery};

/// Landing screen for patients.
#[derive(Debug, Clone)]
pub struct PatientDashboard {
	greeting: String,
	appointments: AppointmentsView,
}

impl PatientDashboard {
	/// Shown when the patient has no appointments.
	pub const EMPTY_MESSAGE: &str = "You have no appointments yet.";

	/// Creates the dashboard for a patient session.
	pub fn new(session: &Session, cache: Arc<AppointmentCache>) -> Self {
		let query = AppointmentsQuery::new(
			AppointmentFilter::Patient(session.id),
			"Error loading appointments.",
			cache,
		);
		Self {
			greeting: session.display_name().to_owned(),
			appointments: AppointmentsView::new(Some(query)),
		}
	}

	/// Name to greet the user with.
	pub fn greeting(&self) -> &str {
		&self.greeting
	}

	/// Fetches the patient's appointments.
	pub async fn load(&mut self, api: &ApiClient) {
		self.appointments.load(api).await;
	}

	/// State of the fetch.
	pub fn state(&self) -> &ViewState<AppointmentList> {
		self.appointments.state()
	}

	/// Loaded appointments.
	pub fn items(&self) -> Vec<Appointment> {
		self.appointments.items()
	}
}

/// Landing screen for providers: upcoming and all bookings.
#[derive(Debug, Clone)]
pub struct ProviderDashboard {
	greeting: String,
	appointments: AppointmentsView,
}

impl ProviderDashboard {
	/// Shown when nothing is upcoming.
	pub const NO_UPCOMING_MESSAGE: &str = "No upcoming appointments.";
	/// Shown when the provider has no bookings at all.
	pub const EMPTY_MESSAGE: &str = "No appointments found.";

	/// Creates the dashboard for a provider session.
	pub fn new(session: &Session, cache: Arc<AppointmentCache>) -> Self {
		let query = session.provider_id.map(|id| {
			AppointmentsQuery::new(AppointmentFilter::Provider(id), PROVIDER_LOAD_FAILED, cache)
		});
		Self {
			greeting: session.display_name().to_owned(),
			appointments: AppointmentsView::new(query),
		}
	}

	/// Name to greet the user with.
	pub fn greeting(&self) -> &str {
		&self.greeting
	}

	/// Fetches the provider's bookings.
	pub async fn load(&mut self, api: &ApiClient) {
		self.appointments.load(api).await;
	}

	/// State of the fetch.
	pub fn state(&self) -> &ViewState<AppointmentList> {
		self.appointments.state()
	}

	/// Every loaded booking.
	pub fn all(&self) -> Vec<Appointment> {
		self.appointments.items()
	}

	/// Loaded bookings starting after `now`.
	pub fn upcoming(&self, now: DateTime<Utc>) -> Vec<Appointment> {
		self.appointments
			.items()
			.into_iter()
			.filter(|appointment| appointment.is_upcoming(now))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use carebook_domain::Role;
	use chrono::TimeZone;
	use serde_json::json;

	use super::*;
	use crate::mock::MockTransport;
	use crate::transport::Method;
	use crate::views::NO_PROVIDER_PROFILE;

	#[tokio::test]
	async fn provider_without_profile_errors_without_fetching() {
		let mock = MockTransport::new();
		let session = Session::new(5, "drlee", Role::Provider);
		let mut view = ProviderDashboard::new(&session, AppointmentCache::shared());

		view.load(&ApiClient::new(mock.clone())).await;

		assert_eq!(view.state().error(), Some(NO_PROVIDER_PROFILE));
		assert!(mock.requests().is_empty());
	}

	#[tokio::test]
	async fn upcoming_is_strictly_after_now() {
		let mock = MockTransport::new();
		mock.respond(
			Method::Get,
			"/appointments/?provider=2",
			200,
			json!({"status": "ok", "items": [
				{"id": 1, "status": "confirmed", "start": "2024-01-01T09:00:00Z", "end": "2024-01-01T09:30:00Z"},
				{"id": 2, "status": "confirmed", "start": "2024-01-01T10:00:00Z", "end": "2024-01-01T10:30:00Z"},
				{"id": 3, "status": "confirmed", "start": "2024-01-02T10:00:00Z", "end": "2024-01-02T10:30:00Z"}
			]}),
		);
		let session = Session::new(5, "drlee", Role::Provider).with_provider_id(2);
		let mut view = ProviderDashboard::new(&session, AppointmentCache::shared());
		view.load(&ApiClient::new(mock)).await;

		let now = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
		let upcoming: Vec<u64> = view.upcoming(now).iter().map(|a| a.id).collect();

		assert_eq!(upcoming, vec![3]);
		assert_eq!(view.all().len(), 3);
	}

	#[tokio::test]
	async fn patient_dashboard_reports_fixed_error() {
		let mock = MockTransport::new();
		mock.respond(Method::Get, "/appointments/?patient=3", 500, json!({"error": "db down"}));
		let session = Session::new(3, "alice", Role::Patient);
		let mut view = PatientDashboard::new(&session, AppointmentCache::shared());

		view.load(&ApiClient::new(mock)).await;

		assert_eq!(view.state().error(), Some("Error loading appointments."));
		assert_eq!(view.greeting(), "alice");
	}
}
