use std::sync::Arc;

use carebook_domain::{Appointment, AppointmentCache, AppointmentList, Session, ViewState};

use super::AppointmentsView;
use crate::api::ApiClient;
use crate::query::{AppointmentFilter, AppointmentsQuery};

/// A patient's appointment history.
///
/// The patient comes from the session, falling back to an explicit id from
/// the route; with neither, every appointment is listed.
#[derive(Debug, Clone)]
pub struct AppointmentHistory {
	filter: AppointmentFilter,
	appointments: AppointmentsView,
}

impl AppointmentHistory {
	/// Shown when nothing was found.
	pub const EMPTY_MESSAGE: &str = "No appointments found.";

	/// Creates the screen for the session user or `route_patient`.
	pub fn new(
		session: Option<&Session>,
		route_patient: Option<u64>,
		cache: Arc<AppointmentCache>,
	) -> Self {
		let filter = session
			.map(|session| session.id)
			.or(route_patient)
			.map_or(AppointmentFilter::All, AppointmentFilter::Patient);
		let query = AppointmentsQuery::new(filter, "Could not load appointments.", cache);

		Self {
			filter,
			appointments: AppointmentsView::new(Some(query)),
		}
	}

	/// Which appointments are listed.
	pub fn filter(&self) -> AppointmentFilter {
		self.filter
	}

	/// Fetches the history.
	pub async fn load(&mut self, api: &ApiClient) {
		self.appointments.load(api).await;
	}

	/// State of the fetch.
	pub fn state(&self) -> &ViewState<AppointmentList> {
		self.appointments.state()
	}

	/// Loaded appointments, in backend order.
	pub fn items(&self) -> Vec<Appointment> {
		self.appointments.items()
	}
}

#[cfg(test)]
mod tests {
	use carebook_domain::Role;

	use super::*;

	#[test]
	fn session_wins_over_route_patient() {
		let cache = AppointmentCache::shared();
		let session = Session::new(3, "alice", Role::Patient);

		let view = AppointmentHistory::new(Some(&session), Some(9), cache.clone());
		assert_eq!(view.filter(), AppointmentFilter::Patient(3));

		let view = AppointmentHistory::new(None, Some(9), cache.clone());
		assert_eq!(view.filter(), AppointmentFilter::Patient(9));

		let view = AppointmentHistory::new(None, None, cache);
		assert_eq!(view.filter(), AppointmentFilter::All);
	}
}
