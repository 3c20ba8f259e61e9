use std::sync::Arc;

use carebook_domain::{Appointment, AppointmentAction, AppointmentCache, AppointmentList, Session, ViewState};
use tracing::{debug, error, info};

use super::{AppointmentsView, PROVIDER_LOAD_FAILED};
use crate::api::ApiClient;
use crate::query::{AppointmentFilter, AppointmentsQuery};

/// The provider's booking management screen.
///
/// Cancel and complete are sent as-is; a successful reply patches the shared
/// cache instead of refetching. Repeating an action is not prevented.
#[derive(Debug, Clone)]
pub struct ManageBookings {
	cache: Arc<AppointmentCache>,
	appointments: AppointmentsView,
	action_message: Option<String>,
}

impl ManageBookings {
	/// Shown when the provider has no bookings.
	pub const EMPTY_MESSAGE: &str = "No appointments yet.";

	/// Creates the screen for a provider session.
	pub fn new(session: &Session, cache: Arc<AppointmentCache>) -> Self {
		let query = session.provider_id.map(|id| {
			AppointmentsQuery::new(AppointmentFilter::Provider(id), PROVIDER_LOAD_FAILED, cache.clone())
		});
		Self {
			cache,
			appointments: AppointmentsView::new(query),
			action_message: None,
		}
	}

	/// Fetches the provider's bookings.
	pub async fn load(&mut self, api: &ApiClient) {
		self.appointments.load(api).await;
	}

	/// State of the fetch.
	pub fn state(&self) -> &ViewState<AppointmentList> {
		self.appointments.state()
	}

	/// Loaded bookings with their current status.
	pub fn items(&self) -> Vec<Appointment> {
		self.appointments.items()
	}

	/// Outcome of the last cancel or complete.
	pub fn action_message(&self) -> Option<&str> {
		self.action_message.as_deref()
	}

	/// Cancels a booking. Returns whether the backend accepted it.
	pub async fn cancel(&mut self, api: &ApiClient, id: u64) -> bool {
		self.apply(api, id, AppointmentAction::Cancel).await
	}

	/// Marks a booking completed. Returns whether the backend accepted it.
	pub async fn complete(&mut self, api: &ApiClient, id: u64) -> bool {
		self.apply(api, id, AppointmentAction::Complete).await
	}

	async fn apply(&mut self, api: &ApiClient, id: u64, action: AppointmentAction) -> bool {
		match api.appointment_action(id, action).await {
			Ok(()) => {
				if !self.cache.set_status(id, action.resulting_status()) {
					debug!(id, "accepted action on an appointment not loaded here");
				}
				info!(id, ?action, "appointment updated");
				self.action_message = Some(success_message(action).to_owned());
				true
			}
			Err(e) => {
				error!(id, ?action, error = %e, "appointment update failed");
				self.action_message = Some(failure_message(action).to_owned());
				false
			}
		}
	}
}

fn success_message(action: AppointmentAction) -> &'static str {
	match action {
		AppointmentAction::Cancel => "Appointment cancelled.",
		AppointmentAction::Complete => "Appointment marked as completed.",
	}
}

fn failure_message(action: AppointmentAction) -> &'static str {
	match action {
		AppointmentAction::Cancel => "Failed to cancel appointment.",
		AppointmentAction::Complete => "Failed to update appointment.",
	}
}
