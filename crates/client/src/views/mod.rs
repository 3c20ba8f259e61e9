//! One model per screen.
//!
//! Every screen starts in [`ViewState::Loading`] and settles through
//! [`ApiClient::load`]. Appointment screens share an
//! [`AppointmentCache`](carebook_domain::AppointmentCache), so a status
//! change made on one screen is what the others show.

mod book;
mod bookings;
mod dashboard;
mod history;
mod search;

use carebook_domain::{Appointment, AppointmentList, ViewState};
use tracing::warn;

pub use book::BookAppointment;
pub use bookings::ManageBookings;
pub use dashboard::{PatientDashboard, ProviderDashboard};
pub use history::AppointmentHistory;
pub use search::SearchProviders;

use crate::api::ApiClient;
use crate::query::AppointmentsQuery;

/// Shown by provider screens when the session has no provider profile.
pub const NO_PROVIDER_PROFILE: &str = "No provider profile is linked to this account.";

/// Error text of provider screens.
const PROVIDER_LOAD_FAILED: &str = "Could not load your appointments.";

/// A list of appointments fetched by one query.
///
/// `query` is `None` when the screen cannot know what to ask for, which
/// settles straight into an error without a request.
#[derive(Debug, Clone)]
pub struct AppointmentsView {
	query: Option<AppointmentsQuery>,
	state: ViewState<AppointmentList>,
}

impl AppointmentsView {
	fn new(query: Option<AppointmentsQuery>) -> Self {
		Self {
			query,
			state: ViewState::Loading,
		}
	}

	async fn load(&mut self, api: &ApiClient) {
		self.state = ViewState::Loading;
		self.state = match &self.query {
			Some(query) => api.load(query).await,
			None => {
				warn!("provider session without provider_id");
				ViewState::Error(NO_PROVIDER_PROFILE.to_owned())
			}
		};
	}

	/// Current state of the fetch.
	pub fn state(&self) -> &ViewState<AppointmentList> {
		&self.state
	}

	/// Current copies of the loaded appointments; empty unless ready.
	pub fn items(&self) -> Vec<Appointment> {
		self.state
			.ready()
			.map(AppointmentList::items)
			.unwrap_or_default()
	}
}
