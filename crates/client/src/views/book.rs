use carebook_domain::{BookingForm, Provider, Session, ViewState};
use chrono::TimeZone;
use tracing::{error, info};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::query::ProviderQuery;

/// The booking screen for one provider.
#[derive(Debug, Clone)]
pub struct BookAppointment {
	provider_id: u64,
	provider: ViewState<Option<Provider>>,
	form: BookingForm,
	form_error: Option<String>,
	success: Option<String>,
}

impl BookAppointment {
	/// Shown once the backend accepts the booking.
	pub const SUCCESS_MESSAGE: &str = "Appointment booked successfully!";

	/// Creates the screen for `provider_id` with a blank form.
	pub fn new(provider_id: u64) -> Self {
		Self {
			provider_id,
			provider: ViewState::Loading,
			form: BookingForm::default(),
			form_error: None,
			success: None,
		}
	}

	/// Fetches the provider card.
	pub async fn load(&mut self, api: &ApiClient) {
		self.provider = ViewState::Loading;
		self.provider = api
			.load(&ProviderQuery {
				id: self.provider_id,
			})
			.await;
	}

	/// State of the provider card.
	pub fn provider(&self) -> &ViewState<Option<Provider>> {
		&self.provider
	}

	/// Mutable access for filling in the form.
	pub fn form_mut(&mut self) -> &mut BookingForm {
		&mut self.form
	}

	/// Message from the last failed submission.
	pub fn form_error(&self) -> Option<&str> {
		self.form_error.as_deref()
	}

	/// Message from the last successful submission.
	pub fn success_message(&self) -> Option<&str> {
		self.success.as_deref()
	}

	/// Validates and submits the booking. Returns whether it was accepted.
	///
	/// Times are read as wall-clock values in `tz`. A failed submission only
	/// sets [`form_error`](Self::form_error).
	pub async fn submit<Tz: TimeZone>(
		&mut self,
		api: &ApiClient,
		session: Option<&Session>,
		tz: &Tz,
	) -> bool {
		self.form_error = None;
		self.success = None;

		let provider_name = self
			.provider
			.ready()
			.and_then(Option::as_ref)
			.and_then(|provider| provider.name.as_deref());
		let payload = match self.form.to_payload(
			self.provider_id,
			provider_name,
			session.map(|session| session.id),
			tz,
		) {
			Ok(payload) => payload,
			Err(e) => {
				self.form_error = Some(e.to_string());
				return false;
			}
		};

		match api.create_appointment(&payload).await {
			Ok(_) => {
				info!(provider = self.provider_id, start = %payload.start, "appointment booked");
				self.success = Some(Self::SUCCESS_MESSAGE.to_owned());
				true
			}
			Err(e) => {
				error!(provider = self.provider_id, error = %e, "booking failed");
				self.form_error = Some(booking_failure(&e));
				false
			}
		}
	}
}

fn booking_failure(error: &ApiError) -> String {
	if let Some(message) = error.backend_message() {
		return message.to_owned();
	}
	match error {
		ApiError::Rejected { status, .. } => format!("Could not create appointment (HTTP {status})"),
		_ => "Something went wrong booking the appointment.".to_owned(),
	}
}

#[cfg(test)]
mod tests {
	use carebook_domain::Role;
	use chrono::Utc;
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;
	use crate::mock::MockTransport;
	use crate::transport::{ApiRequest, Method};

	fn fill(view: &mut BookAppointment) {
		let form = view.form_mut();
		form.patient_name = "Alice".into();
		form.date = "2024-01-01".into();
		form.start_time = "10:00".into();
		form.end_time = "10:30".into();
	}

	#[tokio::test]
	async fn submits_payload_with_provider_name() {
		let mock = MockTransport::new();
		mock.respond(
			Method::Get,
			"/providers/4/",
			200,
			json!({"item": {"id": 4, "user_name": "Dr. Lee"}}),
		);
		mock.respond(Method::Post, "/appointments/", 201, json!({"id": 10}));
		let api = ApiClient::new(mock.clone());
		let session = Session::new(3, "alice", Role::Patient);

		let mut view = BookAppointment::new(4);
		view.load(&api).await;
		fill(&mut view);

		assert!(view.submit(&api, Some(&session), &Utc).await);
		assert_eq!(view.success_message(), Some(BookAppointment::SUCCESS_MESSAGE));
		assert_eq!(
			mock.requests().last(),
			Some(&ApiRequest::post(
				"/appointments/",
				Some(json!({
					"provider": 4,
					"patient": 3,
					"patient_name": "Alice",
					"provider_name": "Dr. Lee",
					"service": "Physical",
					"start": "2024-01-01T10:00:00Z",
					"end": "2024-01-01T10:30:00Z",
					"status": "confirmed",
					"notes": ""
				}))
			))
		);
	}

	#[tokio::test]
	async fn invalid_form_sends_nothing() {
		let mock = MockTransport::new();
		let mut view = BookAppointment::new(4);
		view.form_mut().patient_name = "Alice".into();

		assert!(!view.submit(&ApiClient::new(mock.clone()), None, &Utc).await);
		assert_eq!(
			view.form_error(),
			Some("Please choose a date, start time, and end time.")
		);
		assert!(mock.requests().is_empty());
	}

	#[tokio::test]
	async fn rejection_prefers_backend_message() {
		let mock = MockTransport::new();
		mock.respond(Method::Post, "/appointments/", 400, json!({"error": "Slot taken"}));
		mock.respond(Method::Post, "/appointments/", 500, json!({}));
		mock.fail(Method::Post, "/appointments/");
		let api = ApiClient::new(mock);
		let mut view = BookAppointment::new(4);
		fill(&mut view);

		assert!(!view.submit(&api, None, &Utc).await);
		assert_eq!(view.form_error(), Some("Slot taken"));

		assert!(!view.submit(&api, None, &Utc).await);
		assert_eq!(view.form_error(), Some("Could not create appointment (HTTP 500)"));

		assert!(!view.submit(&api, None, &Utc).await);
		assert_eq!(
			view.form_error(),
			Some("Something went wrong booking the appointment.")
		);
	}

	#[tokio::test]
	async fn provider_card_failure_does_not_block_booking() {
		let mock = MockTransport::new();
		mock.respond(Method::Get, "/providers/4/", 404, json!({"error": "not found"}));
		mock.respond(Method::Post, "/appointments/", 201, json!({}));
		let api = ApiClient::new(mock);
		let mut view = BookAppointment::new(4);

		view.load(&api).await;
		assert_eq!(view.provider().error(), Some("Could not load provider information."));

		fill(&mut view);
		assert!(view.submit(&api, None, &Utc).await);
	}
}
