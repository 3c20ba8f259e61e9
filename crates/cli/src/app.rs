//! Route dispatch for the terminal client.
//!
//! Every navigation goes through the route guard first. A redirect is reported
//! and then followed, so a denied command still shows where the user landed.

use std::io::{self, Write};
use std::sync::Arc;

use carebook_client::views::{
	AppointmentHistory, BookAppointment, ManageBookings, PatientDashboard, ProviderDashboard,
	SearchProviders,
};
use carebook_client::{ApiClient, SessionStore};
use carebook_domain::{AppointmentCache, BookingForm, Guard, RegistrationForm, Route, Session};
use chrono::{Local, Utc};
use tracing::info;

use crate::render;

/// What to do once a route renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
	/// Just show the screen.
	View,
	Login { username: String, password: String },
	Register(RegistrationForm),
	/// Location filter for the provider search.
	Filter(String),
	Book(BookingForm),
	Cancel(u64),
	Complete(u64),
}

enum Step {
	Done(bool),
	Go(Route),
}

pub struct App<W> {
	api: ApiClient,
	sessions: SessionStore,
	cache: Arc<AppointmentCache>,
	out: W,
}

impl<W: Write> App<W> {
	pub fn new(api: ApiClient, sessions: SessionStore, out: W) -> Self {
		Self {
			api,
			sessions,
			cache: AppointmentCache::shared(),
			out,
		}
	}

	pub fn session(&self) -> Option<&Session> {
		self.sessions.session()
	}

	#[cfg(test)]
	pub fn output(&self) -> &W {
		&self.out
	}

	pub fn whoami(&mut self) -> io::Result<bool> {
		match self.sessions.session() {
			Some(session) => {
				writeln!(self.out, "{} ({}, id {})", session.display_name(), session.role, session.id)?;
				Ok(true)
			}
			None => {
				writeln!(self.out, "Not logged in.")?;
				Ok(false)
			}
		}
	}

	pub fn logout(&mut self) -> io::Result<bool> {
		self.sessions.logout();
		writeln!(self.out, "Logged out.")?;
		Ok(true)
	}

	/// Guards `route`, renders wherever the guard lands and follows any
	/// navigation the screen triggers. Returns `false` if the command was
	/// redirected or failed.
	pub async fn navigate(&mut self, mut route: Route, mut intent: Intent) -> io::Result<bool> {
		let mut ok = true;
		loop {
			let step = match route.resolve(self.sessions.session()) {
				Guard::Render => self.render(route, intent).await?,
				Guard::Redirect(target) => {
					info!(from = %route, to = %target, "redirected");
					if target == Route::Login {
						writeln!(self.out, "{route} requires you to log in.")?;
					} else {
						writeln!(self.out, "{route} is not available to your account; showing {target}.")?;
					}
					ok = false;
					Step::Go(target)
				}
			};

			match step {
				Step::Done(success) => return Ok(ok && success),
				Step::Go(next) => {
					route = next;
					intent = Intent::View;
				}
			}
		}
	}

	async fn render(&mut self, route: Route, intent: Intent) -> io::Result<Step> {
		let session = self.sessions.session().cloned();
		match (route, session) {
			(Route::Login, _) => self.login(intent).await,
			(Route::Register, _) => self.register(intent).await,
			(Route::SearchProviders, _) => self.search(intent).await,
			(Route::BookAppointment { provider_id }, session) => {
				self.book(provider_id, session.as_ref(), intent).await
			}
			(Route::AppointmentHistory { patient }, session) => self.history(session.as_ref(), patient).await,
			(Route::PatientDashboard, Some(session)) => self.patient_dashboard(&session).await,
			(Route::ProviderDashboard, Some(session)) => self.provider_dashboard(&session).await,
			(Route::ManageBookings, Some(session)) => self.bookings(&session, intent).await,
			(Route::PatientDashboard | Route::ProviderDashboard | Route::ManageBookings, None) => {
				Ok(Step::Go(Route::Login))
			}
		}
	}

	async fn login(&mut self, intent: Intent) -> io::Result<Step> {
		let Intent::Login { username, password } = intent else {
			match self.sessions.session() {
				Some(session) => writeln!(self.out, "Logged in as {}.", session.display_name())?,
				None => writeln!(self.out, "Log in with `carebook login <username>`.")?,
			}
			return Ok(Step::Done(true));
		};

		match self.sessions.login(&self.api, &username, &password).await {
			Ok(session) => {
				writeln!(self.out, "Welcome, {}.", session.display_name())?;
				Ok(Step::Go(Route::dashboard_for(session.role)))
			}
			Err(failure) => {
				writeln!(self.out, "{failure}")?;
				Ok(Step::Done(false))
			}
		}
	}

	async fn register(&mut self, intent: Intent) -> io::Result<Step> {
		let Intent::Register(form) = intent else {
			writeln!(self.out, "Create an account with `carebook register <username>`.")?;
			return Ok(Step::Done(true));
		};

		match self.sessions.register(&self.api, &form).await {
			Ok(()) => {
				writeln!(self.out, "Account created. Log in with `carebook login {}`.", form.username)?;
				Ok(Step::Done(true))
			}
			Err(failure) => {
				writeln!(self.out, "{failure}")?;
				Ok(Step::Done(false))
			}
		}
	}

	async fn search(&mut self, intent: Intent) -> io::Result<Step> {
		let mut view = SearchProviders::new();
		if let Intent::Filter(location) = intent {
			view.set_location_filter(location);
		}
		view.load(&self.api).await;

		render::heading(&mut self.out, "Providers")?;
		if render::settled(&mut self.out, view.state())?.is_none() {
			return Ok(Step::Done(false));
		}
		render::providers(&mut self.out, &view.visible(), SearchProviders::EMPTY_MESSAGE)?;
		Ok(Step::Done(true))
	}

	async fn book(&mut self, provider_id: u64, session: Option<&Session>, intent: Intent) -> io::Result<Step> {
		let mut view = BookAppointment::new(provider_id);
		view.load(&self.api).await;

		render::heading(&mut self.out, "Book appointment")?;
		match render::settled(&mut self.out, view.provider())? {
			Some(Some(provider)) => writeln!(self.out, "{}", render::provider(provider))?,
			Some(None) => writeln!(self.out, "Provider #{provider_id}")?,
			None => {}
		}

		let Intent::Book(form) = intent else {
			writeln!(
				self.out,
				"Book with `carebook book {provider_id} --name <name> --date YYYY-MM-DD --start HH:MM --end HH:MM`."
			)?;
			return Ok(Step::Done(true));
		};

		*view.form_mut() = form;
		if view.submit(&self.api, session, &Local).await {
			writeln!(self.out, "{}", BookAppointment::SUCCESS_MESSAGE)?;
			Ok(Step::Go(Route::AppointmentHistory { patient: None }))
		} else {
			if let Some(message) = view.form_error() {
				writeln!(self.out, "{message}")?;
			}
			Ok(Step::Done(false))
		}
	}

	async fn history(&mut self, session: Option<&Session>, patient: Option<u64>) -> io::Result<Step> {
		let mut view = AppointmentHistory::new(session, patient, self.cache.clone());
		view.load(&self.api).await;

		render::heading(&mut self.out, "Appointments")?;
		if render::settled(&mut self.out, view.state())?.is_none() {
			return Ok(Step::Done(false));
		}
		render::appointments(&mut self.out, &view.items(), AppointmentHistory::EMPTY_MESSAGE, false)?;
		Ok(Step::Done(true))
	}

	async fn patient_dashboard(&mut self, session: &Session) -> io::Result<Step> {
		let mut view = PatientDashboard::new(session, self.cache.clone());
		view.load(&self.api).await;

		render::heading(&mut self.out, &format!("Welcome, {}", view.greeting()))?;
		if render::settled(&mut self.out, view.state())?.is_none() {
			return Ok(Step::Done(false));
		}
		render::appointments(&mut self.out, &view.items(), PatientDashboard::EMPTY_MESSAGE, false)?;
		Ok(Step::Done(true))
	}

	async fn provider_dashboard(&mut self, session: &Session) -> io::Result<Step> {
		let mut view = ProviderDashboard::new(session, self.cache.clone());
		view.load(&self.api).await;

		render::heading(&mut self.out, &format!("Welcome, {}", view.greeting()))?;
		if render::settled(&mut self.out, view.state())?.is_none() {
			return Ok(Step::Done(false));
		}
		writeln!(self.out, "Upcoming:")?;
		render::appointments(
			&mut self.out,
			&view.upcoming(Utc::now()),
			ProviderDashboard::NO_UPCOMING_MESSAGE,
			false,
		)?;
		writeln!(self.out, "All:")?;
		render::appointments(&mut self.out, &view.all(), ProviderDashboard::EMPTY_MESSAGE, false)?;
		Ok(Step::Done(true))
	}

	async fn bookings(&mut self, session: &Session, intent: Intent) -> io::Result<Step> {
		let mut view = ManageBookings::new(session, self.cache.clone());
		view.load(&self.api).await;

		let acted = match intent {
			Intent::Cancel(id) => Some(view.cancel(&self.api, id).await),
			Intent::Complete(id) => Some(view.complete(&self.api, id).await),
			_ => None,
		};
		if let Some(message) = view.action_message() {
			writeln!(self.out, "{message}")?;
		}

		render::heading(&mut self.out, "Manage bookings")?;
		if render::settled(&mut self.out, view.state())?.is_none() {
			return Ok(Step::Done(false));
		}
		render::appointments(&mut self.out, &view.items(), ManageBookings::EMPTY_MESSAGE, true)?;
		Ok(Step::Done(acted.unwrap_or(true)))
	}
}
