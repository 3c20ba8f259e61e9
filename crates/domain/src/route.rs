//! Client-side routes and the guard that gates them.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::session::{Role, Session};

const PATIENT_ONLY: &[Role] = &[Role::Patient];
const PROVIDER_ONLY: &[Role] = &[Role::Provider];

/// A navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
	/// `/login`
	Login,
	/// `/register`
	Register,
	/// `/patient/dashboard`
	PatientDashboard,
	/// `/patient/search-providers`
	SearchProviders,
	/// `/patient/book-appointment/{provider_id}`
	BookAppointment {
		/// Provider being booked.
		provider_id: u64,
	},
	/// `/patient/appointments[?patient={id}]`
	AppointmentHistory {
		/// Patient to show when no session supplies one.
		patient: Option<u64>,
	},
	/// `/provider/dashboard`
	ProviderDashboard,
	/// `/provider/bookings`
	ManageBookings,
}

/// How a route is protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
	/// Renders for everyone, logged in or not.
	Public,
	/// Requires a session; `Some` further restricts the roles.
	Protected(Option<&'static [Role]>),
}

/// Outcome of the route guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
	/// Render the requested content.
	Render,
	/// Navigate elsewhere instead.
	Redirect(Route),
}

/// Error returned when a path names no known route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
	/// The path matches no route.
	#[error("unknown route: {0}")]
	Unknown(String),
	/// A path or query id is not a number.
	#[error("invalid id in route {path}: {value}")]
	InvalidId {
		/// The full path being parsed.
		path: String,
		/// The offending segment.
		value: String,
	},
}

impl Route {
	/// The dashboard a session with `role` lands on.
	pub fn dashboard_for(role: Role) -> Self {
		match role {
			Role::Provider => Self::ProviderDashboard,
			Role::Patient => Self::PatientDashboard,
		}
	}

	/// Protection declared for this route.
	pub fn access(self) -> Access {
		match self {
			Self::Login | Self::Register => Access::Public,
			Self::PatientDashboard
			| Self::SearchProviders
			| Self::BookAppointment { .. }
			| Self::AppointmentHistory { .. } => Access::Protected(Some(PATIENT_ONLY)),
			Self::ProviderDashboard | Self::ManageBookings => Access::Protected(Some(PROVIDER_ONLY)),
		}
	}

	/// Runs the guard for this route against the current session.
	pub fn resolve(self, session: Option<&Session>) -> Guard {
		match self.access() {
			Access::Public => Guard::Render,
			Access::Protected(allowed) => guard(session, allowed),
		}
	}

	/// Path of the route, including its query string.
	pub fn path(self) -> String {
		match self {
			Self::Login => "/login".into(),
			Self::Register => "/register".into(),
			Self::PatientDashboard => "/patient/dashboard".into(),
			Self::SearchProviders => "/patient/search-providers".into(),
			Self::BookAppointment { provider_id } => {
				format!("/patient/book-appointment/{provider_id}")
			}
			Self::AppointmentHistory { patient: None } => "/patient/appointments".into(),
			Self::AppointmentHistory { patient: Some(id) } => {
				format!("/patient/appointments?patient={id}")
			}
			Self::ProviderDashboard => "/provider/dashboard".into(),
			Self::ManageBookings => "/provider/bookings".into(),
		}
	}
}

impl fmt::Display for Route {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.path())
	}
}

impl FromStr for Route {
	type Err = RouteError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (path, query) = s.split_once('?').unwrap_or((s, ""));
		let path = path.trim_end_matches('/');
		let parse_id = |value: &str| {
			value.parse::<u64>().map_err(|_| RouteError::InvalidId {
				path: s.to_owned(),
				value: value.to_owned(),
			})
		};

		let route = match path {
			"" | "/login" => Self::Login,
			"/register" => Self::Register,
			"/patient/dashboard" => Self::PatientDashboard,
			"/patient/search-providers" => Self::SearchProviders,
			"/patient/appointments" => {
				let patient = query
					.split('&')
					.filter_map(|pair| pair.split_once('='))
					.find(|(key, _)| *key == "patient")
					.map(|(_, value)| value)
					.filter(|value| !value.is_empty())
					.map(parse_id)
					.transpose()?;
				Self::AppointmentHistory { patient }
			}
			"/provider/dashboard" => Self::ProviderDashboard,
			"/provider/bookings" => Self::ManageBookings,
			other => match other.strip_prefix("/patient/book-appointment/") {
				Some(id) if !id.contains('/') => Self::BookAppointment {
					provider_id: parse_id(id)?,
				},
				_ => return Err(RouteError::Unknown(s.to_owned())),
			},
		};
		Ok(route)
	}
}

/// Decides whether protected content may render.
///
/// `allowed` is the route's role restriction; `None` admits any logged-in
/// session. A session whose role is not admitted is sent to its own
/// dashboard rather than to the login page.
pub fn guard(session: Option<&Session>, allowed: Option<&[Role]>) -> Guard {
	let Some(session) = session else {
		return Guard::Redirect(Route::Login);
	};

	match allowed {
		Some(roles) if !roles.contains(&session.role) => {
			Guard::Redirect(Route::dashboard_for(session.role))
		}
		_ => Guard::Render,
	}
}
