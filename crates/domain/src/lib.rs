//! Domain model for the carebook appointment client.
//!
//! This crate holds everything that does not talk to the network:
//!
//! - [`Session`] and [`Role`]: the cached record of the logged-in user.
//! - [`Appointment`] and [`Provider`]: records sourced from the backend.
//! - [`Route`] and [`guard`]: client-side route gating.
//! - [`ViewState`]: the three-state model every screen renders from.
//! - [`BookingForm`] and [`RegistrationForm`]: local form validation.
//! - [`AppointmentCache`]: one copy of each appointment, shared by all views.
//!
//! # Route gating
//!
//! ```
//! use carebook_domain::{Guard, Role, Route, Session, guard};
//!
//! let patient = Session::new(3, "alice", Role::Patient);
//! assert_eq!(
//! 	guard(Some(&patient), Some(&[Role::Provider][..])),
//! 	Guard::Redirect(Route::PatientDashboard),
//! );
//! assert_eq!(guard(None, None), Guard::Redirect(Route::Login));
//! ```

#![warn(missing_docs)]

mod cache;
mod form;
mod model;
mod route;
mod session;
mod view;

pub use cache::{AppointmentCache, AppointmentList};
pub use form::{BookingForm, BookingPayload, RegistrationForm, RegistrationRequest, ValidationError};
pub use model::{Appointment, AppointmentAction, AppointmentStatus, Provider};
pub use route::{Access, Guard, Route, RouteError, guard};
pub use session::{Role, Session};
pub use view::ViewState;
