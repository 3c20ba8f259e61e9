//! Backend access and screen models for the carebook client.
//!
//! The backend is a plain REST service. Everything here funnels through one
//! [`Transport`] so the HTTP stack can be swapped for a scripted one in tests.
//!
//! # Layers
//!
//! - [`ApiClient`]: typed calls against the backend endpoints.
//! - [`SessionStore`]: login, logout and registration, mirrored into a
//!   durable [`SessionSlot`].
//! - [`Query`] and [`ApiClient::load`]: the single fetch routine every screen
//!   uses to go from `Loading` to `Ready` or `Error`.
//! - [`views`]: one model per screen.
//!
//! # Example
//!
//! ```ignore
//! use carebook_client::{ApiClient, FileSlot, HttpTransport, SessionStore};
//!
//! let transport = HttpTransport::new("http://127.0.0.1:8000/api".parse()?, None)?;
//! let api = ApiClient::new(transport);
//! let mut sessions = SessionStore::restore(FileSlot::new(data_dir));
//!
//! match sessions.login(&api, "alice", "secret").await {
//! 	Ok(session) => println!("hello {}", session.display_name()),
//! 	Err(failure) => eprintln!("{failure}"),
//! }
//! ```

#![warn(missing_docs)]

mod api;
mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod query;
mod session;
mod slot;
mod transport;
pub mod views;

pub use api::{ApiClient, Reply};
pub use error::{ApiError, ApiResult, TransportError};
pub use query::{AppointmentFilter, AppointmentsQuery, ProviderQuery, ProvidersQuery, Query};
pub use session::{AuthFailure, SessionStore};
pub use slot::{FileSlot, SLOT_NAME, SessionSlot, SlotError};
pub use transport::{ApiRequest, HttpTransport, Method, RawResponse, Transport};
