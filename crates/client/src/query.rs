//! The shared fetch routine behind every screen.
//!
//! A [`Query`] names an endpoint, how to pull the screen's data out of the
//! response, and the message to show if the fetch fails. [`ApiClient::load`]
//! turns one query into a settled [`ViewState`].

use std::sync::Arc;

use carebook_domain::{AppointmentCache, AppointmentList, Provider, ViewState};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, warn};

use crate::api::ApiClient;

/// A read-only fetch backing one screen.
pub trait Query {
	/// Data the screen renders once loaded.
	type Output;

	/// Path and query string, relative to the backend base URL.
	fn path(&self) -> String;

	/// Message shown when the fetch fails, whatever the cause.
	fn failure_message(&self) -> &str;

	/// Extracts the screen's data from an accepted response body.
	///
	/// Missing or malformed fields yield empty data rather than an error.
	fn decode(&self, body: Value) -> Self::Output;
}

impl ApiClient {
	/// Runs a query and settles it into `Ready` or `Error`.
	pub async fn load<Q: Query>(&self, query: &Q) -> ViewState<Q::Output> {
		let path = query.path();
		match self.fetch(&path).await {
			Ok(body) => ViewState::Ready(query.decode(body)),
			Err(e) => {
				error!(%path, error = %e, "fetch failed");
				ViewState::Error(query.failure_message().to_owned())
			}
		}
	}
}

/// Decodes the array under `field`, skipping elements that do not fit `T`.
fn decode_items<T: DeserializeOwned>(body: &Value, field: &str) -> Vec<T> {
	let Some(items) = body.get(field) else {
		return Vec::new();
	};
	let Some(items) = items.as_array() else {
		warn!(field, "expected an array, treating as empty");
		return Vec::new();
	};

	items
		.iter()
		.filter_map(|item| match T::deserialize(item) {
			Ok(item) => Some(item),
			Err(e) => {
				warn!(field, error = %e, "skipping malformed element");
				None
			}
		})
		.collect()
}

/// `GET /providers/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvidersQuery;

impl Query for ProvidersQuery {
	type Output = Vec<Provider>;

	fn path(&self) -> String {
		"/providers/".into()
	}

	fn failure_message(&self) -> &str {
		"Could not load providers from the server."
	}

	fn decode(&self, body: Value) -> Self::Output {
		decode_items(&body, "items")
	}
}

/// `GET /providers/{id}/`.
#[derive(Debug, Clone, Copy)]
pub struct ProviderQuery {
	/// Provider profile id.
	pub id: u64,
}

impl Query for ProviderQuery {
	type Output = Option<Provider>;

	fn path(&self) -> String {
		format!("/providers/{}/", self.id)
	}

	fn failure_message(&self) -> &str {
		"Could not load provider information."
	}

	fn decode(&self, body: Value) -> Self::Output {
		let item = body.get("item").filter(|item| !item.is_null())?;
		Provider::deserialize(item)
			.map_err(|e| warn!(id = self.id, error = %e, "malformed provider"))
			.ok()
	}
}

/// Which appointments to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentFilter {
	/// Every appointment the backend returns.
	All,
	/// Appointments of one patient.
	Patient(u64),
	/// Appointments with one provider.
	Provider(u64),
}

impl AppointmentFilter {
	fn path(self) -> String {
		match self {
			Self::All => "/appointments/".into(),
			Self::Patient(id) => format!("/appointments/?patient={id}"),
			Self::Provider(id) => format!("/appointments/?provider={id}"),
		}
	}
}

/// `GET /appointments/`, cached into a shared [`AppointmentCache`].
#[derive(Debug, Clone)]
pub struct AppointmentsQuery {
	filter: AppointmentFilter,
	failure_message: &'static str,
	cache: Arc<AppointmentCache>,
}

impl AppointmentsQuery {
	/// Creates a query whose results land in `cache`.
	pub fn new(
		filter: AppointmentFilter,
		failure_message: &'static str,
		cache: Arc<AppointmentCache>,
	) -> Self {
		Self {
			filter,
			failure_message,
			cache,
		}
	}
}

impl Query for AppointmentsQuery {
	type Output = AppointmentList;

	fn path(&self) -> String {
		self.filter.path()
	}

	fn failure_message(&self) -> &str {
		self.failure_message
	}

	fn decode(&self, body: Value) -> Self::Output {
		AppointmentList::cache(self.cache.clone(), decode_items(&body, "items"))
	}
}
