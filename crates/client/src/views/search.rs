use carebook_domain::{Provider, ViewState};

use crate::api::ApiClient;
use crate::query::ProvidersQuery;

/// The provider search screen.
///
/// Loads every provider once; the location filter is applied locally and
/// never refetches.
#[derive(Debug, Clone, Default)]
pub struct SearchProviders {
	state: ViewState<Vec<Provider>>,
	location_filter: String,
}

impl SearchProviders {
	/// Shown when the filtered list is empty.
	pub const EMPTY_MESSAGE: &str = "No providers found. Try clearing your filters.";

	/// Creates the screen in its loading state.
	pub fn new() -> Self {
		Self::default()
	}

	/// Fetches the provider list.
	pub async fn load(&mut self, api: &ApiClient) {
		self.state = ViewState::Loading;
		self.state = api.load(&ProvidersQuery).await;
	}

	/// Sets the location filter.
	pub fn set_location_filter(&mut self, filter: impl Into<String>) {
		self.location_filter = filter.into();
	}

	/// State of the provider fetch.
	pub fn state(&self) -> &ViewState<Vec<Provider>> {
		&self.state
	}

	/// Loaded providers passing the location filter.
	pub fn visible(&self) -> Vec<&Provider> {
		self.state
			.ready()
			.map(|providers| {
				providers
					.iter()
					.filter(|provider| provider.matches_location(&self.location_filter))
					.collect()
			})
			.unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::mock::MockTransport;
	use crate::transport::Method;

	#[tokio::test]
	async fn empty_list_is_ready_not_error() {
		let mock = MockTransport::new();
		mock.respond(Method::Get, "/providers/", 200, json!({"items": []}));
		let mut view = SearchProviders::new();
		assert!(view.state().is_loading());

		view.load(&ApiClient::new(mock)).await;

		assert_eq!(view.state(), &ViewState::Ready(Vec::new()));
		assert!(view.visible().is_empty());
	}

	#[tokio::test]
	async fn filter_narrows_without_refetch() {
		let mock = MockTransport::new();
		mock.respond(
			Method::Get,
			"/providers/",
			200,
			json!({"items": [
				{"id": 1, "user_name": "Dr. Lee", "location": "Salisbury, MD"},
				{"id": 2, "user_name": "Dr. Kim", "location": "Dover, DE"}
			]}),
		);
		let mut view = SearchProviders::new();
		view.load(&ApiClient::new(mock.clone())).await;

		view.set_location_filter("dover");
		assert_eq!(view.visible().iter().map(|p| p.id).collect::<Vec<_>>(), vec![2]);

		view.set_location_filter("");
		assert_eq!(view.visible().len(), 2);
		assert_eq!(mock.requests().len(), 1);
	}
}
