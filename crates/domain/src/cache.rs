//! One shared copy of every appointment the client has seen.
//!
//! Views keep only the ordered ids of the appointments they fetched and read
//! the records through the cache, so a status change made from one view is
//! what every other view renders too.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::model::{Appointment, AppointmentStatus};

/// Appointments keyed by id.
#[derive(Debug, Default)]
pub struct AppointmentCache {
	entries: RwLock<IndexMap<u64, Appointment>>,
}

impl AppointmentCache {
	/// Creates an empty cache ready to be shared between views.
	pub fn shared() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Inserts or replaces a fetched batch and returns its ids in fetch order.
	pub fn upsert_all(&self, appointments: impl IntoIterator<Item = Appointment>) -> Vec<u64> {
		let mut entries = self.entries.write();
		appointments
			.into_iter()
			.map(|appointment| {
				let id = appointment.id;
				entries.insert(id, appointment);
				id
			})
			.collect()
	}

	/// Sets the status of a cached appointment. Returns `false` if the id is
	/// not cached.
	pub fn set_status(&self, id: u64, status: AppointmentStatus) -> bool {
		match self.entries.write().get_mut(&id) {
			Some(appointment) => {
				appointment.status = status;
				true
			}
			None => false,
		}
	}

	/// Number of cached appointments.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Whether nothing is cached.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

/// An ordered selection of cached appointments, as one view fetched them.
#[derive(Debug, Clone)]
pub struct AppointmentList {
	ids: Vec<u64>,
	cache: Arc<AppointmentCache>,
}

impl AppointmentList {
	/// Caches `appointments` and keeps their order.
	pub fn cache(cache: Arc<AppointmentCache>, appointments: Vec<Appointment>) -> Self {
		let ids = cache.upsert_all(appointments);
		Self { ids, cache }
	}

	/// Current copies of the listed appointments, in fetch order.
	pub fn items(&self) -> Vec<Appointment> {
		let entries = self.cache.entries.read();
		self.ids
			.iter()
			.filter_map(|id| entries.get(id).cloned())
			.collect()
	}

	/// Ids in fetch order.
	pub fn ids(&self) -> &[u64] {
		&self.ids
	}

	/// Number of listed appointments.
	pub fn len(&self) -> usize {
		self.ids.len()
	}

	/// Whether the list is empty.
	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}
}

impl PartialEq for AppointmentList {
	fn eq(&self, other: &Self) -> bool {
		self.ids == other.ids && Arc::ptr_eq(&self.cache, &other.cache)
	}
}

#[cfg(test)]
mod tests {
	use chrono::{TimeZone, Utc};

	use super::*;

	fn appointment(id: u64, status: AppointmentStatus) -> Appointment {
		let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
		Appointment {
			id,
			patient: Some(3),
			provider: Some(4),
			patient_name: None,
			provider_name: None,
			service: None,
			status,
			start,
			end: start + chrono::Duration::minutes(30),
			notes: None,
		}
	}

	#[test]
	fn lists_keep_fetch_order() {
		let cache = AppointmentCache::shared();
		let list = AppointmentList::cache(
			cache.clone(),
			vec![
				appointment(9, AppointmentStatus::Confirmed),
				appointment(2, AppointmentStatus::Completed),
			],
		);

		assert_eq!(list.ids(), &[9, 2]);
		assert_eq!(list.items().iter().map(|a| a.id).collect::<Vec<_>>(), vec![9, 2]);
		assert_eq!(cache.len(), 2);
	}

	#[test]
	fn status_patch_is_visible_to_every_list() {
		let cache = AppointmentCache::shared();
		let history = AppointmentList::cache(cache.clone(), vec![appointment(1, AppointmentStatus::Confirmed)]);
		let dashboard = AppointmentList::cache(cache.clone(), vec![appointment(1, AppointmentStatus::Confirmed)]);

		assert!(cache.set_status(1, AppointmentStatus::Cancelled));

		assert_eq!(history.items()[0].status, AppointmentStatus::Cancelled);
		assert_eq!(dashboard.items()[0].status, AppointmentStatus::Cancelled);
	}

	#[test]
	fn patching_unknown_id_is_reported() {
		let cache = AppointmentCache::default();
		assert!(!cache.set_status(42, AppointmentStatus::Completed));
		assert!(cache.is_empty());
	}

	#[test]
	fn refetch_replaces_cached_copy() {
		let cache = AppointmentCache::shared();
		let earlier = AppointmentList::cache(cache.clone(), vec![appointment(1, AppointmentStatus::Cancelled)]);
		cache.upsert_all([appointment(1, AppointmentStatus::Completed)]);

		assert_eq!(earlier.items()[0].status, AppointmentStatus::Completed);
		assert_eq!(cache.len(), 1);
	}
}
