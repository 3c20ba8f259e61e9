//! Durable storage for the serialized session.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Name of the single entry holding the session.
pub const SLOT_NAME: &str = "user";

/// Error reading or writing the session slot.
#[derive(Debug, Error)]
pub enum SlotError {
	/// The backing file could not be read, written or removed.
	#[error("I/O error on {path}: {error}")]
	Io {
		/// Path of the slot file.
		path: PathBuf,
		/// The underlying I/O error.
		error: io::Error,
	},
}

/// A single named entry that survives restarts.
pub trait SessionSlot {
	/// Reads the stored text, `None` when nothing is stored.
	fn read(&self) -> Result<Option<String>, SlotError>;

	/// Replaces the stored text.
	fn write(&self, contents: &str) -> Result<(), SlotError>;

	/// Removes the entry. Removing an absent entry succeeds.
	fn clear(&self) -> Result<(), SlotError>;
}

/// Slot backed by `<dir>/user.json`.
///
/// Writes go through a temporary file in the same directory and are renamed
/// into place, so a crash never leaves a half-written session behind.
#[derive(Debug, Clone)]
pub struct FileSlot {
	dir: PathBuf,
	path: PathBuf,
}

impl FileSlot {
	/// Creates a slot stored under `dir`. The directory is created on first
	/// write.
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		let dir = dir.into();
		let path = dir.join(format!("{SLOT_NAME}.json"));
		Self { dir, path }
	}

	/// Path of the slot file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn io_error(&self, error: io::Error) -> SlotError {
		SlotError::Io {
			path: self.path.clone(),
			error,
		}
	}
}

impl SessionSlot for FileSlot {
	fn read(&self) -> Result<Option<String>, SlotError> {
		match fs::read_to_string(&self.path) {
			Ok(contents) => Ok(Some(contents)),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(self.io_error(e)),
		}
	}

	fn write(&self, contents: &str) -> Result<(), SlotError> {
		fs::create_dir_all(&self.dir).map_err(|e| self.io_error(e))?;

		let mut file = tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| self.io_error(e))?;
		file.write_all(contents.as_bytes())
			.map_err(|e| self.io_error(e))?;
		file.persist(&self.path)
			.map_err(|e| self.io_error(e.error))?;
		Ok(())
	}

	fn clear(&self) -> Result<(), SlotError> {
		match fs::remove_file(&self.path) {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(self.io_error(e)),
		}
	}
}

/// In-memory slot for tests. Clones share the same entry.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
	contents: std::sync::Arc<parking_lot::Mutex<Option<String>>>,
}

#[cfg(any(test, feature = "mock"))]
impl MemorySlot {
	/// Creates an empty slot.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a slot already holding `contents`.
	pub fn with_contents(contents: impl Into<String>) -> Self {
		let slot = Self::default();
		*slot.contents.lock() = Some(contents.into());
		slot
	}

	/// What the slot currently holds.
	pub fn contents(&self) -> Option<String> {
		self.contents.lock().clone()
	}
}

#[cfg(any(test, feature = "mock"))]
impl SessionSlot for MemorySlot {
	fn read(&self) -> Result<Option<String>, SlotError> {
		Ok(self.contents())
	}

	fn write(&self, contents: &str) -> Result<(), SlotError> {
		*self.contents.lock() = Some(contents.to_owned());
		Ok(())
	}

	fn clear(&self) -> Result<(), SlotError> {
		*self.contents.lock() = None;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn file_slot_round_trips_and_clears() {
		let dir = tempfile::tempdir().unwrap();
		let slot = FileSlot::new(dir.path().join("nested"));

		assert_eq!(slot.read().unwrap(), None);

		slot.write(r#"{"id":1}"#).unwrap();
		assert_eq!(slot.read().unwrap().as_deref(), Some(r#"{"id":1}"#));
		assert!(slot.path().ends_with("user.json"));

		slot.write(r#"{"id":2}"#).unwrap();
		assert_eq!(slot.read().unwrap().as_deref(), Some(r#"{"id":2}"#));

		slot.clear().unwrap();
		assert_eq!(slot.read().unwrap(), None);
		slot.clear().unwrap();
	}

	#[test]
	fn unreadable_slot_reports_path() {
		let dir = tempfile::tempdir().unwrap();
		let slot = FileSlot::new(dir.path());
		fs::create_dir(slot.path()).unwrap();

		let err = slot.read().unwrap_err();
		assert!(err.to_string().contains("user.json"));
	}
}
