/// State of a screen backed by one remote fetch.
///
/// A view starts in `Loading`, and each load settles in exactly one of
/// `Error` or `Ready`. Going back to `Loading` only happens when the view's
/// inputs change and it loads again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
	/// Fetch in flight.
	Loading,
	/// Fetch failed; holds the message shown to the user.
	Error(String),
	/// Fetch succeeded.
	Ready(T),
}

impl<T> Default for ViewState<T> {
	fn default() -> Self {
		Self::Loading
	}
}

impl<T> ViewState<T> {
	/// Whether a fetch is still outstanding.
	pub fn is_loading(&self) -> bool {
		matches!(self, Self::Loading)
	}

	/// The error message, if the last fetch failed.
	pub fn error(&self) -> Option<&str> {
		match self {
			Self::Error(message) => Some(message),
			_ => None,
		}
	}

	/// The loaded data, if any.
	pub fn ready(&self) -> Option<&T> {
		match self {
			Self::Ready(data) => Some(data),
			_ => None,
		}
	}
}
