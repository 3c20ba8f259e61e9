//! Plain-text rendering of screen models.

use std::io::{self, Write};

use carebook_domain::{Appointment, Provider, ViewState};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Prints a loading or error state. Returns the content once ready.
pub fn settled<'a, T>(out: &mut impl Write, state: &'a ViewState<T>) -> io::Result<Option<&'a T>> {
	match state {
		ViewState::Loading => {
			writeln!(out, "Loading...")?;
			Ok(None)
		}
		ViewState::Error(message) => {
			writeln!(out, "{message}")?;
			Ok(None)
		}
		ViewState::Ready(content) => Ok(Some(content)),
	}
}

pub fn heading(out: &mut impl Write, title: &str) -> io::Result<()> {
	writeln!(out, "{title}")?;
	writeln!(out, "{}", "-".repeat(title.chars().count()))
}

/// Lists appointments, or `empty` when there are none. With `actions`,
/// confirmed ones are marked as still cancellable or completable.
pub fn appointments(
	out: &mut impl Write,
	items: &[Appointment],
	empty: &str,
	actions: bool,
) -> io::Result<()> {
	if items.is_empty() {
		return writeln!(out, "{empty}");
	}
	for item in items {
		let mut line = appointment(item);
		if actions && item.is_actionable() {
			line.push_str("  (cancel/complete)");
		}
		writeln!(out, "{line}")?;
	}
	Ok(())
}

pub fn appointment(item: &Appointment) -> String {
	let mut fields = vec![
		format!("#{}", item.id),
		format!(
			"{} - {}",
			item.start.format(TIME_FORMAT),
			item.end.format(TIME_FORMAT)
		),
	];
	let labelled = [
		("", &item.service),
		("patient: ", &item.patient_name),
		("provider: ", &item.provider_name),
	];
	for (label, value) in labelled {
		if let Some(value) = value.as_deref().filter(|value| !value.is_empty()) {
			fields.push(format!("{label}{value}"));
		}
	}
	fields.push(format!("[{}]", item.status));
	fields.join("  ")
}

pub fn providers(out: &mut impl Write, items: &[&Provider], empty: &str) -> io::Result<()> {
	if items.is_empty() {
		return writeln!(out, "{empty}");
	}
	for item in items {
		writeln!(out, "{}", provider(item))?;
	}
	Ok(())
}

pub fn provider(item: &Provider) -> String {
	let mut fields = vec![
		format!("#{}", item.id),
		item.name.clone().unwrap_or_else(|| "Unnamed provider".to_owned()),
	];
	fields.extend(item.specialty.iter().filter(|s| !s.is_empty()).cloned());
	fields.extend(item.location.iter().filter(|s| !s.is_empty()).cloned());
	fields.join("  ")
}
