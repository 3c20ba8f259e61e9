use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "carebook")]
#[command(about = "Book and manage medical appointments")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Config file to read instead of the default location
	#[arg(long, global = true, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Backend base URL (e.g. http://127.0.0.1:8000/api)
	#[arg(long, global = true, value_name = "URL")]
	pub api_url: Option<String>,

	/// Directory holding the saved session
	#[arg(long, global = true, value_name = "PATH")]
	pub data_dir: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Log in and open your dashboard
	Login {
		/// Account name.
		username: String,
		/// Password (read from stdin if omitted)
		#[arg(long)]
		password: Option<String>,
	},
	/// Forget the saved session
	Logout,
	/// Create a patient account
	Register {
		/// Account name.
		username: String,
		/// Contact email
		#[arg(long, default_value = "")]
		email: String,
		/// Password (read from stdin if omitted)
		#[arg(long)]
		password: Option<String>,
		/// Password confirmation (defaults to the password)
		#[arg(long)]
		confirm: Option<String>,
	},
	/// Show who is logged in
	Whoami,
	/// Open the dashboard for your role
	Dashboard,
	/// Search providers
	Providers {
		/// Only show providers whose location contains this text
		#[arg(long, short = 'l', default_value = "")]
		location: String,
	},
	/// Show one provider's booking page
	Provider {
		/// Provider id.
		id: u64,
	},
	/// Book an appointment with a provider
	Book {
		/// Provider id.
		provider_id: u64,
		/// Patient name
		#[arg(long)]
		name: String,
		/// Day of the appointment (YYYY-MM-DD)
		#[arg(long)]
		date: String,
		/// Start time (HH:MM, local)
		#[arg(long)]
		start: String,
		/// End time (HH:MM, local)
		#[arg(long)]
		end: String,
		/// Kind of visit
		#[arg(long)]
		service: Option<String>,
		/// Free-form notes
		#[arg(long, default_value = "")]
		notes: String,
	},
	/// List appointment history
	Appointments {
		/// Patient to list when not logged in
		#[arg(long)]
		patient: Option<u64>,
	},
	/// List bookings to manage (providers)
	Bookings,
	/// Cancel a booking (providers)
	Cancel {
		/// Appointment id.
		id: u64,
	},
	/// Mark a booking completed (providers)
	Complete {
		/// Appointment id.
		id: u64,
	},
	/// Navigate to a route path (e.g. /patient/appointments?patient=3)
	Open {
		/// Route path.
		path: String,
	},
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn command_definition_is_consistent() {
		Cli::command().debug_assert();
	}

	#[test]
	fn global_flags_follow_subcommands() {
		let cli = Cli::try_parse_from(["carebook", "appointments", "--patient", "3", "--verbose"])
			.unwrap();
		assert!(cli.verbose);
		assert!(matches!(cli.command, Command::Appointments { patient: Some(3) }));
	}
}
