//! Carebook terminal client.
//!
//! Each invocation restores the saved session, resolves the command to a
//! route, and renders the screen the route guard allows.

mod app;
mod cli;
mod config;
mod render;

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use app::{App, Intent};
use carebook_client::{ApiClient, FileSlot, HttpTransport, SessionStore};
use carebook_domain::{BookingForm, RegistrationForm, Route};
use clap::Parser;
use cli::{Cli, Command};
use config::{Config, Overrides};
use tracing::{debug, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
	let cli = Cli::parse();

	setup_tracing(cli.verbose);

	let config = Config::load(&Overrides {
		config: cli.config,
		api_url: cli.api_url,
		data_dir: cli.data_dir,
	})?;
	debug!(api = %config.api_base_url, data_dir = %config.data_dir.display(), "configuration resolved");

	let transport = HttpTransport::new(config.api_base_url.clone(), config.request_timeout())
		.context("failed to build HTTP client")?;
	let sessions = SessionStore::restore(FileSlot::new(config.data_dir.clone()));
	let mut app = App::new(ApiClient::new(transport), sessions, std::io::stdout());

	let ok = run(&mut app, cli.command).await?;
	Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn run<W: Write>(app: &mut App<W>, command: Command) -> anyhow::Result<bool> {
	let (route, intent) = match command {
		Command::Login { username, password } => {
			let password = password_or_prompt(password)?;
			(Route::Login, Intent::Login { username, password })
		}
		Command::Logout => return Ok(app.logout()?),
		Command::Register {
			username,
			email,
			password,
			confirm,
		} => {
			let password = password_or_prompt(password)?;
			let confirm = confirm.unwrap_or_else(|| password.clone());
			let form = RegistrationForm {
				username,
				email,
				password,
				confirm,
			};
			(Route::Register, Intent::Register(form))
		}
		Command::Whoami => return Ok(app.whoami()?),
		Command::Dashboard => {
			let role = app.session().map(|session| session.role).unwrap_or_default();
			(Route::dashboard_for(role), Intent::View)
		}
		Command::Providers { location } => (Route::SearchProviders, Intent::Filter(location)),
		Command::Provider { id } => (Route::BookAppointment { provider_id: id }, Intent::View),
		Command::Book {
			provider_id,
			name,
			date,
			start,
			end,
			service,
			notes,
		} => {
			let mut form = BookingForm {
				patient_name: name,
				date,
				start_time: start,
				end_time: end,
				notes,
				..BookingForm::default()
			};
			if let Some(service) = service {
				form.service = service;
			}
			(Route::BookAppointment { provider_id }, Intent::Book(form))
		}
		Command::Appointments { patient } => (Route::AppointmentHistory { patient }, Intent::View),
		Command::Bookings => (Route::ManageBookings, Intent::View),
		Command::Cancel { id } => (Route::ManageBookings, Intent::Cancel(id)),
		Command::Complete { id } => (Route::ManageBookings, Intent::Complete(id)),
		Command::Open { path } => (path.parse::<Route>()?, Intent::View),
	};

	info!(%route, "navigating");
	Ok(app.navigate(route, intent).await?)
}

fn password_or_prompt(password: Option<String>) -> anyhow::Result<String> {
	if let Some(password) = password {
		return Ok(password);
	}

	eprint!("Password: ");
	std::io::stderr().flush()?;
	let mut line = String::new();
	std::io::stdin()
		.lock()
		.read_line(&mut line)
		.context("failed to read password from stdin")?;
	Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = || {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("carebook=debug")
			} else {
				EnvFilter::new("carebook=warn")
			}
		})
	};

	// CAREBOOK_LOG_DIR sends logs to a file instead of stderr
	if let Some(log_dir) = std::env::var_os("CAREBOOK_LOG_DIR").map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("carebook.{}.log", std::process::id()));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true);

			tracing_subscriber::registry()
				.with(filter())
				.with(file_layer)
				.init();

			tracing::info!(path = ?log_path, "tracing initialized");
			return;
		}
	}

	tracing_subscriber::fmt()
		.with_env_filter(filter())
		.with_writer(std::io::stderr)
		.init();
}
