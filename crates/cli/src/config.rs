//! Client configuration.
//!
//! Layers, lowest to highest: built-in defaults, `config.toml`, environment,
//! command-line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";

const APP_DIR: &str = "carebook";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read config {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("invalid config {}: {source}", path.display())]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},
	#[error("invalid API URL {value:?}: {source}")]
	InvalidUrl {
		value: String,
		#[source]
		source: url::ParseError,
	},
	#[error("no data directory available; set CAREBOOK_DATA_DIR or pass --data-dir")]
	NoDataDir,
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	pub api_base_url: Url,
	pub data_dir: PathBuf,
	pub request_timeout_secs: Option<u64>,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
	pub config: Option<PathBuf>,
	pub api_url: Option<String>,
	pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
	api_url: Option<String>,
	data_dir: Option<PathBuf>,
	request_timeout_secs: Option<u64>,
}

impl Config {
	/// Loads configuration from the process environment and standard paths.
	pub fn load(overrides: &Overrides) -> Result<Self, ConfigError> {
		Self::resolve(overrides, |key| std::env::var(key).ok())
	}

	/// Loads configuration reading environment variables through `env`.
	pub fn resolve(overrides: &Overrides, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let file = match &overrides.config {
			Some(path) => read_file(path)?,
			None => match default_config_path(&env) {
				Some(path) if path.is_file() => read_file(&path)?,
				_ => FileConfig::default(),
			},
		};

		let api_url = overrides
			.api_url
			.clone()
			.or_else(|| env("CAREBOOK_API_URL"))
			.or(file.api_url)
			.unwrap_or_else(|| DEFAULT_API_URL.to_owned());
		let api_base_url = Url::parse(&api_url).map_err(|source| ConfigError::InvalidUrl {
			value: api_url.clone(),
			source,
		})?;

		let data_dir = overrides
			.data_dir
			.clone()
			.or_else(|| env("CAREBOOK_DATA_DIR").map(PathBuf::from))
			.or(file.data_dir)
			.or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR)))
			.ok_or(ConfigError::NoDataDir)?;

		Ok(Self {
			api_base_url,
			data_dir,
			request_timeout_secs: file.request_timeout_secs,
		})
	}

	/// Per-request timeout, if one is configured.
	pub fn request_timeout(&self) -> Option<Duration> {
		self.request_timeout_secs.map(Duration::from_secs)
	}
}

fn default_config_path(env: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
	env("XDG_CONFIG_HOME")
		.map(PathBuf::from)
		.or_else(dirs::config_dir)
		.map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
	debug!(path = %path.display(), "reading config");
	let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
		path: path.to_owned(),
		source,
	})?;
	toml::from_str(&text).map_err(|source| ConfigError::Parse {
		path: path.to_owned(),
		source,
	})
}
