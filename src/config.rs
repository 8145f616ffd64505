//! Issuer and transport configuration consumed by client factories.

// crates.io
use serde::{Deserialize, Serialize};
use url::Url;
// self
use crate::_prelude::*;

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default TCP keep-alive interval.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(30);
/// Default cap on idle pooled connections.
pub const DEFAULT_MAX_IDLE_CONNECTIONS: usize = 100;
/// Default idle connection timeout.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
/// Default end-to-end request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// ACME settings of an issuer that affect how its client is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerConfig {
	/// ACME directory endpoint, exactly as configured.
	///
	/// Kept verbatim so that any spelling change (case, trailing slash, explicit port) is treated
	/// as a configuration change.
	pub server: String,
	/// Disable TLS certificate verification against the directory endpoint.
	#[serde(default)]
	pub skip_tls_verify: bool,
}
impl IssuerConfig {
	/// Validate a directory URL and build a config with TLS verification enabled.
	pub fn new(server: impl Into<String>) -> Result<Self> {
		let config = Self { server: server.into(), skip_tls_verify: false };

		config.validate()?;

		Ok(config)
	}

	/// Set the skip-verify flag to the desired value.
	pub fn with_skip_tls_verify(mut self, skip_tls_verify: bool) -> Self {
		self.skip_tls_verify = skip_tls_verify;

		self
	}

	/// Parse the configured server into a directory URL.
	pub fn directory_url(&self) -> Result<Url> {
		Ok(Url::parse(&self.server)?)
	}

	/// Validate the directory URL.
	pub fn validate(&self) -> Result<()> {
		let url = self.directory_url()?;

		if !matches!(url.scheme(), "http" | "https") {
			return Err(Error::Validation {
				field: "server",
				reason: format!("Unsupported scheme '{}'; expected http or https.", url.scheme()),
			});
		}
		if url.host_str().is_none() {
			return Err(Error::Validation {
				field: "server",
				reason: "Must include a host component.".into(),
			});
		}

		Ok(())
	}
}

/// Connection pool and timeout settings for the HTTP transport behind each client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportSettings {
	/// Timeout for establishing TCP connections.
	#[serde(default = "default_connect_timeout")]
	pub connect_timeout: Duration,
	/// TCP keep-alive interval.
	#[serde(default = "default_keep_alive")]
	pub keep_alive: Duration,
	/// Maximum idle connections retained per host.
	#[serde(default = "default_max_idle_connections")]
	pub max_idle_connections: usize,
	/// How long idle pooled connections are retained.
	#[serde(default = "default_idle_timeout")]
	pub idle_timeout: Duration,
	/// Deadline for a whole request, from connect to body.
	#[serde(default = "default_request_timeout")]
	pub request_timeout: Duration,
}
impl TransportSettings {
	/// Validate invariants for transport configuration.
	pub fn validate(&self) -> Result<()> {
		for (field, value) in [
			("connect_timeout", self.connect_timeout),
			("idle_timeout", self.idle_timeout),
			("request_timeout", self.request_timeout),
		] {
			if value.is_zero() {
				return Err(Error::Validation {
					field,
					reason: "Must be greater than zero.".into(),
				});
			}
		}
		if self.request_timeout < self.connect_timeout {
			return Err(Error::Validation {
				field: "request_timeout",
				reason: "Must be greater than or equal to connect_timeout.".into(),
			});
		}

		Ok(())
	}
}
impl Default for TransportSettings {
	fn default() -> Self {
		Self {
			connect_timeout: DEFAULT_CONNECT_TIMEOUT,
			keep_alive: DEFAULT_KEEP_ALIVE,
			max_idle_connections: DEFAULT_MAX_IDLE_CONNECTIONS,
			idle_timeout: DEFAULT_IDLE_TIMEOUT,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}
}

fn default_connect_timeout() -> Duration {
	DEFAULT_CONNECT_TIMEOUT
}

fn default_keep_alive() -> Duration {
	DEFAULT_KEEP_ALIVE
}

fn default_max_idle_connections() -> usize {
	DEFAULT_MAX_IDLE_CONNECTIONS
}

fn default_idle_timeout() -> Duration {
	DEFAULT_IDLE_TIMEOUT
}

fn default_request_timeout() -> Duration {
	DEFAULT_REQUEST_TIMEOUT
}
