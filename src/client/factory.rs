//! Client factories invoked by the registry when a client must be (re)built.

// crates.io
use reqwest::Client;
// self
use crate::{
	_prelude::*,
	client::acme::HttpAcmeClient,
	config::{IssuerConfig, TransportSettings},
	key::AccountKey,
};

/// Builds a client for an issuer from its configuration and account key.
///
/// Factories run while the registry holds its exclusive lock, so they should stay cheap and must
/// not block on network I/O.
pub trait ClientFactory<C>: Send + Sync {
	/// Construct a new client.
	fn build(&self, config: &IssuerConfig, key: &AccountKey) -> Result<C>;
}
impl<C, F> ClientFactory<C> for F
where
	F: Fn(&IssuerConfig, &AccountKey) -> Result<C> + Send + Sync,
{
	fn build(&self, config: &IssuerConfig, key: &AccountKey) -> Result<C> {
		self(config, key)
	}
}

/// Builder for [`HttpClientFactory`].
#[derive(Debug, Default)]
pub struct HttpClientFactoryBuilder {
	transport: TransportSettings,
	user_agent: Option<String>,
}
impl HttpClientFactoryBuilder {
	/// Create a builder with default transport settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Replace the transport settings.
	pub fn transport(mut self, transport: TransportSettings) -> Self {
		self.transport = transport;

		self
	}

	/// Override the `User-Agent` header sent to ACME servers.
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());

		self
	}

	/// Validate the settings and construct the factory.
	pub fn build(self) -> Result<HttpClientFactory> {
		self.transport.validate()?;

		Ok(HttpClientFactory {
			transport: self.transport,
			user_agent: self.user_agent.unwrap_or_else(default_user_agent),
		})
	}
}

/// Factory producing [`HttpAcmeClient`]s, each with its own connection pool.
///
/// A fresh transport is built per client because TLS verification is a per-issuer setting.
#[derive(Clone, Debug)]
pub struct HttpClientFactory {
	transport: TransportSettings,
	user_agent: String,
}
impl HttpClientFactory {
	/// Create a [`HttpClientFactoryBuilder`].
	pub fn builder() -> HttpClientFactoryBuilder {
		HttpClientFactoryBuilder::new()
	}

	/// Transport settings applied to every client.
	pub fn transport(&self) -> &TransportSettings {
		&self.transport
	}

	/// `User-Agent` header value sent by built clients.
	pub fn user_agent(&self) -> &str {
		&self.user_agent
	}

	fn build_http_client(&self, skip_tls_verify: bool) -> Result<Client> {
		let transport = &self.transport;
		let client = Client::builder()
			.user_agent(self.user_agent.clone())
			.connect_timeout(transport.connect_timeout)
			.tcp_keepalive(transport.keep_alive)
			.pool_max_idle_per_host(transport.max_idle_connections)
			.pool_idle_timeout(transport.idle_timeout)
			.timeout(transport.request_timeout)
			.danger_accept_invalid_certs(skip_tls_verify)
			.build()?;

		Ok(client)
	}
}
impl Default for HttpClientFactory {
	fn default() -> Self {
		Self { transport: TransportSettings::default(), user_agent: default_user_agent() }
	}
}
impl ClientFactory<HttpAcmeClient> for HttpClientFactory {
	fn build(&self, config: &IssuerConfig, key: &AccountKey) -> Result<HttpAcmeClient> {
		config.validate()?;

		if config.skip_tls_verify {
			tracing::warn!(server = %config.server, "TLS verification disabled for ACME directory");
		}

		let http = self.build_http_client(config.skip_tls_verify)?;

		HttpAcmeClient::new(config, key.clone(), http)
	}
}

fn default_user_agent() -> String {
	format!("acme-client-registry/{}", env!("CARGO_PKG_VERSION"))
}
