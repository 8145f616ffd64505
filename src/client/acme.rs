//! Default ACME client backed by a dedicated reqwest transport.

// crates.io
use reqwest::{Client, header::ACCEPT};
use serde::{Deserialize, Serialize};
use url::Url;
// self
use crate::{_prelude::*, config::IssuerConfig, key::AccountKey, metrics};

const ACTION_DIRECTORY: &str = "directory";

/// ACME directory document advertised by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directory {
	/// Endpoint issuing replay nonces.
	pub new_nonce: Url,
	/// Endpoint registering accounts.
	pub new_account: Url,
	/// Endpoint creating orders.
	pub new_order: Url,
	/// Endpoint for pre-authorization, when supported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub new_authz: Option<Url>,
	/// Endpoint revoking certificates.
	pub revoke_cert: Url,
	/// Endpoint rolling over account keys.
	pub key_change: Url,
	/// Optional server metadata.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub meta: Option<DirectoryMeta>,
}

/// Metadata block of an ACME directory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryMeta {
	/// Current terms of service.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub terms_of_service: Option<Url>,
	/// Website describing the CA.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub website: Option<Url>,
	/// CAA identities the server recognises.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub caa_identities: Vec<String>,
	/// Whether new accounts must be bound to an external account.
	#[serde(default)]
	pub external_account_required: bool,
}

/// ACME client for one issuer: a directory endpoint, an account key, and its own transport.
#[derive(Clone, Debug)]
pub struct HttpAcmeClient {
	directory_url: Url,
	skip_tls_verify: bool,
	key: AccountKey,
	http: Client,
}
impl HttpAcmeClient {
	/// Assemble a client from an already configured transport.
	pub fn new(config: &IssuerConfig, key: AccountKey, http: Client) -> Result<Self> {
		Ok(Self {
			directory_url: config.directory_url()?,
			skip_tls_verify: config.skip_tls_verify,
			key,
			http,
		})
	}

	/// Directory endpoint the client talks to.
	pub fn directory_url(&self) -> &Url {
		&self.directory_url
	}

	/// Whether TLS verification is disabled for this client.
	pub fn skip_tls_verify(&self) -> bool {
		self.skip_tls_verify
	}

	/// Account key used to sign requests.
	pub fn account_key(&self) -> &AccountKey {
		&self.key
	}

	/// Fetch the directory document.
	#[tracing::instrument(skip(self), fields(directory = %self.directory_url))]
	pub async fn discover(&self) -> Result<Directory> {
		let start = Instant::now();
		let response = match self
			.http
			.get(self.directory_url.clone())
			.header(ACCEPT, "application/json")
			.send()
			.await
		{
			Ok(response) => response,
			Err(err) => {
				metrics::record_http_request(ACTION_DIRECTORY, "error", start.elapsed());

				return Err(err.into());
			},
		};
		let status = response.status();

		metrics::record_http_request(ACTION_DIRECTORY, status.as_str(), start.elapsed());

		if !status.is_success() {
			let body = response.text().await.ok();

			return Err(Error::HttpStatus { status, url: self.directory_url.clone(), body });
		}

		let bytes = response.bytes().await?;
		let directory: Directory = serde_json::from_slice(&bytes)?;

		tracing::debug!(status = %status, elapsed = ?start.elapsed(), "acme directory fetched");

		Ok(directory)
	}
}
