//! Construction fingerprints used to decide whether a cached client is stale.

// std
use std::fmt::{Debug, Formatter, Result as FmtResult};
// crates.io
use base64::prelude::*;
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, config::IssuerConfig, key::AccountKey};

/// Snapshot of every input that influences how an issuer's client is built.
///
/// Two fingerprints are equal only when every field matches exactly; any difference forces the
/// registry to rebuild the client.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientFingerprint {
	server_url: String,
	skip_tls_verify: bool,
	issuer_uid: String,
	modulus: Arc<[u8]>,
	exponent: u64,
}
impl ClientFingerprint {
	/// Capture the fingerprint for an issuer, failing if the key has no usable RSA public part.
	pub fn new(issuer_uid: &str, config: &IssuerConfig, key: &AccountKey) -> Result<Self> {
		let public = key.rsa_public_key()?;

		Ok(Self {
			server_url: config.server.clone(),
			skip_tls_verify: config.skip_tls_verify,
			issuer_uid: issuer_uid.to_owned(),
			modulus: Arc::from(public.modulus()),
			exponent: public.exponent(),
		})
	}

	/// Issuer UID the fingerprint was captured for.
	pub fn issuer_uid(&self) -> &str {
		&self.issuer_uid
	}

	/// Directory URL exactly as configured.
	pub fn server_url(&self) -> &str {
		&self.server_url
	}

	/// Whether TLS verification was disabled.
	pub fn skip_tls_verify(&self) -> bool {
		self.skip_tls_verify
	}

	/// Short, log-safe digest of the fingerprint.
	///
	/// Only used for diagnostics; equality always compares the full fields.
	pub fn digest(&self) -> String {
		let mut hasher = Sha256::new();

		hasher.update(self.server_url.as_bytes());
		hasher.update([u8::from(self.skip_tls_verify)]);
		hasher.update(self.issuer_uid.as_bytes());
		hasher.update(&self.modulus);
		hasher.update(self.exponent.to_be_bytes());

		let digest = hasher.finalize();

		BASE64_URL_SAFE_NO_PAD.encode(&digest[..9])
	}
}
impl Debug for ClientFingerprint {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("ClientFingerprint")
			.field("issuer_uid", &self.issuer_uid)
			.field("server_url", &self.server_url)
			.field("skip_tls_verify", &self.skip_tls_verify)
			.field("digest", &self.digest())
			.finish()
	}
}
