//! Integration coverage for the ACME client registry.

mod concurrency;

// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
	time::Duration,
};
// crates.io
use acme_client_registry::{AccountKey, ClientFactory, Error, IssuerConfig, Result};
use base64::prelude::*;
use jsonwebtoken::{EncodingKey, jwk::Jwk};

pub const LETSENCRYPT_STAGING: &str = "https://acme-staging-v02.api.letsencrypt.org/directory";
pub const LETSENCRYPT_PRODUCTION: &str = "https://acme-v02.api.letsencrypt.org/directory";

/// Client double recording the inputs it was built from.
#[derive(Debug)]
pub struct RecordingClient {
	pub build_id: usize,
	pub server: String,
	pub skip_tls_verify: bool,
	pub modulus: Vec<u8>,
	pub exponent: u64,
}

/// Factory double counting constructions, optionally slow or failing.
#[derive(Clone, Debug, Default)]
pub struct CountingFactory {
	builds: Arc<AtomicUsize>,
	fail: Arc<AtomicBool>,
	delay: Duration,
}
impl CountingFactory {
	pub fn with_delay(delay: Duration) -> Self {
		Self { delay, ..Self::default() }
	}

	pub fn builds(&self) -> usize {
		self.builds.load(Ordering::SeqCst)
	}

	pub fn set_failing(&self, fail: bool) {
		self.fail.store(fail, Ordering::SeqCst);
	}
}
impl ClientFactory<RecordingClient> for CountingFactory {
	fn build(&self, config: &IssuerConfig, key: &AccountKey) -> Result<RecordingClient> {
		if self.fail.load(Ordering::SeqCst) {
			return Err(Error::Validation { field: "server", reason: "simulated outage".into() });
		}
		if !self.delay.is_zero() {
			std::thread::sleep(self.delay);
		}

		let public = key.rsa_public_key()?;
		let build_id = self.builds.fetch_add(1, Ordering::SeqCst) + 1;

		Ok(RecordingClient {
			build_id,
			server: config.server.clone(),
			skip_tls_verify: config.skip_tls_verify,
			modulus: public.modulus().to_vec(),
			exponent: public.exponent(),
		})
	}
}

pub fn rsa_jwk(n: &[u8], e: &[u8]) -> Jwk {
	serde_json::from_value(serde_json::json!({
		"kty": "RSA",
		"kid": "account",
		"n": BASE64_URL_SAFE_NO_PAD.encode(n),
		"e": BASE64_URL_SAFE_NO_PAD.encode(e),
	}))
	.expect("valid RSA jwk")
}

pub fn account_key(n: &[u8], e: &[u8]) -> AccountKey {
	AccountKey::new(EncodingKey::from_rsa_der(b"test-only-der"), rsa_jwk(n, e))
}

pub fn default_key() -> AccountKey {
	account_key(&[0xB7; 256], &[0x01, 0x00, 0x01])
}

pub fn issuer(server: &str) -> IssuerConfig {
	IssuerConfig::new(server).expect("valid issuer config")
}
