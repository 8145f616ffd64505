//! ACME account keys and the RSA public material used for client fingerprinting.

// std
use std::fmt::{Debug, Formatter, Result as FmtResult};
// crates.io
use base64::prelude::*;
use jsonwebtoken::{
	EncodingKey,
	jwk::{AlgorithmParameters, Jwk},
};
// self
use crate::_prelude::*;

/// RSA public key components in their literal encoded form.
///
/// The modulus is kept as minimal big-endian octets so equality is a byte-exact comparison rather
/// than a numeric one.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RsaPublicKey {
	modulus: Arc<[u8]>,
	exponent: u64,
}
impl RsaPublicKey {
	/// Build a public key from big-endian modulus octets and the public exponent.
	pub fn new(modulus: impl AsRef<[u8]>, exponent: u64) -> Result<Self> {
		let modulus = strip_leading_zeros(modulus.as_ref());

		if modulus.is_empty() {
			return Err(Error::InvalidKey("RSA modulus must not be zero.".into()));
		}
		if exponent == 0 {
			return Err(Error::InvalidKey("RSA public exponent must not be zero.".into()));
		}

		Ok(Self { modulus: Arc::from(modulus), exponent })
	}

	/// Decode base64url (unpadded) `n`/`e` values as carried in a JWK.
	pub fn from_components(n: &str, e: &str) -> Result<Self> {
		let modulus = decode_b64url("n", n)?;
		let exponent = decode_b64url("e", e)?;

		Self::new(modulus, exponent_from_be(&exponent)?)
	}

	/// Extract the RSA public component from a JWK.
	pub fn from_jwk(jwk: &Jwk) -> Result<Self> {
		match &jwk.algorithm {
			AlgorithmParameters::RSA(params) => Self::from_components(&params.n, &params.e),
			other => Err(Error::InvalidKey(format!(
				"Account keys must be RSA; got {} parameters.",
				key_type_name(other)
			))),
		}
	}

	/// Minimal big-endian modulus octets.
	pub fn modulus(&self) -> &[u8] {
		&self.modulus
	}

	/// Public exponent.
	pub fn exponent(&self) -> u64 {
		self.exponent
	}

	/// Number of significant bits in the modulus.
	pub fn bit_len(&self) -> usize {
		// The modulus is non-empty and starts with a non-zero octet.
		self.modulus.len() * 8 - self.modulus[0].leading_zeros() as usize
	}
}
impl Debug for RsaPublicKey {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("RsaPublicKey")
			.field("modulus_bits", &self.bit_len())
			.field("exponent", &self.exponent)
			.finish()
	}
}

/// ACME account credential: the signing key plus its public JWK.
///
/// The registry reads only the public half for fingerprinting; the whole key is handed to the
/// client factory untouched.
#[derive(Clone)]
pub struct AccountKey {
	signing: EncodingKey,
	public: Jwk,
}
impl AccountKey {
	/// Pair a signing key with its public JWK.
	pub fn new(signing: EncodingKey, public: Jwk) -> Self {
		Self { signing, public }
	}

	/// Load a PEM-encoded RSA private key alongside its public JWK.
	pub fn from_rsa_pem(pem: &[u8], public: Jwk) -> Result<Self> {
		Ok(Self::new(EncodingKey::from_rsa_pem(pem)?, public))
	}

	/// Key used to sign JWS requests.
	pub fn signing_key(&self) -> &EncodingKey {
		&self.signing
	}

	/// Public JWK advertised to the ACME server.
	pub fn public_jwk(&self) -> &Jwk {
		&self.public
	}

	/// Derive the RSA public component, failing for non-RSA or malformed keys.
	pub fn rsa_public_key(&self) -> Result<RsaPublicKey> {
		RsaPublicKey::from_jwk(&self.public)
	}
}
impl Debug for AccountKey {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("AccountKey")
			.field("kid", &self.public.common.key_id)
			.field("kty", &key_type_name(&self.public.algorithm))
			.finish_non_exhaustive()
	}
}

fn decode_b64url(field: &str, value: &str) -> Result<Vec<u8>> {
	let cleaned = value.trim().trim_end_matches('=');

	BASE64_URL_SAFE_NO_PAD
		.decode(cleaned)
		.map_err(|err| Error::InvalidKey(format!("Invalid base64url in `{field}`: {err}.")))
}

fn exponent_from_be(bytes: &[u8]) -> Result<u64> {
	let bytes = strip_leading_zeros(bytes);

	if bytes.len() > 8 {
		return Err(Error::InvalidKey("RSA public exponent exceeds 64 bits.".into()));
	}

	Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

#[inline]
fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
	let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());

	&bytes[start..]
}

fn key_type_name(params: &AlgorithmParameters) -> &'static str {
	match params {
		AlgorithmParameters::RSA(_) => "RSA",
		AlgorithmParameters::EllipticCurve(_) => "EC",
		AlgorithmParameters::OctetKeyPair(_) => "OKP",
		_ => "oct",
	}
}
