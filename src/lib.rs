//! Concurrency-safe registry of per-issuer ACME clients that rebuilds a client only when the
//! inputs it was constructed from change.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod client;
pub mod config;
pub mod fingerprint;
pub mod key;
pub mod metrics;

mod error;
mod registry;
mod _prelude {
	pub use std::{
		sync::Arc,
		time::{Duration, Instant},
	};

	pub use crate::{Error, Result};
}

#[cfg(feature = "prometheus")] pub use crate::metrics::install_default_exporter;
pub use crate::{
	client::{
		acme::{Directory, DirectoryMeta, HttpAcmeClient},
		factory::{ClientFactory, HttpClientFactory, HttpClientFactoryBuilder},
	},
	config::{IssuerConfig, TransportSettings},
	error::{Error, Result},
	fingerprint::ClientFingerprint,
	key::{AccountKey, RsaPublicKey},
	registry::{ClientReader, ClientRegistry},
};
