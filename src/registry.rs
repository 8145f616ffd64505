//! Shared cache of per-issuer ACME clients.
//!
//! Controllers call [`ClientRegistry::ensure_client`] on every reconciliation; the registry keeps
//! the existing client when its construction fingerprint is unchanged and rebuilds it otherwise.
//! Construction happens under the registry-wide write lock, so concurrent callers never build two
//! clients for the same fingerprint change.

// std
use std::{
	collections::HashMap,
	fmt::{Debug, Formatter, Result as FmtResult},
};
// crates.io
use tokio::sync::RwLock;
// self
use crate::{
	_prelude::*,
	client::{
		acme::HttpAcmeClient,
		factory::{ClientFactory, HttpClientFactory},
	},
	config::IssuerConfig,
	fingerprint::ClientFingerprint,
	key::AccountKey,
	metrics::{self, EnsureOutcome},
};

/// Registry mapping issuer UIDs to their current ACME client.
pub struct ClientRegistry<C> {
	inner: Arc<RwLock<RegistryState<C>>>,
	factory: Arc<dyn ClientFactory<C>>,
}
impl<C> ClientRegistry<C>
where
	C: Send + Sync + 'static,
{
	/// Create an empty registry that builds clients with `factory`.
	pub fn new<F>(factory: F) -> Self
	where
		F: ClientFactory<C> + 'static,
	{
		Self {
			inner: Arc::new(RwLock::new(RegistryState { clients: HashMap::new() })),
			factory: Arc::new(factory),
		}
	}

	/// Read-only handle sharing this registry's storage.
	pub fn reader(&self) -> ClientReader<C> {
		ClientReader { inner: self.inner.clone() }
	}

	/// Ensure the registry holds a client built from exactly `config` and `key`.
	///
	/// A no-op when the stored fingerprint matches. Otherwise a client is built and swapped in; on
	/// failure the previously registered client, if any, stays in place.
	#[tracing::instrument(skip_all, fields(issuer_uid = %issuer_uid))]
	pub async fn ensure_client(
		&self,
		issuer_uid: &str,
		config: &IssuerConfig,
		key: &AccountKey,
	) -> Result<()> {
		let outcome = self.ensure_inner(issuer_uid, config, key).await;

		metrics::record_ensure(*outcome.as_ref().unwrap_or(&EnsureOutcome::Failed));

		outcome.map(|_| ())
	}

	/// Fetch the client registered for `issuer_uid`.
	///
	/// Returns [`Error::NotFound`] when nothing has been registered yet.
	pub async fn get_client(&self, issuer_uid: &str) -> Result<Arc<C>> {
		self.inner.read().await.get(issuer_uid)
	}

	/// Remove the client registered for `issuer_uid`, returning whether one was present.
	///
	/// Removing an unknown issuer is a no-op.
	pub async fn remove_client(&self, issuer_uid: &str) -> bool {
		let mut state = self.inner.write().await;
		let removed = state.clients.remove(issuer_uid).is_some();

		if removed {
			tracing::debug!(issuer_uid, "removed acme client");

			metrics::record_removal();
			metrics::record_client_count(state.clients.len());
		}

		removed
	}

	/// Snapshot of every registered client keyed by issuer UID.
	///
	/// The returned map is detached from the registry; later registry changes do not affect it.
	pub async fn list_clients(&self) -> HashMap<String, Arc<C>> {
		self.inner.read().await.snapshot()
	}

	/// Number of registered clients.
	pub async fn len(&self) -> usize {
		self.inner.read().await.clients.len()
	}

	/// Whether no clients are registered.
	pub async fn is_empty(&self) -> bool {
		self.inner.read().await.clients.is_empty()
	}

	async fn ensure_inner(
		&self,
		issuer_uid: &str,
		config: &IssuerConfig,
		key: &AccountKey,
	) -> Result<EnsureOutcome> {
		validate_issuer_uid(issuer_uid)?;

		let fingerprint = ClientFingerprint::new(issuer_uid, config, key)?;
		// Held across construction so concurrent callers cannot race to build the same client.
		let mut state = self.inner.write().await;

		if let Some(entry) = state.clients.get(issuer_uid)
			&& entry.fingerprint == fingerprint
		{
			tracing::debug!(fingerprint = %fingerprint.digest(), "acme client up to date");

			return Ok(EnsureOutcome::Reused);
		}

		let client = self.factory.build(config, key).map_err(|err| {
			tracing::warn!(error = %err, "failed to build acme client; keeping previous entry");

			Error::ClientConstruction { issuer_uid: issuer_uid.to_owned(), source: Box::new(err) }
		})?;
		let digest = fingerprint.digest();
		let previous = state
			.clients
			.insert(issuer_uid.to_owned(), RegistryEntry { client: Arc::new(client), fingerprint });

		metrics::record_client_count(state.clients.len());

		match previous {
			Some(previous) => {
				tracing::info!(
					previous = %previous.fingerprint.digest(),
					current = %digest,
					"acme client options changed; replaced client"
				);

				Ok(EnsureOutcome::Replaced)
			},
			None => {
				tracing::debug!(fingerprint = %digest, "registered acme client");

				Ok(EnsureOutcome::Created)
			},
		}
	}
}
impl<C> Clone for ClientRegistry<C> {
	fn clone(&self) -> Self {
		Self { inner: self.inner.clone(), factory: self.factory.clone() }
	}
}
impl<C> Debug for ClientRegistry<C> {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("ClientRegistry")
			.field("clients", &self.inner.try_read().map(|state| state.clients.len()).ok())
			.finish_non_exhaustive()
	}
}
impl Default for ClientRegistry<HttpAcmeClient> {
	fn default() -> Self {
		Self::new(HttpClientFactory::default())
	}
}

/// Read-only view of a [`ClientRegistry`] for consumers that never register clients.
pub struct ClientReader<C> {
	inner: Arc<RwLock<RegistryState<C>>>,
}
impl<C> ClientReader<C> {
	/// Fetch the client registered for `issuer_uid`.
	pub async fn get_client(&self, issuer_uid: &str) -> Result<Arc<C>> {
		self.inner.read().await.get(issuer_uid)
	}

	/// Snapshot of every registered client keyed by issuer UID.
	pub async fn list_clients(&self) -> HashMap<String, Arc<C>> {
		self.inner.read().await.snapshot()
	}

	/// Number of registered clients.
	pub async fn len(&self) -> usize {
		self.inner.read().await.clients.len()
	}

	/// Whether no clients are registered.
	pub async fn is_empty(&self) -> bool {
		self.inner.read().await.clients.is_empty()
	}
}
impl<C> Clone for ClientReader<C> {
	fn clone(&self) -> Self {
		Self { inner: self.inner.clone() }
	}
}
impl<C> Debug for ClientReader<C> {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("ClientReader").finish_non_exhaustive()
	}
}

struct RegistryEntry<C> {
	client: Arc<C>,
	fingerprint: ClientFingerprint,
}

struct RegistryState<C> {
	clients: HashMap<String, RegistryEntry<C>>,
}
impl<C> RegistryState<C> {
	fn get(&self, issuer_uid: &str) -> Result<Arc<C>> {
		self.clients
			.get(issuer_uid)
			.map(|entry| entry.client.clone())
			.ok_or_else(|| Error::NotFound { issuer_uid: issuer_uid.to_owned() })
	}

	fn snapshot(&self) -> HashMap<String, Arc<C>> {
		self.clients.iter().map(|(uid, entry)| (uid.clone(), entry.client.clone())).collect()
	}
}

fn validate_issuer_uid(value: &str) -> Result<()> {
	if value.is_empty() {
		return Err(Error::Validation { field: "issuer_uid", reason: "Must not be empty.".into() });
	}

	Ok(())
}
