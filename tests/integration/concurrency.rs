//! Concurrent access to a shared registry.

// std
use std::{sync::Arc, time::Duration};
// crates.io
use acme_client_registry::{ClientRegistry, Result};
use tokio::task::JoinSet;
// self
use crate::*;

/// Number of concurrent tasks racing on the registry.
const CONCURRENCY: usize = 32;

/// Simultaneous identical `ensure_client` calls must build exactly one client.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_identical_ensures_build_once() -> Result<()> {
	let _ = tracing_subscriber::fmt::try_init();
	let factory = CountingFactory::with_delay(Duration::from_millis(20));
	let registry: ClientRegistry<RecordingClient> = ClientRegistry::new(factory.clone());
	let config = issuer(LETSENCRYPT_STAGING);
	let key = default_key();
	let mut set = JoinSet::new();

	for _ in 0..CONCURRENCY {
		let registry = registry.clone();
		let config = config.clone();
		let key = key.clone();

		set.spawn(async move { registry.ensure_client("issuer-a", &config, &key).await });
	}

	while let Some(result) = set.join_next().await {
		result.expect("task should not panic")?;
	}

	assert_eq!(factory.builds(), 1);
	assert_eq!(registry.get_client("issuer-a").await?.build_id, 1);
	assert_eq!(registry.len().await, 1);

	Ok(())
}

/// Readers keep observing a complete client while a writer flips the configuration.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn readers_never_observe_torn_entries() -> Result<()> {
	let factory = CountingFactory::default();
	let registry: ClientRegistry<RecordingClient> = ClientRegistry::new(factory.clone());
	let key = default_key();
	let configs = [issuer(LETSENCRYPT_STAGING), issuer(LETSENCRYPT_PRODUCTION)];

	registry.ensure_client("issuer-a", &configs[0], &key).await?;

	let mut readers = JoinSet::new();

	for _ in 0..CONCURRENCY {
		let reader = registry.reader();

		readers.spawn(async move {
			for _ in 0..100 {
				let client = reader.get_client("issuer-a").await.expect("client stays registered");

				assert!(
					client.server == LETSENCRYPT_STAGING || client.server == LETSENCRYPT_PRODUCTION
				);

				let snapshot = reader.list_clients().await;

				assert_eq!(snapshot.len(), 1);

				tokio::task::yield_now().await;
			}
		});
	}

	for round in 1..=50 {
		registry.ensure_client("issuer-a", &configs[round % 2], &key).await?;
	}

	while let Some(result) = readers.join_next().await {
		result.expect("reader should not panic");
	}

	let last = registry.get_client("issuer-a").await?;

	assert_eq!(factory.builds(), 51);
	assert_eq!(last.server, LETSENCRYPT_STAGING);
	assert_eq!(last.build_id, 51);

	Ok(())
}

/// Distinct issuers ensured concurrently each get exactly one client.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_distinct_issuers_are_all_registered() -> Result<()> {
	let factory = CountingFactory::default();
	let registry: ClientRegistry<RecordingClient> = ClientRegistry::new(factory.clone());
	let config = issuer(LETSENCRYPT_STAGING);
	let key = default_key();
	let mut set = JoinSet::new();

	for task in 0..CONCURRENCY {
		let registry = registry.clone();
		let config = config.clone();
		let key = key.clone();

		set.spawn(async move {
			let uid = format!("issuer-{task}");

			// Each issuer is ensured twice; only the first call builds.
			registry.ensure_client(&uid, &config, &key).await?;
			registry.ensure_client(&uid, &config, &key).await
		});
	}

	while let Some(result) = set.join_next().await {
		result.expect("task should not panic")?;
	}

	let clients = registry.list_clients().await;

	assert_eq!(factory.builds(), CONCURRENCY);
	assert_eq!(clients.len(), CONCURRENCY);
	assert!(clients.values().all(|client| Arc::strong_count(client) >= 2));

	Ok(())
}
