//! Registry telemetry recorded through the `metrics` facade.

// std
#[cfg(feature = "prometheus")] use std::sync::OnceLock;
// crates.io
use metrics::Label;
#[cfg(feature = "prometheus")]
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use smallvec::SmallVec;
// self
use crate::_prelude::*;

type LabelSet = SmallVec<[Label; 2]>;

const METRIC_ENSURE_TOTAL: &str = "acme_client_registry_ensure_total";
const METRIC_REMOVALS_TOTAL: &str = "acme_client_registry_removals_total";
const METRIC_CLIENTS: &str = "acme_client_registry_clients";
const METRIC_HTTP_REQUESTS_TOTAL: &str = "acme_client_http_requests_total";
const METRIC_HTTP_REQUEST_DURATION: &str = "acme_client_http_request_duration_seconds";

/// Shared Prometheus handle installed by [`install_default_exporter`].
#[cfg(feature = "prometheus")]
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Result of a single `ensure_client` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnsureOutcome {
	/// Stored fingerprint matched; the cached client was kept.
	Reused,
	/// No client was registered; a new one was built.
	Created,
	/// A stale client was replaced by a freshly built one.
	Replaced,
	/// Fingerprinting or construction failed; registry state is unchanged.
	Failed,
}
impl EnsureOutcome {
	/// Label value used in exported metrics.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Reused => "reused",
			Self::Created => "created",
			Self::Replaced => "replaced",
			Self::Failed => "failed",
		}
	}
}

/// Install the default Prometheus recorder backed by `metrics`.
///
/// Multiple invocations are safe; subsequent calls become no-ops once the recorder is installed.
#[cfg(feature = "prometheus")]
pub fn install_default_exporter() -> Result<()> {
	if PROMETHEUS_HANDLE.get().is_some() {
		return Ok(());
	}

	let handle = PrometheusBuilder::new().install_recorder()?;
	let _ = PROMETHEUS_HANDLE.set(handle);

	Ok(())
}

/// Access the global Prometheus exporter handle when installed.
#[cfg(feature = "prometheus")]
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
	PROMETHEUS_HANDLE.get()
}

/// Record the outcome of an `ensure_client` call.
pub fn record_ensure(outcome: EnsureOutcome) {
	metrics::counter!(METRIC_ENSURE_TOTAL, outcome_labels(outcome).iter()).increment(1);
}

/// Record the removal of a registered client.
pub fn record_removal() {
	metrics::counter!(METRIC_REMOVALS_TOTAL).increment(1);
}

/// Publish the current number of registered clients.
pub fn record_client_count(count: usize) {
	metrics::gauge!(METRIC_CLIENTS).set(count as f64);
}

/// Record one HTTP exchange performed by an ACME client.
///
/// `status` is the numeric response status, or `"error"` when no response arrived.
pub fn record_http_request(action: &'static str, status: &str, duration: Duration) {
	metrics::counter!(METRIC_HTTP_REQUESTS_TOTAL, request_labels(action, status).iter())
		.increment(1);
	metrics::histogram!(METRIC_HTTP_REQUEST_DURATION, action_labels(action).iter())
		.record(duration.as_secs_f64());
}

fn outcome_labels(outcome: EnsureOutcome) -> LabelSet {
	let mut labels = LabelSet::new();

	labels.push(Label::new("outcome", outcome.as_str()));

	labels
}

fn action_labels(action: &'static str) -> LabelSet {
	let mut labels = LabelSet::new();

	labels.push(Label::new("action", action));

	labels
}

fn request_labels(action: &'static str, status: &str) -> LabelSet {
	let mut labels = action_labels(action);

	labels.push(Label::new("status", status.to_owned()));

	labels
}
