//! Observability (tracing setup, workflow counters)

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=info";

/// Install the global fmt subscriber, honouring `RUST_LOG`.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    signs_completed: AtomicU64,
    signs_failed: AtomicU64,
    verifications_with_manifest: AtomicU64,
    verifications_without_manifest: AtomicU64,
    sidecar_imports: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_completed(&self) {
        self.signs_completed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "signs_completed", "Metric incremented");
    }

    pub fn sign_failed(&self) {
        self.signs_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "signs_failed", "Metric incremented");
    }

    pub fn verification(&self, has_manifest: bool) {
        let (counter, name) = if has_manifest {
            (&self.verifications_with_manifest, "verifications_with_manifest")
        } else {
            (
                &self.verifications_without_manifest,
                "verifications_without_manifest",
            )
        };
        counter.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = name, "Metric incremented");
    }

    pub fn sidecar_imported(&self) {
        self.sidecar_imports.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "sidecar_imports", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            signs_completed: self.signs_completed.load(Ordering::Relaxed),
            signs_failed: self.signs_failed.load(Ordering::Relaxed),
            verifications_with_manifest: self.verifications_with_manifest.load(Ordering::Relaxed),
            verifications_without_manifest: self
                .verifications_without_manifest
                .load(Ordering::Relaxed),
            sidecar_imports: self.sidecar_imports.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub signs_completed: u64,
    pub signs_failed: u64,
    pub verifications_with_manifest: u64,
    pub verifications_without_manifest: u64,
    pub sidecar_imports: u64,
}
