//! Counter sink for gateway instrumentation.
//!
//! This crate provides a process-lived registry of monotonic counters and
//! running latency sums. Writers call the `record_*` methods from any thread;
//! readers take a [`MetricsSnapshot`] or render the text form.
//!
//! Counters are independently atomic: a snapshot is consistent per counter
//! but not across counters while writers are active.
//!
//! # Example
//!
//! ```
//! use specgate_metrics::MetricsRegistry;
//!
//! let metrics = MetricsRegistry::new();
//! metrics.record_registration_attempt();
//! metrics.record_registry_load(12);
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.registrations_total, 1);
//! assert_eq!(snapshot.registry_load_latency_ms_total, 12);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Monotonic counters for every gateway operation.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    registrations_total: AtomicU64,
    registrations_failed: AtomicU64,
    registrations_validation_failed: AtomicU64,
    generation_enqueued: AtomicU64,
    generation_queue_full: AtomicU64,
    generation_success: AtomicU64,
    generation_failure: AtomicU64,
    generation_latency_ms_total: AtomicU64,
    generation_latency_samples: AtomicU64,
    registry_loads: AtomicU64,
    registry_load_latency_ms_total: AtomicU64,
    registry_load_latency_samples: AtomicU64,
    list_requests: AtomicU64,
    execute_requests: AtomicU64,
    execute_success: AtomicU64,
    execute_not_found: AtomicU64,
    execute_rejected: AtomicU64,
    execute_latency_ms_total: AtomicU64,
    execute_latency_samples: AtomicU64,
}

/// Point-in-time copy of every counter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub registrations_total: u64,
    pub registrations_failed: u64,
    pub registrations_validation_failed: u64,
    pub generation_enqueued: u64,
    pub generation_queue_full: u64,
    pub generation_success: u64,
    pub generation_failure: u64,
    pub generation_latency_ms_total: u64,
    pub generation_latency_samples: u64,
    pub registry_loads: u64,
    pub registry_load_latency_ms_total: u64,
    pub registry_load_latency_samples: u64,
    pub list_requests: u64,
    pub execute_requests: u64,
    pub execute_success: u64,
    pub execute_not_found: u64,
    pub execute_rejected: u64,
    pub execute_latency_ms_total: u64,
    pub execute_latency_samples: u64,
}

impl MetricsRegistry {
    /// Create a registry with every counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_registration_attempt(&self) {
        self.registrations_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_registration_failure(&self) {
        self.registrations_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_registration_validation_failure(&self) {
        self.registrations_validation_failed
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generation_enqueued(&self) {
        self.generation_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generation_queue_full(&self) {
        self.generation_queue_full.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generation_success(&self) {
        self.generation_success.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generation_failure(&self) {
        self.generation_failure.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generation_latency_ms(&self, duration_ms: u64) {
        self.generation_latency_ms_total
            .fetch_add(duration_ms, Ordering::Relaxed);
        self.generation_latency_samples
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_registry_load(&self, duration_ms: u64) {
        self.registry_loads.fetch_add(1, Ordering::Relaxed);
        self.registry_load_latency_ms_total
            .fetch_add(duration_ms, Ordering::Relaxed);
        self.registry_load_latency_samples
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_list_request(&self) {
        self.list_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_execute_request(&self) {
        self.execute_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_execute_success(&self) {
        self.execute_success.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_execute_not_found(&self) {
        self.execute_not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_execute_rejected(&self) {
        self.execute_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_execute_latency_ms(&self, duration_ms: u64) {
        self.execute_latency_ms_total
            .fetch_add(duration_ms, Ordering::Relaxed);
        self.execute_latency_samples.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy every counter value.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            registrations_total: self.registrations_total.load(Ordering::Relaxed),
            registrations_failed: self.registrations_failed.load(Ordering::Relaxed),
            registrations_validation_failed: self
                .registrations_validation_failed
                .load(Ordering::Relaxed),
            generation_enqueued: self.generation_enqueued.load(Ordering::Relaxed),
            generation_queue_full: self.generation_queue_full.load(Ordering::Relaxed),
            generation_success: self.generation_success.load(Ordering::Relaxed),
            generation_failure: self.generation_failure.load(Ordering::Relaxed),
            generation_latency_ms_total: self.generation_latency_ms_total.load(Ordering::Relaxed),
            generation_latency_samples: self.generation_latency_samples.load(Ordering::Relaxed),
            registry_loads: self.registry_loads.load(Ordering::Relaxed),
            registry_load_latency_ms_total: self
                .registry_load_latency_ms_total
                .load(Ordering::Relaxed),
            registry_load_latency_samples: self
                .registry_load_latency_samples
                .load(Ordering::Relaxed),
            list_requests: self.list_requests.load(Ordering::Relaxed),
            execute_requests: self.execute_requests.load(Ordering::Relaxed),
            execute_success: self.execute_success.load(Ordering::Relaxed),
            execute_not_found: self.execute_not_found.load(Ordering::Relaxed),
            execute_rejected: self.execute_rejected.load(Ordering::Relaxed),
            execute_latency_ms_total: self.execute_latency_ms_total.load(Ordering::Relaxed),
            execute_latency_samples: self.execute_latency_samples.load(Ordering::Relaxed),
        }
    }

    /// Render the text form: one `<name> <value>` line per counter, with
    /// latency sums followed by their `_count` companion.
    pub fn render(&self) -> String {
        let s = self.snapshot();
        let mut out = String::new();
        let mut line = |name: &str, value: u64| {
            out.push_str(name);
            out.push(' ');
            out.push_str(&value.to_string());
            out.push('\n');
        };
        line("gateway_registrations_total", s.registrations_total);
        line("gateway_registrations_failed_total", s.registrations_failed);
        line(
            "gateway_registrations_validation_failed_total",
            s.registrations_validation_failed,
        );
        line("gateway_generation_enqueued_total", s.generation_enqueued);
        line(
            "gateway_generation_queue_full_total",
            s.generation_queue_full,
        );
        line("gateway_generation_success_total", s.generation_success);
        line("gateway_generation_failure_total", s.generation_failure);
        line(
            "gateway_generation_latency_ms_total",
            s.generation_latency_ms_total,
        );
        line(
            "gateway_generation_latency_ms_count",
            s.generation_latency_samples,
        );
        line("gateway_registry_loads_total", s.registry_loads);
        line(
            "gateway_registry_load_latency_ms_total",
            s.registry_load_latency_ms_total,
        );
        line(
            "gateway_registry_load_latency_ms_count",
            s.registry_load_latency_samples,
        );
        line("gateway_list_requests_total", s.list_requests);
        line("gateway_execute_requests_total", s.execute_requests);
        line("gateway_execute_success_total", s.execute_success);
        line("gateway_execute_not_found_total", s.execute_not_found);
        line("gateway_execute_rejected_total", s.execute_rejected);
        line(
            "gateway_execute_latency_ms_total",
            s.execute_latency_ms_total,
        );
        line(
            "gateway_execute_latency_ms_count",
            s.execute_latency_samples,
        );
        out
    }
}
