//! List/execute façade over the runtime registry.
//!
//! The registry is not internally synchronized, so it lives behind the
//! dispatcher's mutex: every request reloads and reads under that lock.
//! Execution is gated by an inflight counter with a hard ceiling; the
//! check-and-increment is atomic under its own mutex and the counter is
//! decremented on every exit path.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use specgate_metrics::MetricsRegistry;
use tracing::warn;

use crate::registry::RuntimeRegistry;
use crate::types::RegistryStats;

pub const DEFAULT_MAX_CONCURRENT_OPS: usize = 8;

pub struct Dispatcher {
    registry: Mutex<RuntimeRegistry>,
    active: Mutex<usize>,
    max_concurrent: usize,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl Dispatcher {
    pub fn new(
        registry: RuntimeRegistry,
        max_concurrent: usize,
        metrics: Option<Arc<MetricsRegistry>>,
    ) -> Self {
        Self {
            registry: Mutex::new(registry),
            active: Mutex::new(0),
            max_concurrent,
            metrics,
        }
    }

    /// Reload the registry and render one line per known operation.
    pub fn list_operations(&self) -> String {
        if let Some(m) = &self.metrics {
            m.record_list_request();
        }
        let mut registry = self.registry.lock().unwrap();
        registry.load();

        let mut out = String::new();
        for op in registry.list_operations() {
            out.push_str(&format!(
                "{} (version: {}, kit: {})\n",
                op.operation_id, op.version, op.kit_name
            ));
        }
        out
    }

    /// Execute `operation_id` with `payload` against the freshest index.
    /// Returns a human-readable response in every case: executed, unknown
    /// operation, or rejection by the concurrency gate.
    pub fn execute_operation(&self, operation_id: &str, payload: &str) -> String {
        if let Some(m) = &self.metrics {
            m.record_execute_request();
        }

        {
            let mut active = self.active.lock().unwrap();
            if *active >= self.max_concurrent {
                if let Some(m) = &self.metrics {
                    m.record_execute_rejected();
                }
                warn!(operation_id, inflight = *active, "execute rejected");
                return "Backpressure: too many concurrent operations".to_string();
            }
            *active += 1;
        }

        let started = Instant::now();
        let found = {
            let mut registry = self.registry.lock().unwrap();
            registry.load();
            registry.find_operation(operation_id).cloned()
        };

        let response = match found {
            Some(op) => {
                if let Some(m) = &self.metrics {
                    m.record_execute_success();
                }
                format!(
                    "Executed {} for version {} with payload: {}",
                    op.operation_id, op.version, payload
                )
            }
            None => {
                if let Some(m) = &self.metrics {
                    m.record_execute_not_found();
                }
                format!("Operation not found: {operation_id}")
            }
        };

        if let Some(m) = &self.metrics {
            m.record_execute_latency_ms(started.elapsed().as_millis() as u64);
        }
        *self.active.lock().unwrap() -= 1;
        response
    }

    /// Reload the registry and report its stats.
    pub fn registry_stats(&self) -> RegistryStats {
        let mut registry = self.registry.lock().unwrap();
        registry.load();
        registry.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn seeded_dispatcher(
        root: &std::path::Path,
        max_concurrent: usize,
        metrics: Option<Arc<MetricsRegistry>>,
    ) -> Dispatcher {
        let dir = root.join("v1/pets");
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(
            dir.join(crate::kit::MANIFEST_FILE),
            "version:v1\nspec:/tmp/pets.yaml\noperation:listPets\n",
        )
        .expect("write manifest");
        let registry = RuntimeRegistry::new(root.to_path_buf(), metrics.clone());
        Dispatcher::new(registry, max_concurrent, metrics)
    }

    #[test]
    fn list_renders_one_line_per_operation() {
        let td = tempdir().expect("tempdir");
        let dispatcher = seeded_dispatcher(&td.path().join("clientkit"), 4, None);
        assert_eq!(
            dispatcher.list_operations(),
            "listPets (version: v1, kit: pets)\n"
        );
    }

    #[test]
    fn execute_known_operation_echoes_payload() {
        let td = tempdir().expect("tempdir");
        let dispatcher = seeded_dispatcher(&td.path().join("clientkit"), 4, None);
        assert_eq!(
            dispatcher.execute_operation("listPets", "{\"limit\":3}"),
            "Executed listPets for version v1 with payload: {\"limit\":3}"
        );
    }

    #[test]
    fn execute_unknown_operation_reports_not_found() {
        let td = tempdir().expect("tempdir");
        let dispatcher = seeded_dispatcher(&td.path().join("clientkit"), 4, None);
        assert_eq!(
            dispatcher.execute_operation("nope", "{}"),
            "Operation not found: nope"
        );
    }

    #[test]
    fn execute_sees_kits_generated_after_construction() {
        let td = tempdir().expect("tempdir");
        let root = td.path().join("clientkit");
        let dispatcher = seeded_dispatcher(&root, 4, None);

        let dir = root.join("v2/orders");
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(
            dir.join(crate::kit::MANIFEST_FILE),
            "version:v2\nspec:/tmp/orders.yaml\noperation:listOrders\n",
        )
        .expect("write manifest");

        assert_eq!(
            dispatcher.execute_operation("listOrders", "{}"),
            "Executed listOrders for version v2 with payload: {}"
        );
    }

    #[test]
    fn execute_at_the_concurrency_ceiling_is_rejected() {
        let td = tempdir().expect("tempdir");
        let metrics = Arc::new(MetricsRegistry::new());
        let dispatcher =
            seeded_dispatcher(&td.path().join("clientkit"), 2, Some(Arc::clone(&metrics)));

        // Pin the inflight counter at the ceiling, as if two executes were
        // mid-flight.
        *dispatcher.active.lock().unwrap() = 2;
        assert_eq!(
            dispatcher.execute_operation("listPets", "{}"),
            "Backpressure: too many concurrent operations"
        );
        assert_eq!(metrics.snapshot().execute_rejected, 1);

        // Once inflight work completes, admission reopens.
        *dispatcher.active.lock().unwrap() = 1;
        assert_eq!(
            dispatcher.execute_operation("listPets", "{}"),
            "Executed listPets for version v1 with payload: {}"
        );
        assert_eq!(*dispatcher.active.lock().unwrap(), 1);
    }

    #[test]
    fn zero_concurrency_rejects_everything() {
        let td = tempdir().expect("tempdir");
        let dispatcher = seeded_dispatcher(&td.path().join("clientkit"), 0, None);
        assert_eq!(
            dispatcher.execute_operation("listPets", "{}"),
            "Backpressure: too many concurrent operations"
        );
    }

    #[test]
    fn counter_returns_to_zero_on_both_exit_paths() {
        let td = tempdir().expect("tempdir");
        let dispatcher = seeded_dispatcher(&td.path().join("clientkit"), 4, None);
        let _ = dispatcher.execute_operation("listPets", "{}");
        let _ = dispatcher.execute_operation("nope", "{}");
        assert_eq!(*dispatcher.active.lock().unwrap(), 0);
    }

    #[test]
    fn metrics_cover_list_and_execute_outcomes() {
        let td = tempdir().expect("tempdir");
        let metrics = Arc::new(MetricsRegistry::new());
        let dispatcher =
            seeded_dispatcher(&td.path().join("clientkit"), 4, Some(Arc::clone(&metrics)));

        let _ = dispatcher.list_operations();
        let _ = dispatcher.execute_operation("listPets", "{}");
        let _ = dispatcher.execute_operation("nope", "{}");

        let s = metrics.snapshot();
        assert_eq!(s.list_requests, 1);
        assert_eq!(s.execute_requests, 2);
        assert_eq!(s.execute_success, 1);
        assert_eq!(s.execute_not_found, 1);
        assert_eq!(s.execute_latency_samples, 2);
        // Every request reloads the registry.
        assert_eq!(s.registry_loads, 3);
    }

    #[test]
    fn concurrent_executes_settle_and_readmit() {
        let td = tempdir().expect("tempdir");
        let dispatcher = Arc::new(seeded_dispatcher(&td.path().join("clientkit"), 1, None));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dispatcher = Arc::clone(&dispatcher);
                std::thread::spawn(move || dispatcher.execute_operation("listPets", "{}"))
            })
            .collect();
        for h in handles {
            let response = h.join().expect("join");
            assert!(
                response.starts_with("Executed listPets")
                    || response == "Backpressure: too many concurrent operations"
            );
        }

        // Quiescent again: the gate readmits.
        assert_eq!(
            dispatcher.execute_operation("listPets", "{}"),
            "Executed listPets for version v1 with payload: {}"
        );
    }
}
