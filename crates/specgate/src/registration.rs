//! Spec registration: validate, persist under the mappings tree, enqueue
//! generation.
//!
//! The generation task is offered only after the spec is durable on disk.
//! When the queue refuses the task, the just-copied mapping file is removed
//! again, so the mappings tree always matches the reported outcome.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use specgate_metrics::MetricsRegistry;
use tracing::{error, info, warn};

use crate::fsutil;
use crate::types::{GenerationTask, RegistrationOutcome};
use crate::validate::SpecValidator;
use crate::worker::GenerationWorker;

pub struct RegistrationService {
    mappings_root: PathBuf,
    worker: Option<Arc<GenerationWorker>>,
    validator: SpecValidator,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl RegistrationService {
    pub fn new(
        mappings_root: PathBuf,
        worker: Option<Arc<GenerationWorker>>,
        validator: SpecValidator,
        metrics: Option<Arc<MetricsRegistry>>,
    ) -> Self {
        Self {
            mappings_root,
            worker,
            validator,
            metrics,
        }
    }

    /// Register `source_path` under `version`. Checks run in order and the
    /// first failure is reported; a successful outcome means the spec is
    /// persisted and (when a worker is attached) generation is queued.
    pub fn register_spec(&self, version: &str, source_path: &Path) -> RegistrationOutcome {
        if let Some(m) = &self.metrics {
            m.record_registration_attempt();
        }

        if version.is_empty() {
            return self.failure(RegistrationOutcome::rejected("Version is required"));
        }

        if !source_path.exists() {
            return self.failure(RegistrationOutcome::rejected(format!(
                "Spec file not found: {}",
                source_path.display()
            )));
        }

        let Ok(bytes) = fsutil::read_file(source_path) else {
            return self.failure(RegistrationOutcome::rejected("Failed to read spec file"));
        };
        let content = String::from_utf8_lossy(&bytes);

        let validation = self.validator.validate(&content);
        if !validation.ok {
            error!(
                spec = %source_path.display(),
                "validation failed: {}",
                validation.message
            );
            if let Some(m) = &self.metrics {
                m.record_registration_validation_failure();
            }
            return self.failure(RegistrationOutcome::rejected(validation.message));
        }

        let target_dir = self.mappings_root.join(version);
        if fsutil::ensure_directory(&target_dir).is_err() {
            return self.failure(RegistrationOutcome::rejected(
                "Unable to create mappings directory",
            ));
        }

        let Some(file_name) = source_path.file_name() else {
            return self.failure(RegistrationOutcome::rejected(format!(
                "Spec file not found: {}",
                source_path.display()
            )));
        };
        let destination = target_dir.join(file_name);
        if fsutil::copy_file_to(source_path, &destination).is_err() {
            return self.failure(RegistrationOutcome::rejected(
                "Failed to persist spec to mappings",
            ));
        }

        info!(spec = %destination.display(), version, "registered spec");

        if let Some(worker) = &self.worker {
            let accepted = worker.enqueue(GenerationTask {
                version: version.to_string(),
                spec_path: destination.clone(),
            });
            if !accepted {
                // Undo the copy so the mappings tree matches the rejection.
                if let Err(e) = std::fs::remove_file(&destination) {
                    warn!(
                        spec = %destination.display(),
                        "failed to remove mapping after queue rejection: {e}"
                    );
                }
                return self.failure(RegistrationOutcome::rejected(
                    "Generation queue is full; try again later",
                ));
            }
        }

        RegistrationOutcome {
            ok: true,
            message: "Registration accepted".to_string(),
            stored_path: Some(destination),
        }
    }

    fn failure(&self, outcome: RegistrationOutcome) -> RegistrationOutcome {
        if let Some(m) = &self.metrics {
            m.record_registration_failure();
        }
        outcome
    }
}
