use std::path::PathBuf;

use serde::Serialize;

/// One unit of work for the generation queue: materialize the client kit for
/// a spec that was already persisted under the mappings tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTask {
    pub version: String,
    pub spec_path: PathBuf,
}

/// An invokable operation discovered from a kit manifest.
///
/// Identity is `operation_id` alone; two kits declaring the same id collapse
/// to whichever manifest the registry visits last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationDescriptor {
    pub version: String,
    pub kit_name: String,
    pub operation_id: String,
    pub manifest_path: PathBuf,
}

/// Result of a registration attempt. `stored_path` is set only when the spec
/// was persisted under the mappings tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    pub ok: bool,
    pub message: String,
    pub stored_path: Option<PathBuf>,
}

impl RegistrationOutcome {
    pub(crate) fn rejected(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            stored_path: None,
        }
    }
}

/// Point-in-time view of the generation queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    pub queue_depth: usize,
    pub active: usize,
    pub capacity: usize,
    pub running: bool,
    pub stopping: bool,
}

/// Point-in-time view of the runtime registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub operation_count: usize,
    pub last_load_latency_ms: u64,
}
