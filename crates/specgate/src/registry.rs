//! Operation index over the on-disk kit tree.
//!
//! `load` rebuilds the index from scratch: every direct child of the kit
//! root is a version directory, every grandchild a kit directory, and a kit
//! counts only if its manifest exists. The registry never watches the
//! filesystem between loads; callers reload whenever they want fresh state.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use specgate_metrics::MetricsRegistry;
use tracing::info;

use crate::kit::MANIFEST_FILE;
use crate::types::{OperationDescriptor, RegistryStats};

const OPERATION_PREFIX: &str = "operation:";

pub struct RuntimeRegistry {
    clientkit_root: PathBuf,
    operations: HashMap<String, OperationDescriptor>,
    last_load_latency_ms: u64,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl RuntimeRegistry {
    pub fn new(clientkit_root: PathBuf, metrics: Option<Arc<MetricsRegistry>>) -> Self {
        Self {
            clientkit_root,
            operations: HashMap::new(),
            last_load_latency_ms: 0,
            metrics,
        }
    }

    /// Rebuild the index from the kit tree. Fully replaces previous state;
    /// directory traversal order decides which kit wins a duplicate
    /// operation id.
    pub fn load(&mut self) {
        let started = Instant::now();
        self.operations.clear();

        if self.clientkit_root.exists() {
            self.scan_kit_tree();
        } else {
            info!(root = %self.clientkit_root.display(), "no clientkit directory found");
        }

        self.last_load_latency_ms = started.elapsed().as_millis() as u64;
        if let Some(m) = &self.metrics {
            m.record_registry_load(self.last_load_latency_ms);
        }
        info!(
            operations = self.operations.len(),
            "loaded operations from client kits"
        );
    }

    fn scan_kit_tree(&mut self) {
        let Ok(versions) = fs::read_dir(&self.clientkit_root) else {
            return;
        };
        for version_entry in versions.flatten() {
            let version_path = version_entry.path();
            if !version_path.is_dir() {
                continue;
            }
            let version = version_entry.file_name().to_string_lossy().to_string();

            let Ok(kits) = fs::read_dir(&version_path) else {
                continue;
            };
            for kit_entry in kits.flatten() {
                let kit_path = kit_entry.path();
                if !kit_path.is_dir() {
                    continue;
                }
                let manifest_path = kit_path.join(MANIFEST_FILE);
                if !manifest_path.exists() {
                    // Partially-written kit; the manifest is the marker of a
                    // complete one.
                    continue;
                }
                let kit_name = kit_entry.file_name().to_string_lossy().to_string();
                self.index_manifest(&version, &kit_name, &manifest_path);
            }
        }
    }

    fn index_manifest(&mut self, version: &str, kit_name: &str, manifest_path: &Path) {
        let Ok(content) = fs::read_to_string(manifest_path) else {
            return;
        };
        for line in content.lines() {
            if let Some(op_id) = line.strip_prefix(OPERATION_PREFIX) {
                self.operations.insert(
                    op_id.to_string(),
                    OperationDescriptor {
                        version: version.to_string(),
                        kit_name: kit_name.to_string(),
                        operation_id: op_id.to_string(),
                        manifest_path: manifest_path.to_path_buf(),
                    },
                );
            }
        }
    }

    /// Snapshot copy of the current index values.
    pub fn list_operations(&self) -> Vec<OperationDescriptor> {
        self.operations.values().cloned().collect()
    }

    pub fn find_operation(&self, operation_id: &str) -> Option<&OperationDescriptor> {
        self.operations.get(operation_id)
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            operation_count: self.operations.len(),
            last_load_latency_ms: self.last_load_latency_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_manifest(root: &std::path::Path, version: &str, kit: &str, operations: &[&str]) {
        let dir = root.join(version).join(kit);
        fs::create_dir_all(&dir).expect("mkdir");
        let mut content = format!("version:{version}\nspec:/tmp/{kit}.yaml\n");
        for op in operations {
            content.push_str(&format!("operation:{op}\n"));
        }
        fs::write(dir.join(MANIFEST_FILE), content).expect("write manifest");
    }

    #[test]
    fn load_on_missing_root_yields_empty_index() {
        let td = tempdir().expect("tempdir");
        let mut registry = RuntimeRegistry::new(td.path().join("absent"), None);
        registry.load();
        assert!(registry.list_operations().is_empty());
        assert_eq!(registry.stats().operation_count, 0);
    }

    #[test]
    fn load_indexes_operations_per_kit() {
        let td = tempdir().expect("tempdir");
        let root = td.path().join("clientkit");
        write_manifest(&root, "v1", "pets", &["listPets", "createPet"]);
        write_manifest(&root, "v2", "orders", &["listOrders"]);

        let mut registry = RuntimeRegistry::new(root.clone(), None);
        registry.load();

        assert_eq!(registry.stats().operation_count, 3);
        let op = registry.find_operation("listOrders").expect("found");
        assert_eq!(op.version, "v2");
        assert_eq!(op.kit_name, "orders");
        assert_eq!(op.manifest_path, root.join("v2/orders").join(MANIFEST_FILE));
    }

    #[test]
    fn kits_without_manifest_are_skipped() {
        let td = tempdir().expect("tempdir");
        let root = td.path().join("clientkit");
        write_manifest(&root, "v1", "good", &["goodOp"]);
        fs::create_dir_all(root.join("v1/half-written")).expect("mkdir");

        let mut registry = RuntimeRegistry::new(root, None);
        registry.load();

        assert_eq!(registry.stats().operation_count, 1);
        assert!(registry.find_operation("goodOp").is_some());
    }

    #[test]
    fn kit_without_route_cache_is_still_indexed() {
        let td = tempdir().expect("tempdir");
        let root = td.path().join("clientkit");
        write_manifest(&root, "v1", "cacheless", &["soloOp"]);

        let mut registry = RuntimeRegistry::new(root, None);
        registry.load();
        assert!(registry.find_operation("soloOp").is_some());
    }

    #[test]
    fn stray_files_in_the_tree_are_ignored() {
        let td = tempdir().expect("tempdir");
        let root = td.path().join("clientkit");
        write_manifest(&root, "v1", "real", &["realOp"]);
        fs::write(root.join("notes.txt"), "not a version").expect("write");
        fs::write(root.join("v1/readme.md"), "not a kit").expect("write");

        let mut registry = RuntimeRegistry::new(root, None);
        registry.load();
        assert_eq!(registry.stats().operation_count, 1);
    }

    #[test]
    fn duplicate_operation_ids_collapse_to_one_entry() {
        let td = tempdir().expect("tempdir");
        let root = td.path().join("clientkit");
        write_manifest(&root, "v1", "alpha", &["sharedOp"]);
        write_manifest(&root, "v2", "beta", &["sharedOp"]);

        let mut registry = RuntimeRegistry::new(root, None);
        registry.load();

        // Which kit wins depends on traversal order; only uniqueness is
        // guaranteed.
        assert_eq!(registry.stats().operation_count, 1);
        assert!(registry.find_operation("sharedOp").is_some());
    }

    #[test]
    fn reload_is_idempotent() {
        let td = tempdir().expect("tempdir");
        let root = td.path().join("clientkit");
        write_manifest(&root, "v1", "pets", &["listPets", "createPet"]);

        let mut registry = RuntimeRegistry::new(root, None);
        registry.load();
        let mut first: Vec<OperationDescriptor> = registry.list_operations();
        registry.load();
        let mut second: Vec<OperationDescriptor> = registry.list_operations();

        first.sort_by(|a, b| a.operation_id.cmp(&b.operation_id));
        second.sort_by(|a, b| a.operation_id.cmp(&b.operation_id));
        assert_eq!(first, second);
    }

    #[test]
    fn reload_drops_operations_for_removed_kits() {
        let td = tempdir().expect("tempdir");
        let root = td.path().join("clientkit");
        write_manifest(&root, "v1", "pets", &["listPets"]);

        let mut registry = RuntimeRegistry::new(root.clone(), None);
        registry.load();
        assert!(registry.find_operation("listPets").is_some());

        fs::remove_dir_all(root.join("v1")).expect("remove");
        registry.load();
        assert!(registry.find_operation("listPets").is_none());
    }

    #[test]
    fn load_records_metrics() {
        let td = tempdir().expect("tempdir");
        let metrics = Arc::new(MetricsRegistry::new());
        let mut registry =
            RuntimeRegistry::new(td.path().join("clientkit"), Some(Arc::clone(&metrics)));
        registry.load();
        registry.load();

        let s = metrics.snapshot();
        assert_eq!(s.registry_loads, 2);
        assert_eq!(s.registry_load_latency_samples, 2);
    }
}
