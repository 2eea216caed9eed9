//! Client kit materialization.
//!
//! A kit directory is `clientkit/<version>/<kit_name>/` where `kit_name` is
//! the spec filename without its extension. The manifest is the authority:
//! a kit directory without `manifest.txt` is invisible to the registry, so
//! the writer can fail partway as long as it removes the directory before
//! reporting the failure.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::fsutil;
use crate::types::GenerationTask;
use crate::worker::KitGenerator;

pub const MANIFEST_FILE: &str = "manifest.txt";
pub const ROUTE_CACHE_FILE: &str = "routes.cache";

/// Operation id substituted when a spec declares none, so a manifest is
/// never operation-empty.
pub const DEFAULT_OPERATION: &str = "default_operation";

/// Writes one kit directory per generation task.
#[derive(Debug, Clone)]
pub struct KitWriter {
    clientkit_root: PathBuf,
}

impl KitWriter {
    pub fn new(clientkit_root: PathBuf) -> Self {
        Self { clientkit_root }
    }

    /// Materialize the kit for `task`. On any failure after the kit
    /// directory was created, the directory is removed before the error is
    /// returned; no half-written kit survives a completed attempt.
    pub fn generate(&self, task: &GenerationTask) -> Result<()> {
        if !task.spec_path.exists() {
            bail!("spec file missing: {}", task.spec_path.display());
        }

        let Some(kit_name) = task.spec_path.file_stem().map(|s| s.to_string_lossy()) else {
            bail!("spec path has no file name: {}", task.spec_path.display());
        };
        let output_dir = self
            .clientkit_root
            .join(&task.version)
            .join(kit_name.as_ref());

        fsutil::ensure_directory(&output_dir)
            .with_context(|| format!("unable to create kit directory {}", output_dir.display()))?;

        // Unreadable content degrades to the default operation rather than
        // failing the task; existence was already checked above.
        let content = fs::read_to_string(&task.spec_path).unwrap_or_default();
        let mut operations = extract_operation_ids(&content);
        if operations.is_empty() {
            operations.push(DEFAULT_OPERATION.to_string());
        }

        let mut manifest = String::new();
        manifest.push_str(&format!("version:{}\n", task.version));
        manifest.push_str(&format!("spec:{}\n", task.spec_path.display()));
        for op in &operations {
            manifest.push_str(&format!("operation:{op}\n"));
        }

        let manifest_path = output_dir.join(MANIFEST_FILE);
        if let Err(e) = fsutil::write_file(&manifest_path, manifest.as_bytes()) {
            let _ = fs::remove_dir_all(&output_dir);
            return Err(e).with_context(|| {
                format!("failed to write manifest for {}", output_dir.display())
            });
        }

        let mut cache = String::new();
        for op in &operations {
            cache.push_str(&format!("{op} -> {kit_name}\n"));
        }

        let cache_path = output_dir.join(ROUTE_CACHE_FILE);
        if let Err(e) = fsutil::write_file(&cache_path, cache.as_bytes()) {
            let _ = fs::remove_dir_all(&output_dir);
            return Err(e).with_context(|| {
                format!("failed to write route cache for {}", output_dir.display())
            });
        }

        debug!(manifest = %manifest_path.display(), "generated client kit");
        Ok(())
    }
}

impl KitGenerator for KitWriter {
    fn generate(&self, task: &GenerationTask) -> Result<()> {
        KitWriter::generate(self, task)
    }
}

/// Scan spec text for `operationId` declarations, line by line.
///
/// A line matches when `operationId` is followed by a `:` on the same line.
/// The value is everything after that colon with surrounding whitespace and
/// quote characters trimmed; values that trim to nothing are skipped. Source
/// order and duplicates are preserved.
pub fn extract_operation_ids(content: &str) -> Vec<String> {
    let mut operations = Vec::new();
    for line in content.lines() {
        let Some(pos) = line.find("operationId") else {
            continue;
        };
        let Some(colon) = line[pos..].find(':') else {
            continue;
        };
        let value = &line[pos + colon + 1..];
        let trimmed = value.trim_matches([' ', '\t', '"', '\'']);
        if !trimmed.is_empty() {
            operations.push(trimmed.to_string());
        }
    }
    operations
}
