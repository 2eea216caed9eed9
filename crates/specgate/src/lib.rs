//! # Specgate
//!
//! A local gateway that registers API specifications, materializes
//! per-version client kits on disk, and dispatches the operations those kits
//! declare.
//!
//! ## Pipeline
//!
//! The core flow is **register → generate → discover → dispatch**:
//!
//! 1. [`registration::RegistrationService`] validates an incoming spec,
//!    copies it under `mappings/<version>/`, and offers a task to the
//!    generation queue.
//! 2. [`worker::GenerationWorker`] consumes tasks in FIFO order on a single
//!    background thread, retrying failed attempts with linear backoff.
//! 3. [`kit::KitWriter`] writes `clientkit/<version>/<kit>/manifest.txt` and
//!    `routes.cache`, removing the kit directory if any step fails partway.
//! 4. [`registry::RuntimeRegistry`] rebuilds the operation index from the
//!    kit tree on every load; [`dispatcher::Dispatcher`] serves list and
//!    execute requests against it under a bounded-concurrency gate.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//! use std::sync::Arc;
//!
//! use specgate::dispatcher::Dispatcher;
//! use specgate::kit::KitWriter;
//! use specgate::registration::RegistrationService;
//! use specgate::registry::RuntimeRegistry;
//! use specgate::validate::SpecValidator;
//! use specgate::worker::GenerationWorker;
//!
//! let writer = Arc::new(KitWriter::new(PathBuf::from("clientkit")));
//! let worker = Arc::new(GenerationWorker::new(writer, 3, 32, None));
//! worker.start();
//!
//! let registration = RegistrationService::new(
//!     PathBuf::from("mappings"),
//!     Some(Arc::clone(&worker)),
//!     SpecValidator::default(),
//!     None,
//! );
//! let outcome = registration.register_spec("v1", Path::new("petstore.yaml"));
//! assert!(outcome.ok);
//! worker.wait_for_idle();
//! worker.stop();
//!
//! let registry = RuntimeRegistry::new(PathBuf::from("clientkit"), None);
//! let dispatcher = Dispatcher::new(registry, 8, None);
//! println!("{}", dispatcher.list_operations());
//! ```
//!
//! ## Modules
//!
//! - [`registration`] — spec validation, persistence, and enqueueing
//! - [`worker`] — bounded FIFO queue with a retrying background worker
//! - [`kit`] — client kit materialization and operation-id extraction
//! - [`registry`] — operation index rebuilt from the kit tree
//! - [`dispatcher`] — list/execute façade with admission control
//! - [`validate`] — surface checks for incoming specs
//! - [`config`] — runtime knobs with environment overrides
//! - [`fsutil`] — filesystem primitives shared by the pipeline
//! - [`logging`] — tracing subscriber setup from the environment
//! - [`types`] — domain types: tasks, descriptors, outcomes, stats

/// Runtime knobs with environment overrides.
pub mod config;

/// List/execute façade with admission control.
pub mod dispatcher;

/// Filesystem primitives shared by the pipeline.
pub mod fsutil;

/// Client kit materialization and operation-id extraction.
pub mod kit;

/// Tracing subscriber setup from the environment.
pub mod logging;

/// Spec validation, persistence, and enqueueing.
pub mod registration;

/// Operation index rebuilt from the kit tree.
pub mod registry;

/// Domain types: tasks, descriptors, outcomes, stats.
pub mod types;

/// Surface checks for incoming specs.
pub mod validate;

/// Bounded FIFO queue with a retrying background worker.
pub mod worker;

/// Counter sink, re-exported from the specgate-metrics microcrate.
pub use specgate_metrics as metrics;

/// Property-based tests for extractor and validator invariants.
#[cfg(test)]
mod property_tests;
