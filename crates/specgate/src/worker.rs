//! Bounded FIFO generation queue with a single background worker.
//!
//! One mutex guards the queue together with the `active`, `running`, and
//! `stopping` flags; one condvar carries both signals ("task available" for
//! the worker, "task completed" for idle waiters), so completion must
//! broadcast rather than signal a single waiter.
//!
//! `stop()` drains: tasks enqueued before the stop request are completed
//! before the worker exits, and enqueueing after a stop is refused.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Result;
use specgate_metrics::MetricsRegistry;
use tracing::{error, info, warn};

use crate::types::{GenerationTask, WorkerStats};

pub const DEFAULT_MAX_RETRIES: usize = 3;
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 32;

const RETRY_BASE_DELAY: Duration = Duration::from_millis(50);

/// Seam between the queue and kit materialization. The production
/// implementation is [`crate::kit::KitWriter`]; tests inject doubles to
/// observe ordering, block the worker, or fail selectively.
pub trait KitGenerator: Send + Sync {
    fn generate(&self, task: &GenerationTask) -> Result<()>;
}

struct WorkerState {
    queue: VecDeque<GenerationTask>,
    active: usize,
    running: bool,
    stopping: bool,
}

struct Shared {
    state: Mutex<WorkerState>,
    cv: Condvar,
    generator: Arc<dyn KitGenerator>,
    max_retries: usize,
    capacity: usize,
    metrics: Option<Arc<MetricsRegistry>>,
}

/// Owner of the worker thread and the task queue.
pub struct GenerationWorker {
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl GenerationWorker {
    pub fn new(
        generator: Arc<dyn KitGenerator>,
        max_retries: usize,
        capacity: usize,
        metrics: Option<Arc<MetricsRegistry>>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(WorkerState {
                    queue: VecDeque::new(),
                    active: 0,
                    running: false,
                    stopping: false,
                }),
                cv: Condvar::new(),
                generator,
                max_retries,
                capacity,
                metrics,
            }),
            handle: Mutex::new(None),
        }
    }

    /// Bring the worker thread up. Safe to call more than once; only the
    /// first call spawns.
    pub fn start(&self) {
        let mut handle = self.handle.lock().unwrap();
        {
            let mut state = self.shared.state.lock().unwrap();
            if state.running {
                return;
            }
            state.stopping = false;
            state.running = true;
        }
        let shared = Arc::clone(&self.shared);
        *handle = Some(thread::spawn(move || worker_loop(shared)));
    }

    /// Offer a task to the queue. Returns false when the queue is at
    /// capacity or a stop has been requested; the task is dropped in both
    /// cases.
    pub fn enqueue(&self, task: GenerationTask) -> bool {
        let version = task.version.clone();
        let spec = task.spec_path.display().to_string();
        {
            let mut state = self.shared.state.lock().unwrap();
            if state.stopping {
                return false;
            }
            if state.queue.len() >= self.shared.capacity {
                drop(state);
                if let Some(m) = &self.shared.metrics {
                    m.record_generation_queue_full();
                }
                warn!(version = %version, spec = %spec, "generation queue full, task rejected");
                return false;
            }
            state.queue.push_back(task);
        }
        if let Some(m) = &self.shared.metrics {
            m.record_generation_enqueued();
        }
        info!(version = %version, spec = %spec, "queued generation");
        self.shared.cv.notify_one();
        true
    }

    /// Block until the queue is empty and no task is being processed.
    pub fn wait_for_idle(&self) {
        let mut state = self.shared.state.lock().unwrap();
        while !(state.queue.is_empty() && state.active == 0) {
            state = self.shared.cv.wait(state).unwrap();
        }
    }

    /// Request a drain and join the worker thread. Tasks already enqueued
    /// complete before this returns. The join handle is taken under a lock,
    /// so overlapping stop calls are safe.
    pub fn stop(&self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.stopping = true;
        }
        self.shared.cv.notify_all();
        let handle = self.handle.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
        self.shared.state.lock().unwrap().running = false;
    }

    pub fn stats(&self) -> WorkerStats {
        let state = self.shared.state.lock().unwrap();
        WorkerStats {
            queue_depth: state.queue.len(),
            active: state.active,
            capacity: self.shared.capacity,
            running: state.running,
            stopping: state.stopping,
        }
    }
}

impl Drop for GenerationWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(shared: Arc<Shared>) {
    info!("generation worker started");
    loop {
        let task = {
            let mut state = shared.state.lock().unwrap();
            while !(state.stopping || !state.queue.is_empty()) {
                state = shared.cv.wait(state).unwrap();
            }
            if state.stopping && state.queue.is_empty() {
                break;
            }
            let task = state.queue.pop_front().expect("queue checked non-empty");
            state.active += 1;
            task
        };

        run_with_retries(&shared, &task);

        {
            let mut state = shared.state.lock().unwrap();
            state.active -= 1;
        }
        // Broadcast so wait_for_idle waiters observe the drain, not just the
        // worker's own wakeup predicate.
        shared.cv.notify_all();
    }
    info!("generation worker stopped");
}

fn run_with_retries(shared: &Shared, task: &GenerationTask) -> bool {
    for attempt in 1..=shared.max_retries {
        let started = Instant::now();
        match shared.generator.generate(task) {
            Ok(()) => {
                if let Some(m) = &shared.metrics {
                    m.record_generation_success();
                    m.record_generation_latency_ms(started.elapsed().as_millis() as u64);
                }
                info!(version = %task.version, attempt, "generated client kit");
                return true;
            }
            Err(e) => {
                error!(
                    spec = %task.spec_path.display(),
                    attempt,
                    "generation attempt failed: {e:#}"
                );
                let delay = RETRY_BASE_DELAY * attempt as u32;
                if attempt < shared.max_retries {
                    warn!(
                        spec = %task.spec_path.display(),
                        "retrying in {}",
                        humantime::format_duration(delay)
                    );
                }
                thread::sleep(delay);
            }
        }
    }
    if let Some(m) = &shared.metrics {
        m.record_generation_failure();
    }
    error!(spec = %task.spec_path.display(), "exhausted generation retries");
    false
}
