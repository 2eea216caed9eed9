//! Tracing subscriber setup driven by the environment.
//!
//! `GATEWAY_LOG_LEVEL` takes any `EnvFilter` directive (`debug`,
//! `specgate=trace`, ...) and defaults to `info`. `GATEWAY_LOG_FILE`
//! additionally mirrors events into a file (parent directories are created;
//! the file is truncated per process). Logs always go to stderr so command
//! output on stdout stays clean.

use std::fs::File;
use std::path::PathBuf;
use std::sync::{Arc, Once};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const ENV_LOG_LEVEL: &str = "GATEWAY_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "GATEWAY_LOG_FILE";

static INIT: Once = Once::new();

/// Install the global subscriber. Idempotent; later calls are no-ops.
pub fn init_from_env() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(ENV_LOG_LEVEL).unwrap_or_else(|_| EnvFilter::new("info"));

        let file_layer = std::env::var(ENV_LOG_FILE).ok().and_then(|raw| {
            let path = PathBuf::from(raw);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    let _ = std::fs::create_dir_all(parent);
                }
            }
            File::create(&path)
                .ok()
                .map(|file| fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        });

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(file_layer)
            .init();
    });
}
