//! Runtime knobs for the gateway, with environment overrides.
//!
//! Numeric limits can be overridden through `GATEWAY_*` environment
//! variables; unparseable values fall back to the defaults. Roots are left
//! to the CLI flags.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::dispatcher::DEFAULT_MAX_CONCURRENT_OPS;
use crate::validate::DEFAULT_MAX_SPEC_BYTES;
use crate::worker::{DEFAULT_MAX_QUEUE_SIZE, DEFAULT_MAX_RETRIES};

pub const ENV_MAX_QUEUE_SIZE: &str = "GATEWAY_MAX_QUEUE_SIZE";
pub const ENV_MAX_RETRIES: &str = "GATEWAY_MAX_RETRIES";
pub const ENV_MAX_CONCURRENT_OPS: &str = "GATEWAY_MAX_CONCURRENT_OPS";
pub const ENV_MAX_SPEC_BYTES: &str = "GATEWAY_MAX_SPEC_BYTES";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Root of the per-version spec copies.
    pub mappings_root: PathBuf,
    /// Root of the generated client kits.
    pub clientkit_root: PathBuf,
    /// Generation queue capacity; enqueueing beyond it is refused.
    pub max_queue_size: usize,
    /// Generation attempts per task before giving up.
    pub max_retries: usize,
    /// Inflight ceiling for execute requests.
    pub max_concurrent_ops: usize,
    /// Size ceiling for an incoming spec.
    pub max_spec_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            mappings_root: PathBuf::from("mappings"),
            clientkit_root: PathBuf::from("clientkit"),
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            max_concurrent_ops: DEFAULT_MAX_CONCURRENT_OPS,
            max_spec_bytes: DEFAULT_MAX_SPEC_BYTES,
        }
    }
}

impl GatewayConfig {
    /// Defaults overlaid with any parseable numeric environment overrides.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(n) = env_usize(ENV_MAX_QUEUE_SIZE) {
            cfg.max_queue_size = n;
        }
        if let Some(n) = env_usize(ENV_MAX_RETRIES) {
            cfg.max_retries = n;
        }
        if let Some(n) = env_usize(ENV_MAX_CONCURRENT_OPS) {
            cfg.max_concurrent_ops = n;
        }
        if let Some(n) = env_usize(ENV_MAX_SPEC_BYTES) {
            cfg.max_spec_bytes = n;
        }
        cfg
    }
}

fn env_usize(name: &str) -> Option<usize> {
    env::var(name).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_component_defaults() {
        let cfg = GatewayConfig::default();
        assert_eq!(cfg.mappings_root, PathBuf::from("mappings"));
        assert_eq!(cfg.clientkit_root, PathBuf::from("clientkit"));
        assert_eq!(cfg.max_queue_size, 32);
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.max_concurrent_ops, 8);
        assert_eq!(cfg.max_spec_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn env_overrides_numeric_limits() {
        temp_env::with_vars(
            [
                (ENV_MAX_QUEUE_SIZE, Some("5")),
                (ENV_MAX_CONCURRENT_OPS, Some("2")),
            ],
            || {
                let cfg = GatewayConfig::from_env();
                assert_eq!(cfg.max_queue_size, 5);
                assert_eq!(cfg.max_concurrent_ops, 2);
                assert_eq!(cfg.max_retries, 3);
            },
        );
    }

    #[test]
    fn unparseable_env_values_are_ignored() {
        temp_env::with_var(ENV_MAX_QUEUE_SIZE, Some("not-a-number"), || {
            assert_eq!(GatewayConfig::from_env().max_queue_size, 32);
        });
    }

    #[test]
    fn config_round_trips_through_json() {
        let cfg = GatewayConfig::default();
        let json = serde_json::to_string(&cfg).expect("serialize");
        let back: GatewayConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, cfg);
    }
}
