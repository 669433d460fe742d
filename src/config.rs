//! Solver configuration.

use crate::tsp::DEFAULT_EXACT_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// What to do when the result cache fails.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheFailurePolicy {
    /// Log a warning and compute the result directly
    #[default]
    FallThrough,
    /// Fail the request with a cache error
    Fail,
}

/// Configuration shared by the cached front and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Largest city count solved exactly
    pub exact_threshold: usize,
    /// Lifetime of cached results in seconds
    pub cache_ttl_secs: u64,
    /// Consult and populate the result cache
    pub cache_enabled: bool,
    pub on_cache_failure: CacheFailurePolicy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            exact_threshold: DEFAULT_EXACT_THRESHOLD,
            cache_ttl_secs: 3600,
            cache_enabled: true,
            on_cache_failure: CacheFailurePolicy::FallThrough,
        }
    }
}

impl SolverConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Load a configuration from a JSON file; missing fields keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let text = std::fs::read_to_string(&path)
            .map_err(|e| format!("Cannot open config file: {}", e))?;
        serde_json::from_str(&text).map_err(|e| format!("Invalid config: {}", e))
    }
}
