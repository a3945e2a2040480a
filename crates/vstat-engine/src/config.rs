//! Engine configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vstat_repo::ScanOptions;

use crate::error::EngineResult;

/// Tunables for the synchronization engine, loadable from TOML.
///
/// ```toml
/// slow_scan_warn_ms = 500
///
/// [scan]
/// include_ignored = false
/// ```
///
/// Missing keys fall back to their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// What a full scan asks the repository to enumerate.
    pub scan: ScanOptions,
    /// A completed scan slower than this is logged at `warn`.
    pub slow_scan_warn_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scan: ScanOptions::default(),
            slow_scan_warn_ms: 2_000,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(input: &str) -> EngineResult<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let input = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&input)?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn slow_scan_warn(&self) -> Duration {
        Duration::from_millis(self.slow_scan_warn_ms)
    }
}
