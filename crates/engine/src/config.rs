use std::path::PathBuf;
use std::time::Duration;

use deskflow_core::sweep::DEFAULT_SWEEP_INTERVAL_SECS;

/// Engine configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory the collection blob lives in (default: `./data`).
    pub data_dir: PathBuf,
    /// How often the background sweeper runs, in seconds (default: `60`).
    pub sweep_interval_secs: u64,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default  |
    /// |--------------------------------|----------|
    /// | `DESKFLOW_DATA_DIR`            | `./data` |
    /// | `DESKFLOW_SWEEP_INTERVAL_SECS` | `60`     |
    pub fn from_env() -> Self {
        let data_dir = std::env::var("DESKFLOW_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let sweep_interval_secs: u64 = std::env::var("DESKFLOW_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_SWEEP_INTERVAL_SECS.to_string())
            .parse()
            .expect("DESKFLOW_SWEEP_INTERVAL_SECS must be a valid u64");

        Self {
            data_dir,
            sweep_interval_secs,
        }
    }

    /// The sweep interval as a `Duration`.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}
