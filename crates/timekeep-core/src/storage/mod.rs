mod config;
pub mod timer_store;

pub use config::{Config, DisplayConfig, NotificationsConfig};
pub use timer_store::{ListOrder, TimerStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `TIMEKEEP_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/timekeep/`, or `~/.config/timekeep-dev/` when `TIMEKEEP_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("TIMEKEEP_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("TIMEKEEP_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("timekeep-dev")
            } else {
                base_dir.join("timekeep")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
