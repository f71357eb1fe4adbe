mod preferences;

pub use preferences::{ExamPrefs, PreferenceFile, Preferences, TimerPrefs, UiPrefs};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns the gateprep data directory, creating it if needed.
///
/// `GATEPREP_DATA_DIR` wins when set. Otherwise `~/.config/gateprep[-dev]/`
/// based on `GATEPREP_ENV` (set `GATEPREP_ENV=dev` for the development
/// directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("GATEPREP_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("GATEPREP_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("gateprep-dev")
            } else {
                base_dir.join("gateprep")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
