//! TOML-based user preferences.
//!
//! Stores:
//! - Study and break lengths for the interval timer
//! - Exam title and date for the dashboard countdown
//! - Appearance settings
//!
//! Preferences are stored at `<data dir>/preferences.toml`.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, CoreError, Result};
use crate::exam;
use crate::timer::{DurationSource, SessionDurations};

const FILE_NAME: &str = "preferences.toml";

/// Interval timer lengths, in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerPrefs {
    #[serde(default = "default_study_minutes")]
    pub study_minutes: u32,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamPrefs {
    #[serde(default = "default_exam_title")]
    pub title: String,
    #[serde(default = "default_exam_date")]
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiPrefs {
    #[serde(default)]
    pub dark_theme: bool,
}

/// User preferences.
///
/// Serialized to/from TOML. Every field has a default, so a partial file
/// loads fine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub timer: TimerPrefs,
    #[serde(default)]
    pub exam: ExamPrefs,
    #[serde(default)]
    pub ui: UiPrefs,
}

fn default_study_minutes() -> u32 {
    25
}
fn default_break_minutes() -> u32 {
    5
}
fn default_exam_title() -> String {
    "GATE".into()
}
fn default_exam_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 1).unwrap_or_default()
}

impl Default for TimerPrefs {
    fn default() -> Self {
        Self {
            study_minutes: default_study_minutes(),
            break_minutes: default_break_minutes(),
        }
    }
}

impl Default for ExamPrefs {
    fn default() -> Self {
        Self {
            title: default_exam_title(),
            date: default_exam_date(),
        }
    }
}

impl Preferences {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(invalid("cannot set a whole section".into()));
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Default location of the preference file.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join(FILE_NAME))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// or if the default preferences cannot be written.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
                .into()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let prefs = Self::default();
                prefs.save_to(path)?;
                Ok(prefs)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the preferences cannot be serialized or written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// See [`save`](Self::save).
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a value as string by dot-separated key, e.g. `timer.study_minutes`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key. Does not save.
    ///
    /// Timer lengths must stay positive; a rejected value leaves `self`
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse
    /// into the field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Preferences =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.session_durations()?;
        *self = updated;
        Ok(())
    }

    /// Validated timer lengths.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if either length is zero.
    pub fn session_durations(&self) -> Result<SessionDurations, ConfigError> {
        SessionDurations::new(self.timer.study_minutes, self.timer.break_minutes)
    }

    /// Whole days left until the configured exam date.
    pub fn days_until_exam(&self, today: NaiveDate) -> i64 {
        exam::days_until(self.exam.date, today)
    }
}

/// Timer lengths read from a preference file at every start and re-arm.
///
/// Edits saved while a controller runs (e.g. `gateprep config set`) reach
/// the next session. Overrides, when set, win over the stored values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceFile {
    path: PathBuf,
    study_minutes: Option<u32>,
    break_minutes: Option<u32>,
}

impl PreferenceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            study_minutes: None,
            break_minutes: None,
        }
    }

    /// The file at [`Preferences::path`].
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(Preferences::path()?))
    }

    pub fn with_study_minutes(mut self, minutes: Option<u32>) -> Self {
        self.study_minutes = minutes;
        self
    }

    pub fn with_break_minutes(mut self, minutes: Option<u32>) -> Self {
        self.break_minutes = minutes;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current stored preferences with the overrides applied.
    ///
    /// # Errors
    ///
    /// See [`Preferences::load_from`].
    pub fn read(&self) -> Result<Preferences> {
        let mut prefs = Preferences::load_from(&self.path)?;
        if let Some(minutes) = self.study_minutes {
            prefs.timer.study_minutes = minutes;
        }
        if let Some(minutes) = self.break_minutes {
            prefs.timer.break_minutes = minutes;
        }
        Ok(prefs)
    }
}

impl DurationSource for PreferenceFile {
    fn session_durations(&self) -> Result<SessionDurations, ConfigError> {
        match self.read() {
            Ok(prefs) => prefs.session_durations(),
            Err(CoreError::Config(err)) => Err(err),
            Err(other) => Err(ConfigError::LoadFailed {
                path: self.path.clone(),
                message: other.to_string(),
            }),
        }
    }
}
