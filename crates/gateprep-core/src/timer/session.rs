use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub(crate) const MS_PER_MINUTE: u64 = 60 * 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    #[default]
    Study,
    Break,
}

impl SessionKind {
    /// The kind that follows this one in the study/break cycle.
    pub fn flipped(self) -> Self {
        match self {
            SessionKind::Study => SessionKind::Break,
            SessionKind::Break => SessionKind::Study,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionKind::Study => "Study",
            SessionKind::Break => "Break",
        }
    }
}

/// Validated study and break lengths in whole minutes.
///
/// Both values are strictly positive; there is no way to build a
/// `SessionDurations` that would arm a zero-length countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDurations")]
pub struct SessionDurations {
    study_minutes: u32,
    break_minutes: u32,
}

#[derive(Deserialize)]
struct RawDurations {
    study_minutes: u32,
    break_minutes: u32,
}

impl TryFrom<RawDurations> for SessionDurations {
    type Error = ConfigError;

    fn try_from(raw: RawDurations) -> Result<Self, Self::Error> {
        Self::new(raw.study_minutes, raw.break_minutes)
    }
}

impl SessionDurations {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending key when
    /// either duration is zero.
    pub fn new(study_minutes: u32, break_minutes: u32) -> Result<Self, ConfigError> {
        if study_minutes == 0 {
            return Err(non_positive("timer.study_minutes"));
        }
        if break_minutes == 0 {
            return Err(non_positive("timer.break_minutes"));
        }
        Ok(Self {
            study_minutes,
            break_minutes,
        })
    }

    pub fn study_minutes(&self) -> u32 {
        self.study_minutes
    }

    pub fn break_minutes(&self) -> u32 {
        self.break_minutes
    }

    pub fn minutes_for(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Study => self.study_minutes,
            SessionKind::Break => self.break_minutes,
        }
    }

    /// Session length in milliseconds for `kind`.
    pub fn duration_ms(&self, kind: SessionKind) -> u64 {
        u64::from(self.minutes_for(kind)).saturating_mul(MS_PER_MINUTE)
    }
}

impl Default for SessionDurations {
    fn default() -> Self {
        Self {
            study_minutes: 25,
            break_minutes: 5,
        }
    }
}

fn non_positive(key: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: "duration must be a positive number of minutes".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_flips_both_ways() {
        assert_eq!(SessionKind::Study.flipped(), SessionKind::Break);
        assert_eq!(SessionKind::Break.flipped(), SessionKind::Study);
    }

    #[test]
    fn durations_convert_minutes_to_ms() {
        let d = SessionDurations::new(25, 5).unwrap();
        assert_eq!(d.duration_ms(SessionKind::Study), 1_500_000);
        assert_eq!(d.duration_ms(SessionKind::Break), 300_000);
    }

    #[test]
    fn zero_study_minutes_rejected() {
        let err = SessionDurations::new(0, 5).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "timer.study_minutes"
        ));
    }

    #[test]
    fn zero_break_minutes_rejected() {
        let err = SessionDurations::new(25, 0).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "timer.break_minutes"
        ));
    }

    #[test]
    fn deserialize_validates() {
        let ok: SessionDurations =
            serde_json::from_str(r#"{"study_minutes":50,"break_minutes":10}"#).unwrap();
        assert_eq!(ok.study_minutes(), 50);
        let bad = serde_json::from_str::<SessionDurations>(r#"{"study_minutes":0,"break_minutes":10}"#);
        assert!(bad.is_err());
    }
}
