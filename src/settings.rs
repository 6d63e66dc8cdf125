//! Table settings
//!
//! Settings are read by the host at round-start time to decide whether to
//! ask for names and whether reveal cards conceal themselves on a timer.
//! The three flags are persisted through a [`SettingsStore`]; the remaining
//! fields are session-local.

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::Duration;

use crate::{
    constants::{
        players::{DEFAULT_PLAYERS, MAX_PLAYERS, MIN_PLAYERS},
        reveal::{MAX_REVEAL_SECONDS, MIN_REVEAL_SECONDS, REVEAL_DURATION},
    },
    store::{Flag, SettingsStore, StoreError},
};

/// Validation result type for duration validation
type ValidationResult = garde::Result;

/// Validates that a duration falls within specified bounds (inclusive, in seconds)
///
/// # Errors
///
/// Returns a `garde::Error` if the duration is outside the specified bounds.
pub fn validate_duration<const MIN_SECONDS: u64, const MAX_SECONDS: u64>(
    val: &Duration,
    _ctx: &(),
) -> ValidationResult {
    if (MIN_SECONDS..=MAX_SECONDS).contains(&val.as_secs()) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "outside of bounds [{MIN_SECONDS},{MAX_SECONDS}]",
        )))
    }
}

fn validate_reveal_duration(val: &Duration) -> ValidationResult {
    validate_duration::<MIN_REVEAL_SECONDS, MAX_REVEAL_SECONDS>(val, &())
}

/// Errors raised while loading or validating settings
#[derive(Error, Debug)]
pub enum Error {
    /// A field is outside its allowed range
    #[error("invalid settings: {0}")]
    Invalid(#[from] garde::Report),
    /// The backing store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Options chosen on the setup screen
#[serde_with::serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Settings {
    /// Number of seats at the table
    #[garde(range(min = MIN_PLAYERS, max = MAX_PLAYERS))]
    pub player_count: usize,
    /// Whether the imposter sees a hint about the topic
    #[garde(skip)]
    pub hints_enabled: bool,
    /// Whether revealed cards conceal and lock themselves after a countdown
    #[garde(skip)]
    pub timed_flip_enabled: bool,
    /// Whether players enter their names before cards are handed out
    #[garde(skip)]
    pub custom_player_names_enabled: bool,
    /// How long a timed reveal stays face up
    #[garde(custom(|v, _| validate_reveal_duration(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub reveal_duration: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_count: DEFAULT_PLAYERS,
            hints_enabled: false,
            timed_flip_enabled: false,
            custom_player_names_enabled: false,
            reveal_duration: REVEAL_DURATION,
        }
    }
}

impl Settings {
    /// Loads the persisted flags, leaving every other field at its default
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if a flag could not be read.
    pub fn load<S: SettingsStore + ?Sized>(store: &S) -> Result<Self, Error> {
        Ok(Self {
            hints_enabled: store.flag(Flag::HintsEnabled)?,
            timed_flip_enabled: store.flag(Flag::TimedFlipEnabled)?,
            custom_player_names_enabled: store.flag(Flag::CustomPlayerNamesEnabled)?,
            ..Self::default()
        })
    }

    /// Persists the flags
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if a flag could not be written.
    pub fn save<S: SettingsStore + ?Sized>(&self, store: &mut S) -> Result<(), Error> {
        store.set_flag(Flag::HintsEnabled, self.hints_enabled)?;
        store.set_flag(Flag::TimedFlipEnabled, self.timed_flip_enabled)?;
        store.set_flag(
            Flag::CustomPlayerNamesEnabled,
            self.custom_player_names_enabled,
        )?;
        Ok(())
    }

    /// Whether a round should start on the name entry screen
    pub fn requires_name_entry(&self) -> bool {
        self.custom_player_names_enabled
    }

    /// Returns these settings if every field is within bounds
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invalid`] describing every out-of-range field.
    pub fn validated(self) -> Result<Self, Error> {
        self.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.player_count, 4);
        assert_eq!(settings.reveal_duration, Duration::from_secs(5));
        assert!(!settings.requires_name_entry());
    }

    #[test]
    fn test_player_count_bounds() {
        let too_few = Settings {
            player_count: 2,
            ..Settings::default()
        };
        assert!(matches!(too_few.validated(), Err(Error::Invalid(_))));

        let too_many = Settings {
            player_count: 13,
            ..Settings::default()
        };
        assert!(too_many.validate().is_err());

        let max = Settings {
            player_count: 12,
            ..Settings::default()
        };
        assert!(max.validate().is_ok());
    }

    #[test]
    fn test_reveal_duration_bounds() {
        let zero = Settings {
            reveal_duration: Duration::ZERO,
            ..Settings::default()
        };
        assert!(zero.validate().is_err());

        let long = Settings {
            reveal_duration: Duration::from_secs(31),
            ..Settings::default()
        };
        assert!(long.validate().is_err());
    }

    #[test]
    fn test_validate_duration() {
        assert!(validate_duration::<1, 30>(&Duration::from_secs(1), &()).is_ok());
        assert!(validate_duration::<1, 30>(&Duration::from_secs(30), &()).is_ok());
        assert!(validate_duration::<1, 30>(&Duration::from_millis(500), &()).is_err());
    }

    #[test]
    fn test_save_and_load_flags() {
        let mut store = MemoryStore::default();
        let settings = Settings {
            hints_enabled: true,
            custom_player_names_enabled: true,
            player_count: 7,
            ..Settings::default()
        };
        settings.save(&mut store).unwrap();

        let loaded = Settings::load(&store).unwrap();
        assert!(loaded.hints_enabled);
        assert!(!loaded.timed_flip_enabled);
        assert!(loaded.requires_name_entry());
        // Only flags are persisted
        assert_eq!(loaded.player_count, 4);
    }

    #[test]
    fn test_serialization_uses_milliseconds() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert!(json.contains("\"reveal_duration\":5000"));

        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Settings::default());
    }
}
