//! Persistence contracts for names and settings
//!
//! The game core never touches storage directly. Hosts inject a
//! [`NameStore`] and a [`SettingsStore`] backed by whatever key-value
//! facility the platform has. [`MemoryStore`] implements both in memory
//! and doubles as the test store.

use enum_map::{Enum, EnumMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by a backing store
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The storage medium could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A stored value could not be decoded
    #[error("stored value is corrupt: {0}")]
    Corrupt(String),
}

/// Persisted list of display names, in seat order
pub trait NameStore {
    /// Returns the stored names, or `None` if nothing was ever stored
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backing store could not be read.
    fn get_names(&self) -> Result<Option<Vec<String>>, StoreError>;

    /// Replaces the stored names
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backing store could not be written.
    fn set_names(&mut self, names: &[String]) -> Result<(), StoreError>;

    /// Removes any stored names
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backing store could not be written.
    fn clear_names(&mut self) -> Result<(), StoreError>;
}

/// Persisted boolean preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum Flag {
    /// Show the imposter a hint about the topic
    HintsEnabled,
    /// Conceal revealed cards automatically after a countdown
    TimedFlipEnabled,
    /// Ask for player names before handing out cards
    CustomPlayerNamesEnabled,
}

/// Persisted flags, each defaulting to `false` when absent
pub trait SettingsStore {
    /// Reads a flag
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backing store could not be read.
    fn flag(&self, flag: Flag) -> Result<bool, StoreError>;

    /// Writes a flag
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backing store could not be written.
    fn set_flag(&mut self, flag: Flag, value: bool) -> Result<(), StoreError>;
}

/// In-memory store for names and flags
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemoryStore {
    names: Option<Vec<String>>,
    flags: EnumMap<Flag, bool>,
}

impl MemoryStore {
    /// Creates a store pre-populated with names
    pub fn with_names<I: IntoIterator<Item = S>, S: Into<String>>(names: I) -> Self {
        Self {
            names: Some(names.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }
}

impl NameStore for MemoryStore {
    fn get_names(&self) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.names.clone())
    }

    fn set_names(&mut self, names: &[String]) -> Result<(), StoreError> {
        self.names = Some(names.to_vec());
        Ok(())
    }

    fn clear_names(&mut self) -> Result<(), StoreError> {
        self.names = None;
        Ok(())
    }
}

impl SettingsStore for MemoryStore {
    fn flag(&self, flag: Flag) -> Result<bool, StoreError> {
        Ok(self.flags[flag])
    }

    fn set_flag(&mut self, flag: Flag, value: bool) -> Result<(), StoreError> {
        self.flags[flag] = value;
        Ok(())
    }
}
