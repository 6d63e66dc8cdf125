//! Player identity and display names
//!
//! Every seat at the table is a [`Player`]. A player keeps a stable opaque
//! [`Id`] for the lifetime of the roster, independent of its positional
//! `index`, so lookups stay valid if the seat reuse policy ever changes.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use uuid::Uuid;

use crate::constants::names::{DEFAULT_NAME_PREFIX, MAX_LENGTH};

/// A unique identifier for a player record
///
/// Identifiers are random and never reused, so an alarm or event carrying
/// an old `Id` cannot accidentally target a freshly created player.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random player ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    /// Parses an ID from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// One seat at the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Stable identifier, preserved across rounds while the seat is reused
    pub id: Id,
    /// Positional slot, 1-based and contiguous within a session
    pub index: usize,
    /// Display name
    pub name: String,
    /// Whether this player is the odd one out for the current round
    pub is_imposter: bool,
    /// Whether this player has looked at their card this round
    pub has_seen_role: bool,
    /// Rounds won so far
    pub wins: u32,
}

impl Player {
    /// Creates a fresh player for a seat with its default name and no wins
    ///
    /// # Arguments
    ///
    /// * `index` - The 1-based seat position
    pub fn new(index: usize) -> Self {
        Self {
            id: Id::new(),
            index,
            name: default_name(index),
            is_imposter: false,
            has_seen_role: false,
            wins: 0,
        }
    }

    /// Restores the positional default name
    pub fn reset_name(&mut self) {
        self.name = default_name(self.index);
    }
}

/// Returns the positional default name for a 1-based seat, e.g. "Player 3"
pub fn default_name(index: usize) -> String {
    format!("{DEFAULT_NAME_PREFIX} {index}")
}

/// Cleans a user supplied name for the given seat
///
/// Surrounding whitespace is trimmed and overly long names are cut to
/// [`MAX_LENGTH`] characters. A name that is empty after trimming falls
/// back to the seat's default name.
///
/// # Arguments
///
/// * `index` - The 1-based seat position, used for the fallback name
/// * `name` - The raw name as entered
pub fn sanitize_name(index: usize, name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return default_name(index);
    }
    if trimmed.chars().count() > MAX_LENGTH {
        trimmed.chars().take(MAX_LENGTH).collect::<String>().trim_end().to_owned()
    } else {
        trimmed.to_owned()
    }
}
