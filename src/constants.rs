//! Configuration constants for the party game
//!
//! This module contains the limits and fixed durations used throughout
//! the game so that the round engine, the reveal cards and the settings
//! layer agree on the same boundaries.

use web_time::Duration;

/// Player roster limits
pub mod players {
    /// Smallest table the game is meaningful for
    pub const MIN_PLAYERS: usize = 3;
    /// Largest table a single device is expected to be passed around
    pub const MAX_PLAYERS: usize = 12;
    /// Player count offered before anything has been configured
    pub const DEFAULT_PLAYERS: usize = 4;
}

/// Player name constraints
pub mod names {
    /// Prefix of the positional default name ("Player 1", "Player 2", ...)
    pub const DEFAULT_NAME_PREFIX: &str = "Player";
    /// Maximum length of a display name in characters, longer names are truncated
    pub const MAX_LENGTH: usize = 30;
}

/// Topic selection
pub mod topics {
    /// Topic used when the catalog has nothing to offer
    pub const FALLBACK_TOPIC: &str = "Pizza";
}

/// Reveal card timing
pub mod reveal {
    use super::Duration;

    /// How long a timed reveal stays face up before concealing itself
    pub const REVEAL_DURATION: Duration = Duration::from_secs(5);
    /// Flip-back animation time between concealing a card and locking it
    pub const LOCK_DELAY: Duration = Duration::from_millis(400);
    /// Minimum configurable reveal duration in seconds
    pub const MIN_REVEAL_SECONDS: u64 = 1;
    /// Maximum configurable reveal duration in seconds
    pub const MAX_REVEAL_SECONDS: u64 = 30;
}

/// Clamps a requested player count into the supported range
pub fn clamp_player_count(count: usize) -> usize {
    count.clamp(players::MIN_PLAYERS, players::MAX_PLAYERS)
}
