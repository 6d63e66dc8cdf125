//! # Odd One Out
//!
//! Core logic for a pass-the-device social deduction party game. Every
//! round one player is secretly the imposter and does not learn the topic
//! that everyone else sees. This crate deals the roles, runs the
//! once-per-player reveal cards with their timed self-locking, and keeps
//! score across rounds. Rendering, sound and storage are left to the host.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
use serde::{Deserialize, Serialize};

pub mod assigner;
pub mod constants;
pub mod engine;
pub mod game;
pub mod player;
pub mod reveal;
pub mod session;
pub mod settings;
pub mod store;
pub mod timer;
pub mod topics;

/// Messages sent to synchronize state with the view layer
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum SyncMessage {
    /// Session-wide state
    Game(game::SyncMessage),
    /// A single reveal card
    Reveal(reveal::SyncMessage),
}

impl SyncMessage {
    /// Converts the sync message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Alarm messages for deferred events
///
/// These are handed to the host's scheduler together with a delay and
/// delivered back once the delay has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::From, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Reveal card countdown and lock alarms
    Reveal(reveal::AlarmMessage),
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{
        player::{Id, Player},
        reveal::{CardRevealController, RoleCard},
    };

    #[test]
    fn test_sync_message_to_message() {
        let sync_msg: SyncMessage =
            game::SyncMessage::Session(game::GameSession::default()).into();
        let json_str = sync_msg.to_message();

        assert!(json_str.contains("Game"));
        assert!(json_str.contains("Session"));
        assert!(json_str.contains("Setup"));
    }

    #[test]
    fn test_reveal_sync_message_to_message() {
        let player = Player::new(2);
        let controller = CardRevealController::new(
            &player,
            1,
            RoleCard::Imposter { hint: None },
            false,
        );
        let json_str = SyncMessage::from(controller.sync_message()).to_message();

        assert!(json_str.contains("Reveal"));
        assert!(json_str.contains("Hidden"));
        assert!(!json_str.contains("Imposter"));
    }

    #[test]
    fn test_alarm_message_round_trip() {
        let mut timer = timer::RevealTimer::default();
        let mut scheduled = Vec::new();
        timer.start(
            web_time::Duration::from_secs(1),
            |message, _| scheduled.push(message),
            |token| {
                reveal::AlarmMessage::Lock {
                    player: Id::new(),
                    round: 4,
                    token,
                }
                .into()
            },
        );

        let json = serde_json::to_string(&scheduled[0]).unwrap();
        let back: AlarmMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scheduled[0]);
    }
}
