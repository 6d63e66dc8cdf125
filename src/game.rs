//! Session state and its reducer
//!
//! A [`GameSession`] is a plain value. Every change goes through
//! [`GameSession::reduce`], which takes an [`Event`] and returns the next
//! session. Events carry any randomness or stored data they need, already
//! resolved, so the reducer is deterministic; [`crate::engine::GameEngine`]
//! does the resolving.
//!
//! The session moves through the modes
//! `Setup → NameEntry → Distribution → Discussion → Celebration`, with
//! `Celebration → Distribution` for another round and a reset back to
//! `Setup` from anywhere.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    assigner::Assignment,
    player::{Id, Player, sanitize_name},
};

/// Represents the current phase of the session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Choosing the player count and options
    #[default]
    Setup,
    /// Players are typing their names
    NameEntry,
    /// The device is passed around and each player views their card
    Distribution,
    /// Everyone has seen their card and the table is talking
    Discussion,
    /// The round outcome has been tallied
    Celebration,
}

/// Everything that can happen to a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A round begins with a given number of seats
    StartRound {
        /// Number of seats
        player_count: usize,
        /// Imposter seat and topic for the round
        assignment: Assignment,
        /// Names previously saved, used to pre-fill the name entry screen
        stored_names: Option<Vec<String>>,
        /// Whether to ask for names before handing out cards
        name_entry: bool,
        /// Zero-based seat that opens the discussion
        first_speaker: usize,
    },
    /// Names were submitted from the name entry screen
    ConfirmNames {
        /// Raw names in seat order
        names: Vec<String>,
        /// Zero-based seat that opens the discussion
        first_speaker: usize,
    },
    /// Every player goes back to their default name
    ResetNames,
    /// A player turned over their card
    RoleSeen {
        /// Round the card was dealt in
        round: u32,
        /// The player who looked
        player: Id,
    },
    /// Move from handing out cards to discussion
    BeginDiscussion,
    /// Record who won the round
    Tally {
        /// Whether the imposter went undetected
        imposter_won: bool,
    },
    /// Play again with the same table
    NextRound {
        /// Imposter seat and topic for the round
        assignment: Assignment,
        /// Zero-based seat that opens the discussion
        first_speaker: usize,
    },
    /// Set every win count back to zero
    ResetWins,
    /// Discard the table and return to setup
    ResetToSetup,
}

/// Snapshot messages for the view layer
#[derive(Debug, Clone, Serialize)]
pub enum SyncMessage {
    /// Full session state
    Session(GameSession),
}

/// The session state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    /// Seats in order
    players: Vec<Player>,
    /// The round's secret topic
    topic: String,
    /// Current phase
    mode: Mode,
    /// Who opens the discussion, always a member of `players`
    first_speaker: Option<Id>,
    /// Winners of the last tally, only populated in celebration
    recent_winners: Vec<Player>,
    /// Increments every time roles are dealt
    round: u32,
}

impl GameSession {
    /// Applies an event and returns the resulting session
    ///
    /// Events whose preconditions do not hold leave the session unchanged.
    #[must_use]
    pub fn reduce(mut self, event: Event) -> Self {
        let before = self.mode;

        match event {
            Event::StartRound {
                player_count,
                assignment,
                stored_names,
                name_entry,
                first_speaker,
            } => {
                if player_count != self.players.len() {
                    self.players = (1..=player_count).map(Player::new).collect_vec();
                }
                self.deal(&assignment);

                if name_entry {
                    for (player, name) in self.players.iter_mut().zip(stored_names.iter().flatten())
                    {
                        player.name = sanitize_name(player.index, name);
                    }
                    self.first_speaker = None;
                    self.mode = Mode::NameEntry;
                } else {
                    self.first_speaker = self.player_at(first_speaker);
                    self.mode = Mode::Distribution;
                }
            }
            Event::ConfirmNames {
                names,
                first_speaker,
            } if self.mode == Mode::NameEntry => {
                for (i, player) in self.players.iter_mut().enumerate() {
                    player.name = sanitize_name(
                        player.index,
                        names.get(i).map_or("", String::as_str),
                    );
                }
                self.first_speaker = self.player_at(first_speaker);
                self.mode = Mode::Distribution;
            }
            Event::ResetNames => {
                for player in &mut self.players {
                    player.reset_name();
                }
            }
            Event::RoleSeen { round, player }
                if self.mode == Mode::Distribution && round == self.round =>
            {
                if let Some(player) = self.players.iter_mut().find(|p| p.id == player) {
                    player.has_seen_role = true;
                }
            }
            Event::BeginDiscussion if self.mode == Mode::Distribution && self.all_revealed() => {
                self.mode = Mode::Discussion;
            }
            Event::Tally { imposter_won } if self.mode == Mode::Discussion => {
                let winners = self
                    .players
                    .iter_mut()
                    .filter(|p| p.is_imposter == imposter_won)
                    .map(|p| {
                        p.wins += 1;
                        p.clone()
                    })
                    .collect_vec();
                tracing::info!(
                    round = self.round,
                    imposter_won,
                    winners = winners.len(),
                    "round tallied"
                );
                self.recent_winners = winners;
                self.mode = Mode::Celebration;
            }
            Event::NextRound {
                assignment,
                first_speaker,
            } => {
                if self.players.is_empty() {
                    self.first_speaker = None;
                    self.mode = Mode::Setup;
                } else {
                    self.deal(&assignment);
                    self.first_speaker = self.player_at(first_speaker);
                    self.mode = Mode::Distribution;
                }
            }
            Event::ResetWins => {
                for player in &mut self.players {
                    player.wins = 0;
                }
            }
            Event::ResetToSetup => {
                self.players.clear();
                self.topic.clear();
                self.first_speaker = None;
                self.mode = Mode::Setup;
            }
            event => {
                tracing::debug!(?event, mode = ?self.mode, "event ignored");
            }
        }

        if self.mode != Mode::Celebration {
            self.recent_winners.clear();
        }
        if before != self.mode {
            tracing::debug!(from = ?before, to = ?self.mode, round = self.round, "mode changed");
        }

        self
    }

    /// Hands out roles for a new round on the current roster
    fn deal(&mut self, assignment: &Assignment) {
        self.round += 1;
        self.topic.clone_from(&assignment.topic);
        let imposter = assignment.imposter_index;
        for (i, player) in self.players.iter_mut().enumerate() {
            player.is_imposter = i == imposter;
            player.has_seen_role = false;
        }
    }

    fn player_at(&self, position: usize) -> Option<Id> {
        self.players.get(position).map(|p| p.id)
    }

    /// Whether every player has looked at their card
    pub fn all_revealed(&self) -> bool {
        self.players.iter().all(|p| p.has_seen_role)
    }

    /// Seats in order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Looks up a player by ID
    pub fn player(&self, id: Id) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// The round's imposter
    pub fn imposter(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_imposter)
    }

    /// The round's secret topic
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Current phase
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The player who opens the discussion
    pub fn first_speaker(&self) -> Option<&Player> {
        self.first_speaker.and_then(|id| self.player(id))
    }

    /// Winners of the last tally, empty outside celebration
    pub fn recent_winners(&self) -> &[Player] {
        &self.recent_winners
    }

    /// Number of times roles have been dealt
    pub fn round(&self) -> u32 {
        self.round
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn assignment(imposter_index: usize) -> Assignment {
        Assignment {
            imposter_index,
            topic: "Beach".to_string(),
        }
    }

    fn start(session: GameSession, player_count: usize, imposter_index: usize) -> GameSession {
        session.reduce(Event::StartRound {
            player_count,
            assignment: assignment(imposter_index),
            stored_names: None,
            name_entry: false,
            first_speaker: 0,
        })
    }

    fn reveal_all(mut session: GameSession) -> GameSession {
        let round = session.round();
        for id in session.players().iter().map(|p| p.id).collect_vec() {
            session = session.reduce(Event::RoleSeen { round, player: id });
        }
        session
    }

    /// Three players in discussion: P1 imposter with 0 wins, P2 with 1, P3 with 0
    fn tally_fixture() -> GameSession {
        let mut session = reveal_all(start(GameSession::default(), 3, 0));
        session.players[1].wins = 1;
        session.reduce(Event::BeginDiscussion)
    }

    #[test]
    fn test_default_is_setup() {
        let session = GameSession::default();
        assert_eq!(session.mode(), Mode::Setup);
        assert!(session.players().is_empty());
        assert!(session.first_speaker().is_none());
    }

    #[test]
    fn test_start_round_exactly_one_imposter() {
        for count in 1..=12 {
            for imposter in 0..count {
                let session = start(GameSession::default(), count, imposter);
                assert_eq!(session.players().len(), count);
                assert_eq!(session.players().iter().filter(|p| p.is_imposter).count(), 1);
                assert!(session.players()[imposter].is_imposter);
            }
        }
    }

    #[test]
    fn test_start_round_indices_contiguous() {
        let session = start(GameSession::default(), 5, 2);
        let indices = session.players().iter().map(|p| p.index).collect_vec();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
        assert!(session.players().iter().all(|p| !p.has_seen_role));
        assert_eq!(session.mode(), Mode::Distribution);
        assert_eq!(session.topic(), "Beach");
        assert_eq!(session.round(), 1);
    }

    #[test]
    fn test_start_round_same_count_keeps_identity() {
        let mut session = start(GameSession::default(), 4, 0);
        session.players[0].name = "A".to_string();
        session.players[2].wins = 2;
        let ids = session.players().iter().map(|p| p.id).collect_vec();

        let session = start(session, 4, 3);
        assert_eq!(session.players().iter().map(|p| p.id).collect_vec(), ids);
        assert_eq!(session.players()[0].name, "A");
        assert_eq!(session.players()[2].wins, 2);
        assert!(session.players()[3].is_imposter);
        assert!(!session.players()[0].is_imposter);
    }

    #[test]
    fn test_start_round_count_change_resets_identity() {
        let mut session = start(GameSession::default(), 4, 0);
        for (player, name) in session.players.iter_mut().zip(["A", "B", "C", "D"]) {
            player.name = name.to_string();
            player.wins = 3;
        }

        let session = start(session, 5, 1);
        let names = session.players().iter().map(|p| p.name.as_str()).collect_vec();
        assert_eq!(
            names,
            vec!["Player 1", "Player 2", "Player 3", "Player 4", "Player 5"]
        );
        assert!(session.players().iter().all(|p| p.wins == 0));
    }

    #[test]
    fn test_start_round_with_name_entry_prefills() {
        let session = GameSession::default().reduce(Event::StartRound {
            player_count: 3,
            assignment: assignment(0),
            stored_names: Some(vec![
                " Al ".to_string(),
                "  ".to_string(),
                "Bo".to_string(),
                "Extra".to_string(),
            ]),
            name_entry: true,
            first_speaker: 1,
        });

        assert_eq!(session.mode(), Mode::NameEntry);
        assert!(session.first_speaker().is_none());
        let names = session.players().iter().map(|p| p.name.as_str()).collect_vec();
        assert_eq!(names, vec!["Al", "Player 2", "Bo"]);
    }

    #[test]
    fn test_short_stored_names_leave_defaults() {
        let session = GameSession::default().reduce(Event::StartRound {
            player_count: 3,
            assignment: assignment(0),
            stored_names: Some(vec!["Al".to_string()]),
            name_entry: true,
            first_speaker: 0,
        });
        let names = session.players().iter().map(|p| p.name.as_str()).collect_vec();
        assert_eq!(names, vec!["Al", "Player 2", "Player 3"]);
    }

    #[test]
    fn test_confirm_names_sanitizes() {
        let session = GameSession::default().reduce(Event::StartRound {
            player_count: 3,
            assignment: assignment(0),
            stored_names: None,
            name_entry: true,
            first_speaker: 0,
        });
        let session = session.reduce(Event::ConfirmNames {
            names: vec![" Al ".to_string(), String::new(), "Bo".to_string()],
            first_speaker: 2,
        });

        let names = session.players().iter().map(|p| p.name.as_str()).collect_vec();
        assert_eq!(names, vec!["Al", "Player 2", "Bo"]);
        assert_eq!(session.mode(), Mode::Distribution);
        assert_eq!(session.first_speaker().map(|p| p.index), Some(3));
    }

    #[test]
    fn test_confirm_names_outside_name_entry_ignored() {
        let session = start(GameSession::default(), 3, 0);
        let after = session.clone().reduce(Event::ConfirmNames {
            names: vec!["X".to_string(); 3],
            first_speaker: 0,
        });
        assert_eq!(after, session);
    }

    #[test]
    fn test_reset_names_keeps_mode() {
        let mut session = start(GameSession::default(), 2, 0);
        session.players[0].name = "Al".to_string();
        let session = session.reduce(Event::ResetNames);
        assert_eq!(session.players()[0].name, "Player 1");
        assert_eq!(session.mode(), Mode::Distribution);
    }

    #[test]
    fn test_reveal_gate() {
        let session = start(GameSession::default(), 3, 0);
        let round = session.round();
        let ids = session.players().iter().map(|p| p.id).collect_vec();

        let session = session
            .reduce(Event::RoleSeen {
                round,
                player: ids[0],
            })
            .reduce(Event::RoleSeen {
                round,
                player: ids[1],
            });
        assert!(!session.all_revealed());

        let session = session.reduce(Event::BeginDiscussion);
        assert_eq!(session.mode(), Mode::Distribution);

        let session = session
            .reduce(Event::RoleSeen {
                round,
                player: ids[2],
            })
            .reduce(Event::BeginDiscussion);
        assert_eq!(session.mode(), Mode::Discussion);
    }

    #[test]
    fn test_stale_role_seen_ignored() {
        let session = start(GameSession::default(), 3, 0);
        let stale_round = session.round();
        let id = session.players()[0].id;
        let session = start(session, 3, 1);

        let session = session.reduce(Event::RoleSeen {
            round: stale_round,
            player: id,
        });
        assert!(!session.players()[0].has_seen_role);
    }

    #[test]
    fn test_tally_imposter_won() {
        let session = tally_fixture().reduce(Event::Tally { imposter_won: true });

        let wins = session.players().iter().map(|p| p.wins).collect_vec();
        assert_eq!(wins, vec![1, 1, 0]);
        let winners = session.recent_winners().iter().map(|p| p.id).collect_vec();
        assert_eq!(winners, vec![session.players()[0].id]);
        assert_eq!(session.mode(), Mode::Celebration);
    }

    #[test]
    fn test_tally_crew_won() {
        let session = tally_fixture().reduce(Event::Tally {
            imposter_won: false,
        });

        let wins = session.players().iter().map(|p| p.wins).collect_vec();
        assert_eq!(wins, vec![0, 2, 1]);
        let winners = session.recent_winners().iter().map(|p| p.id).collect_vec();
        assert_eq!(
            winners,
            vec![session.players()[1].id, session.players()[2].id]
        );
    }

    #[test]
    fn test_tally_only_once_per_round() {
        let session = tally_fixture()
            .reduce(Event::Tally { imposter_won: true })
            .reduce(Event::Tally { imposter_won: true });
        assert_eq!(session.players()[0].wins, 1);
    }

    #[test]
    fn test_tally_outside_discussion_ignored() {
        let session = start(GameSession::default(), 3, 0);
        let after = session.clone().reduce(Event::Tally { imposter_won: true });
        assert_eq!(after, session);
    }

    #[test]
    fn test_next_round_preserves_identity() {
        let mut session = start(GameSession::default(), 4, 0);
        for ((player, name), wins) in session
            .players
            .iter_mut()
            .zip(["A", "B", "C", "D"])
            .zip([1, 0, 2, 0])
        {
            player.name = name.to_string();
            player.wins = wins;
        }
        let session = reveal_all(session)
            .reduce(Event::BeginDiscussion)
            .reduce(Event::Tally {
                imposter_won: false,
            });
        assert_eq!(session.recent_winners().len(), 3);

        let session = session.reduce(Event::NextRound {
            assignment: assignment(2),
            first_speaker: 3,
        });

        let names = session.players().iter().map(|p| p.name.as_str()).collect_vec();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
        let wins = session.players().iter().map(|p| p.wins).collect_vec();
        assert_eq!(wins, vec![1, 1, 3, 1]);
        assert_eq!(session.players().iter().filter(|p| p.is_imposter).count(), 1);
        assert!(session.players().iter().all(|p| !p.has_seen_role));
        assert_eq!(session.mode(), Mode::Distribution);
        assert!(session.recent_winners().is_empty());
        assert_eq!(session.first_speaker().map(|p| p.index), Some(4));
        assert_eq!(session.round(), 2);
    }

    #[test]
    fn test_next_round_without_players_goes_to_setup() {
        let session = GameSession::default().reduce(Event::NextRound {
            assignment: assignment(0),
            first_speaker: 0,
        });
        assert_eq!(session.mode(), Mode::Setup);
        assert_eq!(session.round(), 0);
    }

    #[test]
    fn test_reset_wins() {
        let session = tally_fixture()
            .reduce(Event::Tally { imposter_won: true })
            .reduce(Event::ResetWins);
        assert!(session.players().iter().all(|p| p.wins == 0));
        assert_eq!(session.mode(), Mode::Celebration);
        assert!(session.players()[0].is_imposter);
    }

    #[test]
    fn test_reset_to_setup() {
        let session = tally_fixture().reduce(Event::ResetToSetup);
        assert_eq!(session.mode(), Mode::Setup);
        assert!(session.players().is_empty());
        assert!(session.first_speaker().is_none());
        assert!(session.recent_winners().is_empty());
    }

    #[test]
    fn test_first_speaker_is_member() {
        let session = start(GameSession::default(), 3, 0);
        let speaker = session.first_speaker().unwrap();
        assert!(session.players().iter().any(|p| p.id == speaker.id));
    }

    #[test]
    fn test_sync_message_serialization() {
        let session = start(GameSession::default(), 3, 0);
        let json = serde_json::to_string(&SyncMessage::Session(session)).unwrap();
        assert!(json.contains("Session"));
        assert!(json.contains("Distribution"));
        assert!(json.contains("Beach"));
    }
}
