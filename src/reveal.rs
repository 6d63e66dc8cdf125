//! Per-player reveal cards
//!
//! Each player gets a fresh [`CardRevealController`] every round. The card
//! starts face down, is turned over by the player's first tap, and is
//! turned back and locked by a second tap or, if timed reveals are on,
//! automatically once the countdown runs out. A locked card ignores any
//! further interaction for the rest of the round.
//!
//! Both ways of concealing a card go through the same flip-back delay
//! before the lock takes effect. The delay and the countdown are the only
//! deferred work and are both driven by a [`RevealTimer`].

use serde::{Deserialize, Serialize};
use web_time::{Duration, Instant};

use crate::{
    constants::reveal::{LOCK_DELAY, REVEAL_DURATION},
    game::Event,
    player::{Id, Player},
    timer::{RevealTimer, Token},
};

/// Where a card is in its once-per-round lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealPhase {
    /// Face down, waiting for the player
    #[default]
    Hidden,
    /// Face up, the player is reading their role
    Revealed,
    /// Flipping back; the lock takes effect once the flip finishes
    Concealing,
    /// Face down for good, terminal for the round
    Locked,
}

/// What a player sees on the face of their card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleCard {
    /// The shared secret topic
    Topic {
        /// The round's topic
        topic: String,
    },
    /// The player is the odd one out
    Imposter {
        /// Optional nudge about the topic
        hint: Option<String>,
    },
}

/// Deferred reveal events delivered back by the host scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// The reveal countdown ran out
    AutoConceal {
        /// Owner of the card
        player: Id,
        /// Round the card belongs to
        round: u32,
        /// Timer token the alarm was issued with
        token: Token,
    },
    /// The flip-back finished and the card should lock
    Lock {
        /// Owner of the card
        player: Id,
        /// Round the card belongs to
        round: u32,
        /// Timer token the alarm was issued with
        token: Token,
    },
}

impl AlarmMessage {
    /// The player whose card scheduled this alarm
    pub fn player(&self) -> Id {
        match self {
            Self::AutoConceal { player, .. } | Self::Lock { player, .. } => *player,
        }
    }

    /// The round this alarm was scheduled in
    pub fn round(&self) -> u32 {
        match self {
            Self::AutoConceal { round, .. } | Self::Lock { round, .. } => *round,
        }
    }
}

/// Snapshot of a card for the view layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SyncMessage {
    /// Current card state
    Card {
        /// Owner of the card
        player: Id,
        /// Owner's display name
        name: String,
        /// Lifecycle phase
        phase: RevealPhase,
        /// Remaining countdown from 1.0 to 0.0 while a timed reveal runs
        countdown: Option<f32>,
        /// Card face, only present while revealed
        card: Option<RoleCard>,
    },
}

/// Reveal state machine for one player's card in one round
#[derive(Debug)]
pub struct CardRevealController {
    player: Id,
    name: String,
    round: u32,
    card: RoleCard,
    timed: bool,
    reveal_duration: Duration,
    phase: RevealPhase,
    timer: RevealTimer,
    /// Start of the running countdown, cleared whenever no countdown runs
    revealed_at: Option<Instant>,
}

impl CardRevealController {
    /// Creates a face-down card for a player
    ///
    /// # Arguments
    ///
    /// * `player` - The player record this card belongs to
    /// * `round` - The round the card is valid for
    /// * `card` - What the card shows when turned over
    /// * `timed` - Whether the card conceals itself after [`REVEAL_DURATION`]
    pub fn new(player: &Player, round: u32, card: RoleCard, timed: bool) -> Self {
        Self {
            player: player.id,
            name: player.name.clone(),
            round,
            card,
            timed,
            reveal_duration: REVEAL_DURATION,
            phase: RevealPhase::Hidden,
            timer: RevealTimer::default(),
            revealed_at: None,
        }
    }

    /// Overrides the countdown length for timed reveals
    #[must_use]
    pub fn with_reveal_duration(mut self, reveal_duration: Duration) -> Self {
        self.reveal_duration = reveal_duration;
        self
    }

    /// Handles a tap on the card
    ///
    /// The first tap reveals the card and yields the [`Event::RoleSeen`] the
    /// caller must dispatch to the engine. A tap while revealed conceals the
    /// card and cancels any countdown. Taps in any other phase are ignored.
    ///
    /// # Arguments
    ///
    /// * `schedule_message` - Function to schedule delayed messages for timing
    pub fn interact<S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        schedule_message: S,
    ) -> Option<Event> {
        match self.phase {
            RevealPhase::Hidden => {
                self.phase = RevealPhase::Revealed;
                if self.timed {
                    self.revealed_at = Some(Instant::now());
                    let (player, round) = (self.player, self.round);
                    self.timer.start(self.reveal_duration, schedule_message, |token| {
                        AlarmMessage::AutoConceal {
                            player,
                            round,
                            token,
                        }
                        .into()
                    });
                }
                tracing::debug!(player = %self.player, round = self.round, "card revealed");
                Some(Event::RoleSeen {
                    round: self.round,
                    player: self.player,
                })
            }
            RevealPhase::Revealed => {
                self.conceal(schedule_message);
                None
            }
            RevealPhase::Concealing | RevealPhase::Locked => {
                tracing::debug!(player = %self.player, phase = ?self.phase, "tap ignored");
                None
            }
        }
    }

    /// Handles a delivered reveal alarm
    ///
    /// Alarms for another player or round, and alarms whose timer was
    /// cancelled or superseded, are dropped.
    ///
    /// # Returns
    ///
    /// `true` if the alarm moved the card to a new phase
    pub fn receive_alarm<S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        message: &AlarmMessage,
        schedule_message: S,
    ) -> bool {
        if message.player() != self.player || message.round() != self.round {
            return false;
        }

        match *message {
            AlarmMessage::AutoConceal { token, .. } => {
                if self.timer.fire(token) && self.phase == RevealPhase::Revealed {
                    self.conceal(schedule_message);
                    true
                } else {
                    tracing::debug!(player = %self.player, "stale conceal alarm dropped");
                    false
                }
            }
            AlarmMessage::Lock { token, .. } => {
                if self.timer.fire(token) && self.phase == RevealPhase::Concealing {
                    self.phase = RevealPhase::Locked;
                    tracing::debug!(player = %self.player, round = self.round, "card locked");
                    true
                } else {
                    tracing::debug!(player = %self.player, "stale lock alarm dropped");
                    false
                }
            }
        }
    }

    /// Cancels pending work and resets the countdown
    ///
    /// Called when the view hosting the card goes away. Any alarm still in
    /// flight is ignored when it arrives.
    pub fn dispose(&mut self) {
        if self.timer.cancel() {
            tracing::debug!(player = %self.player, phase = ?self.phase, "pending alarm cancelled");
        }
        self.revealed_at = None;
    }

    fn conceal<S: FnMut(crate::AlarmMessage, Duration)>(&mut self, schedule_message: S) {
        self.timer.cancel();
        self.revealed_at = None;
        self.phase = RevealPhase::Concealing;
        let (player, round) = (self.player, self.round);
        self.timer
            .start(LOCK_DELAY, schedule_message, |token| {
                AlarmMessage::Lock {
                    player,
                    round,
                    token,
                }
                .into()
            });
    }

    /// The player this card belongs to
    pub fn player(&self) -> Id {
        self.player
    }

    /// The round this card belongs to
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    /// Whether the card face is currently showing
    pub fn is_face_up(&self) -> bool {
        self.phase == RevealPhase::Revealed
    }

    /// Whether the card can no longer be revealed this round
    pub fn is_locked(&self) -> bool {
        self.phase == RevealPhase::Locked
    }

    /// The card face, visible only while revealed
    pub fn card(&self) -> Option<&RoleCard> {
        self.is_face_up().then_some(&self.card)
    }

    /// Remaining countdown at `now`, decaying linearly from 1.0 to 0.0
    ///
    /// `None` when no timed reveal is running.
    pub fn countdown_at(&self, now: Instant) -> Option<f32> {
        let started = self.revealed_at?;
        if self.phase != RevealPhase::Revealed {
            return None;
        }
        if self.reveal_duration.is_zero() {
            return Some(0.);
        }
        let elapsed = now.saturating_duration_since(started);
        Some((1. - elapsed.as_secs_f32() / self.reveal_duration.as_secs_f32()).clamp(0., 1.))
    }

    /// Remaining countdown right now
    pub fn countdown(&self) -> Option<f32> {
        self.countdown_at(Instant::now())
    }

    /// Snapshot of the card for the view layer
    pub fn sync_message(&self) -> SyncMessage {
        SyncMessage::Card {
            player: self.player,
            name: self.name.clone(),
            phase: self.phase,
            countdown: self.countdown(),
            card: self.card().cloned(),
        }
    }
}

impl Drop for CardRevealController {
    fn drop(&mut self) {
        self.dispose();
    }
}
