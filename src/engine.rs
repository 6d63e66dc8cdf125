//! The game engine
//!
//! [`GameEngine`] wraps a [`GameSession`] with everything the reducer must
//! not touch: the random generator, the name store, the topic catalog and
//! the subscribers. Each operation resolves its inputs into an [`Event`],
//! runs the reducer, persists what needs persisting and pushes the new
//! snapshot to every subscriber.
//!
//! Store failures never abort a transition. A failed read is treated as
//! "nothing stored" and a failed write is logged; the in-memory session
//! stays authoritative.

use itertools::Itertools;

use crate::{
    SyncMessage,
    assigner::{self, Assignment},
    constants::clamp_player_count,
    game::{self, Event, GameSession, Mode},
    player::Id,
    reveal::{CardRevealController, RoleCard},
    session::Subscriber,
    settings::Settings,
    store::NameStore,
    topics::TopicCatalog,
};

/// Drives a session on behalf of the host
pub struct GameEngine<N, C> {
    session: GameSession,
    names: N,
    catalog: C,
    settings: Settings,
    rng: fastrand::Rng,
    subscribers: Vec<Box<dyn Subscriber>>,
}

impl<N, C> std::fmt::Debug for GameEngine<N, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("session", &self.session)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<N: NameStore, C: TopicCatalog> GameEngine<N, C> {
    /// Creates an engine in setup mode
    ///
    /// # Arguments
    ///
    /// * `names` - Where player names are persisted between sessions
    /// * `catalog` - Source of topics and hints
    pub fn new(names: N, catalog: C) -> Self {
        Self {
            session: GameSession::default(),
            names,
            catalog,
            settings: Settings::default(),
            rng: fastrand::Rng::new(),
            subscribers: Vec::new(),
        }
    }

    /// Replaces the random generator, e.g. with a seeded one
    #[must_use]
    pub fn with_rng(mut self, rng: fastrand::Rng) -> Self {
        self.rng = rng;
        self
    }

    /// Registers a subscriber for state snapshots
    pub fn subscribe<S: Subscriber + 'static>(&mut self, subscriber: S) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// The current session
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// The injected name store
    pub fn name_store(&self) -> &N {
        &self.names
    }

    /// Settings in effect for the current round
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces the settings used for cards and hints
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Applies an event and notifies subscribers
    ///
    /// This is also how reveal cards report back: the [`Event::RoleSeen`]
    /// returned by [`CardRevealController::interact`] is dispatched here.
    pub fn dispatch(&mut self, event: Event) -> &GameSession {
        self.session = std::mem::take(&mut self.session).reduce(event);
        self.publish();
        &self.session
    }

    fn publish(&self) {
        if self.subscribers.is_empty() {
            return;
        }
        let message: SyncMessage = game::SyncMessage::Session(self.session.clone()).into();
        for subscriber in &self.subscribers {
            subscriber.send_state(&message);
        }
    }

    fn draw(&mut self, player_count: usize) -> (Assignment, usize) {
        let assignment = assigner::assign_with(&mut self.rng, player_count, &self.catalog);
        let first_speaker = self.rng.usize(..player_count.max(1));
        (assignment, first_speaker)
    }

    fn stored_names(&self) -> Option<Vec<String>> {
        self.names.get_names().unwrap_or_else(|error| {
            tracing::warn!(%error, "could not read stored names");
            None
        })
    }

    /// Deals a new round
    ///
    /// Reuses the current players if `player_count` matches the roster
    /// size, otherwise seats fresh players with default names and no wins.
    /// With `requires_name_entry` the session waits on the name entry
    /// screen, pre-filled from the name store; otherwise cards are handed
    /// out right away.
    ///
    /// # Arguments
    ///
    /// * `player_count` - Number of seats; callers should clamp it to the supported range
    /// * `requires_name_entry` - Whether to collect names first
    pub fn start_round(&mut self, player_count: usize, requires_name_entry: bool) {
        let (assignment, first_speaker) = self.draw(player_count);
        let stored_names = if requires_name_entry {
            self.stored_names()
        } else {
            None
        };

        tracing::info!(
            player_count,
            requires_name_entry,
            round = self.session.round() + 1,
            "round started"
        );
        self.dispatch(Event::StartRound {
            player_count,
            assignment,
            stored_names,
            name_entry: requires_name_entry,
            first_speaker,
        });
    }

    /// Adopts `settings` and deals a round from them
    pub fn start_round_with(&mut self, settings: Settings) {
        self.settings = settings;
        self.start_round(
            clamp_player_count(settings.player_count),
            settings.requires_name_entry(),
        );
    }

    /// Accepts the names typed on the name entry screen
    ///
    /// Names are trimmed, blanks fall back to the seat's default name, and
    /// the cleaned list is saved to the name store. Ignored outside name entry.
    pub fn confirm_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.session.mode() != Mode::NameEntry {
            tracing::debug!(mode = ?self.session.mode(), "names confirmed outside name entry");
            return;
        }

        let first_speaker = self.rng.usize(..self.session.players().len().max(1));
        self.dispatch(Event::ConfirmNames {
            names: names.into_iter().map(Into::into).collect_vec(),
            first_speaker,
        });

        let cleaned = self
            .session
            .players()
            .iter()
            .map(|p| p.name.clone())
            .collect_vec();
        if let Err(error) = self.names.set_names(&cleaned) {
            tracing::warn!(%error, "could not save player names");
        }
    }

    /// Forgets stored names and restores every seat's default name
    pub fn reset_names(&mut self) {
        if let Err(error) = self.names.clear_names() {
            tracing::warn!(%error, "could not clear stored names");
        }
        self.dispatch(Event::ResetNames);
    }

    /// Whether every player has seen their card
    pub fn all_revealed(&self) -> bool {
        self.session.all_revealed()
    }

    /// Moves to discussion once every card has been seen
    ///
    /// # Returns
    ///
    /// `true` if the session is now in discussion
    pub fn begin_discussion(&mut self) -> bool {
        self.dispatch(Event::BeginDiscussion).mode() == Mode::Discussion
    }

    /// Records the round outcome and moves to celebration
    pub fn tally(&mut self, imposter_won: bool) {
        self.dispatch(Event::Tally { imposter_won });
    }

    /// Deals another round to the same table, keeping names and wins
    ///
    /// Returns to setup if there is no table.
    pub fn prepare_next_round(&mut self) {
        let player_count = self.session.players().len();
        let (assignment, first_speaker) = self.draw(player_count);
        self.dispatch(Event::NextRound {
            assignment,
            first_speaker,
        });
    }

    /// Sets every win count back to zero
    pub fn reset_wins(&mut self) {
        self.dispatch(Event::ResetWins);
    }

    /// Discards the table and returns to setup
    pub fn reset_to_setup(&mut self) {
        self.dispatch(Event::ResetToSetup);
    }

    /// What a player's card shows this round
    ///
    /// The imposter gets the catalog's hint for the topic if hints are on.
    pub fn card_for(&self, player: Id) -> Option<RoleCard> {
        let player = self.session.player(player)?;
        let topic = self.session.topic();

        Some(if player.is_imposter {
            RoleCard::Imposter {
                hint: self
                    .settings
                    .hints_enabled
                    .then(|| self.catalog.hint(topic))
                    .flatten()
                    .map(ToOwned::to_owned),
            }
        } else {
            RoleCard::Topic {
                topic: topic.to_owned(),
            }
        })
    }

    /// Fresh face-down cards for every player in the current round
    pub fn reveal_controllers(&self) -> Vec<CardRevealController> {
        let round = self.session.round();
        self.session
            .players()
            .iter()
            .filter_map(|player| {
                let card = self.card_for(player.id)?;
                Some(
                    CardRevealController::new(
                        player,
                        round,
                        card,
                        self.settings.timed_flip_enabled,
                    )
                    .with_reveal_duration(self.settings.reveal_duration),
                )
            })
            .collect_vec()
    }
}
