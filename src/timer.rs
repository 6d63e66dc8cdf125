//! Cancellable single-shot alarms
//!
//! The game core never sleeps or spawns. A deferred callback is expressed as
//! an [`AlarmMessage`](crate::AlarmMessage) handed to a host-provided
//! scheduler together with a delay; the host delivers the message back when
//! the delay elapses. [`RevealTimer`] stamps each alarm with a [`Token`] so
//! that an alarm which was cancelled, or superseded, is recognised and
//! dropped when it eventually arrives.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::AlarmMessage;

/// Identifies one scheduled alarm of a [`RevealTimer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token(u64);

/// A single pending deferred callback that can be cancelled
///
/// At most one alarm is live at a time. Starting a new one implicitly
/// invalidates the previous token.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RevealTimer {
    /// The token of the alarm that is allowed to fire, if any
    pending: Option<Token>,
    /// Number of tokens handed out so far
    issued: u64,
}

impl RevealTimer {
    /// Schedules an alarm after `duration`
    ///
    /// # Arguments
    ///
    /// * `duration` - Delay before the host should deliver the alarm
    /// * `schedule_message` - Host scheduler receiving the alarm and its delay
    /// * `alarm` - Builds the alarm message carrying the issued token
    ///
    /// # Returns
    ///
    /// The token that will be accepted by [`RevealTimer::fire`]
    pub fn start<S, A>(&mut self, duration: Duration, mut schedule_message: S, alarm: A) -> Token
    where
        S: FnMut(AlarmMessage, Duration),
        A: FnOnce(Token) -> AlarmMessage,
    {
        self.issued += 1;
        let token = Token(self.issued);
        self.pending = Some(token);
        schedule_message(alarm(token), duration);
        token
    }

    /// Cancels the pending alarm
    ///
    /// # Returns
    ///
    /// `true` if an alarm was pending
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Consumes a delivered alarm
    ///
    /// # Returns
    ///
    /// `true` if `token` is the live alarm; stale or cancelled tokens return `false`
    pub fn fire(&mut self, token: Token) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Whether an alarm is currently live
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Virtual-clock scheduler for single-threaded hosts and tests
///
/// Alarms are recorded with their due time and released in due order as
/// the clock is advanced. Alarms due at the same instant keep their
/// scheduling order.
#[derive(Debug, Default)]
pub struct AlarmQueue {
    now: Duration,
    sequence: u64,
    pending: Vec<(Duration, u64, AlarmMessage)>,
}

impl AlarmQueue {
    /// Records an alarm due `after` the current virtual time
    pub fn schedule(&mut self, message: AlarmMessage, after: Duration) {
        self.sequence += 1;
        self.pending.push((self.now + after, self.sequence, message));
    }

    /// Returns a scheduler closure suitable for the `schedule_message` parameters
    pub fn scheduler(&mut self) -> impl FnMut(AlarmMessage, Duration) + '_ {
        move |message, after| self.schedule(message, after)
    }

    /// Moves the clock forward and returns every alarm that became due
    pub fn advance(&mut self, by: Duration) -> Vec<AlarmMessage> {
        self.now += by;
        let now = self.now;
        let (due, pending): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|(at, _, _)| *at <= now);
        self.pending = pending;
        due.into_iter()
            .sorted_by_key(|(at, sequence, _)| (*at, *sequence))
            .map(|(_, _, message)| message)
            .collect_vec()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of alarms not yet released
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no alarms are waiting
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
