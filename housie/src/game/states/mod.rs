//! Session phase definitions for the Housie FSM.
//!
//! Each phase carries the timer it is waiting on, if any.

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

/// Externally visible lifecycle status of a session
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Waiting,
    Live,
    Ended,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Live => "live",
            Self::Ended => "ended",
        };
        write!(f, "{repr}")
    }
}

/// Why a session went live
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartReason {
    CountdownExpired,
    RoomFull,
    Host,
}

impl fmt::Display for StartReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::CountdownExpired => "countdown expired",
            Self::RoomFull => "room is full",
            Self::Host => "host started the game",
        };
        write!(f, "{repr}")
    }
}

/// Why a session ended
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    PoolExhausted,
    Host,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::PoolExhausted => "all numbers called",
            Self::Host => "host ended the game",
        };
        write!(f, "{repr}")
    }
}

/// Behavior that differs between session phases
#[enum_dispatch]
pub trait SessionPhase {
    fn status(&self) -> SessionStatus;

    /// Clock reading at which this phase next needs attention.
    fn deadline(&self) -> Option<Duration>;
}

/// Waiting for players; the countdown starts with the first join
#[derive(Debug, Default)]
pub struct Waiting {
    pub(crate) countdown_deadline: Option<Duration>,
}

impl SessionPhase for Waiting {
    fn status(&self) -> SessionStatus {
        SessionStatus::Waiting
    }

    fn deadline(&self) -> Option<Duration> {
        self.countdown_deadline
    }
}

/// Numbers are being called. Auto mode is on while a draw is scheduled.
#[derive(Debug, Default)]
pub struct Live {
    pub(crate) next_auto_draw: Option<Duration>,
}

impl Live {
    #[must_use]
    pub fn auto_mode(&self) -> bool {
        self.next_auto_draw.is_some()
    }
}

impl SessionPhase for Live {
    fn status(&self) -> SessionStatus {
        SessionStatus::Live
    }

    fn deadline(&self) -> Option<Duration> {
        self.next_auto_draw
    }
}

/// Terminal phase
#[derive(Debug)]
pub struct Ended {
    pub(crate) reason: EndReason,
}

impl Ended {
    #[must_use]
    pub fn reason(&self) -> EndReason {
        self.reason
    }
}

impl SessionPhase for Ended {
    fn status(&self) -> SessionStatus {
        SessionStatus::Ended
    }

    fn deadline(&self) -> Option<Duration> {
        None
    }
}

#[enum_dispatch(SessionPhase)]
#[derive(Debug)]
pub enum Phase {
    Waiting(Waiting),
    Live(Live),
    Ended(Ended),
}

impl Default for Phase {
    fn default() -> Self {
        Self::Waiting(Waiting::default())
    }
}
