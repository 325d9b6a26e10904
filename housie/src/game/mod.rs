//! Housie game engine - tickets, number calling and the session FSM.
//!
//! This module provides the foundational game implementation including:
//! - Ticket generation under the 3x9 layout rules
//! - A draw engine over the 1-90 pool
//! - Pure prize evaluation against the numbers called so far
//! - The waiting/live/ended session state machine and its events

pub mod clock;
pub mod constants;
pub mod draw;
pub mod entities;
pub mod errors;
pub mod functional;
pub mod state_machine;
pub mod states;
pub mod ticket;

pub use clock::{Clock, ManualClock, SystemClock};
pub use draw::{DrawOutcome, NumberDrawEngine};
pub use errors::{CalledNumbersError, GameError, GameResult, TicketError};
pub use state_machine::{
    GameEvent, GameSession, PlayerEntry, SessionSettings, SessionSnapshot, Standing,
};
pub use states::{EndReason, SessionStatus, StartReason};
pub use ticket::TicketGenerator;
