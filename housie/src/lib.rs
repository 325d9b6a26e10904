//! # Housie
//!
//! A Housie (Tambola) engine built around a small finite state machine.
//!
//! The library deals valid 3x9 tickets, calls numbers from the 1-90 pool
//! without repeats, and tracks the five classic prizes for every ticket in
//! a session. Sessions move through three phases using `enum_dispatch`:
//!
//! - **Waiting**: players join; the first join starts the countdown
//! - **Live**: numbers are called by hand or on a fixed cadence
//! - **Ended**: the pool ran dry or the host stopped the game
//!
//! ## Core Modules
//!
//! - [`game`]: Tickets, draw engine, prize evaluation and the session FSM
//! - [`room`]: Async actor hosting a session behind a message inbox
//!
//! ## Example
//!
//! ```
//! use housie::{GameSession, ManualClock, SessionSettings};
//! use rand::{SeedableRng, rngs::StdRng};
//! use std::sync::Arc;
//!
//! let clock = Arc::new(ManualClock::new());
//! let mut session =
//!     GameSession::new(SessionSettings::default(), StdRng::seed_from_u64(7), clock).unwrap();
//! let (ticket_id, ticket) = session.join().unwrap();
//! assert_eq!(ticket.numbers().count(), 15);
//! assert!(session.ticket(ticket_id).is_some());
//! ```

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    CalledNumbersError, Clock, DrawOutcome, GameError, GameEvent, GameResult, GameSession,
    ManualClock, SessionSettings, SessionSnapshot, SessionStatus, Standing, SystemClock,
    TicketError, TicketGenerator,
    constants,
    entities::{self, CalledNumbers, ClaimState, Prize, PrizeStatus, Ticket},
    functional,
};

/// Hosted rooms running as tokio actors.
pub mod room;
pub use room::{RoomActor, RoomConfig, RoomHandle, RoomManager};
