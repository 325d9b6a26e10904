//! Game error types.

use thiserror::Error;

use super::{
    entities::{Number, Prize, PrizeStatus, TicketId},
    states::SessionStatus,
};

/// A broken ticket layout rule.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TicketError {
    #[error("ticket holds {found} numbers, expected 15")]
    WrongTotal { found: usize },

    #[error("row {row} holds {found} numbers, expected 5")]
    RowCount { row: usize, found: usize },

    #[error("column {column} holds {found} numbers, expected 1 to 3")]
    ColumnCount { column: usize, found: usize },

    #[error("{value} does not belong in column {column}")]
    OutOfBand { column: usize, value: Number },

    #[error("column {column} is not in ascending order")]
    NotAscending { column: usize },

    #[error("{0} appears more than once")]
    Duplicate(Number),

    #[error("no number left in the band of column {column}")]
    BandExhausted { column: usize },

    #[error("rows still unbalanced after {steps} repair steps")]
    RepairStalled { steps: usize },
}

/// A called-number list that could not have come out of a draw.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum CalledNumbersError {
    #[error("{0} is outside the 1-90 pool")]
    OutOfPool(Number),

    #[error("{0} was called more than once")]
    Repeated(Number),
}

/// Errors surfaced by the game session and its components
#[derive(Debug, Error)]
pub enum GameError {
    /// Ticket generation kept producing invalid layouts
    #[error("ticket generation failed after {attempts} attempts: {last}")]
    GenerationInvariantFailure { attempts: usize, last: TicketError },

    /// Request not allowed in the current session status
    #[error("can't {action} while the session is {status}")]
    InvalidTransition {
        action: &'static str,
        status: SessionStatus,
    },

    /// Claim for a prize that is not available
    #[error("{prize} is not claimable ({status})")]
    UnclaimablePrize { prize: Prize, status: PrizeStatus },

    /// Manual draw while numbers are called automatically
    #[error("automatic calling is on")]
    AutoDrawActive,

    #[error("room is full ({capacity} players)")]
    RoomFull { capacity: usize },

    #[error("ticket {0} does not exist")]
    UnknownTicket(TicketId),

    #[error("invalid settings: {0}")]
    InvalidConfig(String),
}

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;
