//! Room actor message types.

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::game::{
    GameError, GameEvent, SessionSnapshot, Standing,
    entities::{Number, Points, Prize, PrizeStatus, Ticket, TicketId},
};

/// Identifier of a room within a [`RoomManager`](super::RoomManager)
pub type RoomId = u64;

/// Messages that can be sent to a RoomActor
#[derive(Debug)]
pub enum RoomMessage {
    /// Deal a ticket to a new player
    Join {
        response: oneshot::Sender<RoomResponse>,
    },

    /// Host start, skipping the countdown
    Start {
        response: oneshot::Sender<RoomResponse>,
    },

    /// Host end
    End {
        response: oneshot::Sender<RoomResponse>,
    },

    /// Switch automatic calling on or off
    SetAutoMode {
        enabled: bool,
        response: oneshot::Sender<RoomResponse>,
    },

    /// Host-triggered draw
    Draw {
        response: oneshot::Sender<RoomResponse>,
    },

    /// Claim an available prize
    Claim {
        ticket_id: TicketId,
        prize: Prize,
        response: oneshot::Sender<RoomResponse>,
    },

    /// Get current room state
    GetState {
        response: oneshot::Sender<RoomStateResponse>,
    },

    /// Get the ticket dealt under an id
    GetTicket {
        ticket_id: TicketId,
        response: oneshot::Sender<Option<Ticket>>,
    },

    /// Get points per ticket, best first
    GetStandings {
        response: oneshot::Sender<Vec<Standing>>,
    },

    /// Subscribe to game events
    Subscribe {
        subscriber_id: u64,
        sender: mpsc::Sender<GameEvent>,
    },

    /// Unsubscribe from game events
    Unsubscribe { subscriber_id: u64 },

    /// Close the room and stop the actor
    Close {
        response: oneshot::Sender<RoomResponse>,
    },
}

/// Response from room operations
#[derive(Debug, Clone, PartialEq)]
pub enum RoomResponse {
    /// Operation succeeded
    Success,

    /// Ticket dealt
    Joined { ticket_id: TicketId, ticket: Ticket },

    /// Number called
    Drawn(Number),

    /// Draw refused because every number has already been called
    PoolExhausted,

    /// Prize claimed
    Claimed { prize: Prize, points: Points },

    /// Room is full
    RoomFull,

    /// Request not allowed in the current phase
    InvalidAction(String),

    /// Manual draw while automatic calling is on
    AutoDrawActive,

    /// Prize is not available for this ticket
    NotClaimable { prize: Prize, status: PrizeStatus },

    /// No ticket with this id
    UnknownTicket,

    /// Operation failed
    Error(String),
}

impl RoomResponse {
    /// Check if response is success
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RoomResponse::Success
                | RoomResponse::Joined { .. }
                | RoomResponse::Drawn(_)
                | RoomResponse::Claimed { .. }
        )
    }

    /// Get error message if response is error
    pub fn error_message(&self) -> Option<String> {
        match self {
            RoomResponse::Error(msg) => Some(msg.clone()),
            RoomResponse::PoolExhausted => Some("All numbers have been called".to_string()),
            RoomResponse::RoomFull => Some("Room is full".to_string()),
            RoomResponse::InvalidAction(msg) => Some(format!("Invalid action: {msg}")),
            RoomResponse::AutoDrawActive => Some("Automatic calling is on".to_string()),
            RoomResponse::NotClaimable { prize, status } => {
                Some(format!("{prize} is not claimable ({status})"))
            }
            RoomResponse::UnknownTicket => Some("Unknown ticket".to_string()),
            _ => None,
        }
    }
}

impl From<GameError> for RoomResponse {
    fn from(error: GameError) -> Self {
        match error {
            GameError::RoomFull { .. } => Self::RoomFull,
            GameError::InvalidTransition { .. } => Self::InvalidAction(error.to_string()),
            GameError::AutoDrawActive => Self::AutoDrawActive,
            GameError::UnclaimablePrize { prize, status } => Self::NotClaimable { prize, status },
            GameError::UnknownTicket(_) => Self::UnknownTicket,
            GameError::GenerationInvariantFailure { .. } | GameError::InvalidConfig(_) => {
                Self::Error(error.to_string())
            }
        }
    }
}

/// Room state response
#[derive(Debug, Clone, Serialize)]
pub struct RoomStateResponse {
    /// Room ID
    pub room_id: RoomId,

    /// Room name
    pub room_name: String,

    /// Session summary
    pub session: SessionSnapshot,
}
