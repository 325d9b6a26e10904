//! Room actor implementation with async message handling.

use super::{
    config::RoomConfig,
    messages::{RoomId, RoomMessage, RoomResponse, RoomStateResponse},
};
use crate::game::{
    Clock, DrawOutcome, GameError, GameEvent, GameSession, SessionStatus, Standing,
    entities::{Prize, Ticket, TicketId},
};
use std::{collections::HashMap, future, sync::Arc};
use tokio::{
    sync::{mpsc, oneshot},
    time::{Duration, Instant, sleep},
};

/// Inbox size for each room.
const INBOX_CAPACITY: usize = 100;

/// Clock driven by tokio's timer, so paused test runtimes control it.
#[derive(Debug)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Room actor handle for sending messages
#[derive(Clone, Debug)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    room_id: RoomId,
}

impl RoomHandle {
    /// Create a new room handle
    pub fn new(sender: mpsc::Sender<RoomMessage>, room_id: RoomId) -> Self {
        Self { sender, room_id }
    }

    /// Get room ID
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Send a message to the room
    pub async fn send(&self, message: RoomMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .await
            .map_err(|_| "Room is closed".to_string())
    }

    /// Send a message carrying a responder and wait for the reply
    ///
    /// # Arguments
    ///
    /// * `build` - Builds the message around the response sender
    ///
    /// # Returns
    ///
    /// * `Result<T, String>` - Reply, or an error if the room is gone
    pub async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RoomMessage,
    ) -> Result<T, String> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx)).await?;
        rx.await
            .map_err(|_| "Failed to receive response".to_string())
    }

    pub async fn join(&self) -> Result<RoomResponse, String> {
        self.request(|response| RoomMessage::Join { response }).await
    }

    pub async fn start(&self) -> Result<RoomResponse, String> {
        self.request(|response| RoomMessage::Start { response }).await
    }

    pub async fn end(&self) -> Result<RoomResponse, String> {
        self.request(|response| RoomMessage::End { response }).await
    }

    pub async fn set_auto_mode(&self, enabled: bool) -> Result<RoomResponse, String> {
        self.request(|response| RoomMessage::SetAutoMode { enabled, response })
            .await
    }

    pub async fn draw(&self) -> Result<RoomResponse, String> {
        self.request(|response| RoomMessage::Draw { response }).await
    }

    pub async fn claim(&self, ticket_id: TicketId, prize: Prize) -> Result<RoomResponse, String> {
        self.request(|response| RoomMessage::Claim {
            ticket_id,
            prize,
            response,
        })
        .await
    }

    pub async fn state(&self) -> Result<RoomStateResponse, String> {
        self.request(|response| RoomMessage::GetState { response })
            .await
    }

    pub async fn ticket(&self, ticket_id: TicketId) -> Result<Option<Ticket>, String> {
        self.request(|response| RoomMessage::GetTicket {
            ticket_id,
            response,
        })
        .await
    }

    pub async fn standings(&self) -> Result<Vec<Standing>, String> {
        self.request(|response| RoomMessage::GetStandings { response })
            .await
    }

    /// Subscribe to game events
    ///
    /// Events are dropped for this subscriber while its channel is full.
    pub async fn subscribe(
        &self,
        subscriber_id: u64,
        buffer: usize,
    ) -> Result<mpsc::Receiver<GameEvent>, String> {
        let (sender, receiver) = mpsc::channel(buffer);
        self.send(RoomMessage::Subscribe {
            subscriber_id,
            sender,
        })
        .await?;
        Ok(receiver)
    }

    pub async fn unsubscribe(&self, subscriber_id: u64) -> Result<(), String> {
        self.send(RoomMessage::Unsubscribe { subscriber_id }).await
    }

    pub async fn close(&self) -> Result<RoomResponse, String> {
        self.request(|response| RoomMessage::Close { response }).await
    }
}

/// Room actor hosting a single Housie session
pub struct RoomActor {
    /// Room ID
    id: RoomId,

    /// Room configuration
    config: RoomConfig,

    /// Housie session (FSM)
    session: GameSession,

    /// Message inbox
    inbox: mpsc::Receiver<RoomMessage>,

    /// Is room closed
    is_closed: bool,

    /// Subscribers for game events
    subscribers: HashMap<u64, mpsc::Sender<GameEvent>>,
}

impl RoomActor {
    /// Create a new room actor
    ///
    /// # Arguments
    ///
    /// * `id` - Room ID
    /// * `config` - Room configuration
    ///
    /// # Returns
    ///
    /// * `Result<(RoomActor, RoomHandle), String>` - Actor and handle, or a
    ///   configuration error
    pub fn new(id: RoomId, config: RoomConfig) -> Result<(Self, RoomHandle), String> {
        Self::with_clock(id, config, Arc::new(TokioClock::new()))
    }

    /// Create a room actor reading time from `clock`
    pub fn with_clock(
        id: RoomId,
        config: RoomConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<(Self, RoomHandle), String> {
        config.validate()?;

        let session = GameSession::new(config.session_settings(), config.rng(), clock)
            .map_err(|e| e.to_string())?;
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);

        let actor = Self {
            id,
            config,
            session,
            inbox,
            is_closed: false,
            subscribers: HashMap::new(),
        };

        let handle = RoomHandle::new(sender, id);

        Ok((actor, handle))
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        log::info!("Room {} '{}' starting", self.id, self.config.name);

        loop {
            let wait = self.session.next_timer_in();

            tokio::select! {
                message = self.inbox.recv() => {
                    match message {
                        Some(message) => self.handle_message(message),
                        None => {
                            log::debug!("Room {}: every handle dropped", self.id);
                            break;
                        }
                    }
                }

                // Countdown expiry and automatic draws
                () = sleep_or_pending(wait) => {
                    let fired = self.session.poll_timers();
                    log::trace!("Room {}: {} timer(s) fired", self.id, fired);
                }
            }

            self.broadcast_events();

            if self.is_closed {
                break;
            }
        }

        log::info!("Room {} '{}' closed", self.id, self.config.name);
    }

    /// Handle a room message
    fn handle_message(&mut self, message: RoomMessage) {
        match message {
            RoomMessage::Join { response } => {
                let result = match self.session.join() {
                    Ok((ticket_id, ticket)) => RoomResponse::Joined { ticket_id, ticket },
                    Err(e) => e.into(),
                };
                let _ = response.send(result);
            }

            RoomMessage::Start { response } => {
                let _ = response.send(into_response(self.session.start()));
            }

            RoomMessage::End { response } => {
                let _ = response.send(into_response(self.session.end()));
            }

            RoomMessage::SetAutoMode { enabled, response } => {
                let _ = response.send(into_response(self.session.set_auto_mode(enabled)));
            }

            RoomMessage::Draw { response } => {
                let result = match self.session.manual_draw() {
                    Ok(DrawOutcome::Drawn(number)) => RoomResponse::Drawn(number),
                    Ok(DrawOutcome::Exhausted) => RoomResponse::PoolExhausted,
                    Err(GameError::InvalidTransition {
                        status: SessionStatus::Ended,
                        ..
                    }) if self.session.called().is_exhausted() => RoomResponse::PoolExhausted,
                    Err(e) => e.into(),
                };
                let _ = response.send(result);
            }

            RoomMessage::Claim {
                ticket_id,
                prize,
                response,
            } => {
                let result = match self.session.claim(ticket_id, prize) {
                    Ok(points) => RoomResponse::Claimed { prize, points },
                    Err(e) => {
                        log::debug!("Room {}: claim by ticket {} refused: {}", self.id, ticket_id, e);
                        e.into()
                    }
                };
                let _ = response.send(result);
            }

            RoomMessage::GetState { response } => {
                let _ = response.send(RoomStateResponse {
                    room_id: self.id,
                    room_name: self.config.name.clone(),
                    session: self.session.snapshot(),
                });
            }

            RoomMessage::GetTicket {
                ticket_id,
                response,
            } => {
                let _ = response.send(self.session.ticket(ticket_id).cloned());
            }

            RoomMessage::GetStandings { response } => {
                let _ = response.send(self.session.standings());
            }

            RoomMessage::Subscribe {
                subscriber_id,
                sender,
            } => {
                log::debug!("Room {}: subscriber {} added", self.id, subscriber_id);
                self.subscribers.insert(subscriber_id, sender);
            }

            RoomMessage::Unsubscribe { subscriber_id } => {
                log::debug!("Room {}: subscriber {} removed", self.id, subscriber_id);
                self.subscribers.remove(&subscriber_id);
            }

            RoomMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(RoomResponse::Success);
            }
        }
    }

    /// Forward queued session events to every subscriber
    fn broadcast_events(&mut self) {
        for event in self.session.drain_events() {
            log::debug!("Room {}: {}", self.id, event);
            self.subscribers.retain(|subscriber_id, sender| {
                match sender.try_send(event.clone()) {
                    Ok(()) => true,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        log::warn!("Subscriber {} channel full, dropping event", subscriber_id);
                        true
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        log::debug!("Subscriber {} disconnected, removing", subscriber_id);
                        false
                    }
                }
            });
        }
    }
}

fn into_response(result: crate::game::GameResult<()>) -> RoomResponse {
    match result {
        Ok(()) => RoomResponse::Success,
        Err(e) => e.into(),
    }
}

async fn sleep_or_pending(wait: Option<Duration>) {
    match wait {
        Some(wait) => sleep(wait).await,
        None => future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ManualClock;

    fn config() -> RoomConfig {
        RoomConfig {
            capacity: 3,
            seed: Some(5),
            ..RoomConfig::default()
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RoomConfig {
            capacity: 0,
            ..RoomConfig::default()
        };
        assert!(RoomActor::new(1, config).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_follows_runtime_time() {
        let clock = TokioClock::new();
        assert_eq!(clock.elapsed(), Duration::ZERO);
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(clock.elapsed(), Duration::from_secs(5));
    }

    #[test]
    fn test_draw_after_pool_runs_dry() {
        let clock = Arc::new(ManualClock::new());
        let config = RoomConfig {
            capacity: 1,
            auto_draw_on_start: false,
            ..config()
        };
        let (mut actor, _handle) = RoomActor::with_clock(2, config, clock).unwrap();

        let (tx, _rx) = oneshot::channel();
        actor.handle_message(RoomMessage::Join { response: tx });
        for _ in 0..90 {
            let (tx, mut rx) = oneshot::channel();
            actor.handle_message(RoomMessage::Draw { response: tx });
            assert!(matches!(rx.try_recv().unwrap(), RoomResponse::Drawn(_)));
        }
        assert_eq!(actor.session.status(), SessionStatus::Ended);

        let (tx, mut rx) = oneshot::channel();
        actor.handle_message(RoomMessage::Draw { response: tx });
        assert_eq!(rx.try_recv().unwrap(), RoomResponse::PoolExhausted);
    }

    #[test]
    fn test_join_and_state_messages() {
        let clock = Arc::new(ManualClock::new());
        let (mut actor, _handle) = RoomActor::with_clock(1, config(), clock).unwrap();

        let (tx, mut rx) = oneshot::channel();
        actor.handle_message(RoomMessage::Join { response: tx });
        assert!(matches!(
            rx.try_recv().unwrap(),
            RoomResponse::Joined { ticket_id: 1, .. }
        ));

        let (tx, mut rx) = oneshot::channel();
        actor.handle_message(RoomMessage::GetState { response: tx });
        let state = rx.try_recv().unwrap();
        assert_eq!(state.room_id, 1);
        assert_eq!(state.session.players, 1);
        assert_eq!(state.session.status, SessionStatus::Waiting);
    }

    #[test]
    fn test_draw_before_start_is_invalid() {
        let clock = Arc::new(ManualClock::new());
        let (mut actor, _handle) = RoomActor::with_clock(2, config(), clock).unwrap();

        let (tx, mut rx) = oneshot::channel();
        actor.handle_message(RoomMessage::Draw { response: tx });
        assert!(matches!(
            rx.try_recv().unwrap(),
            RoomResponse::InvalidAction(_)
        ));
    }

    #[test]
    fn test_closed_subscriber_removed() {
        let clock = Arc::new(ManualClock::new());
        let (mut actor, _handle) = RoomActor::with_clock(3, config(), clock).unwrap();

        let (sender, receiver) = mpsc::channel(8);
        actor.handle_message(RoomMessage::Subscribe {
            subscriber_id: 9,
            sender,
        });
        drop(receiver);

        let (tx, _rx) = oneshot::channel();
        actor.handle_message(RoomMessage::Join { response: tx });
        actor.broadcast_events();
        assert!(actor.subscribers.is_empty());
    }

    #[test]
    fn test_full_subscriber_kept() {
        let clock = Arc::new(ManualClock::new());
        let (mut actor, _handle) = RoomActor::with_clock(4, config(), clock).unwrap();

        let (sender, mut receiver) = mpsc::channel(1);
        actor.handle_message(RoomMessage::Subscribe {
            subscriber_id: 1,
            sender,
        });

        // PlayerJoined and CountdownStarted, only one fits.
        let (tx, _rx) = oneshot::channel();
        actor.handle_message(RoomMessage::Join { response: tx });
        actor.broadcast_events();

        assert_eq!(actor.subscribers.len(), 1);
        assert!(matches!(
            receiver.try_recv().unwrap(),
            GameEvent::PlayerJoined { .. }
        ));
        assert!(receiver.try_recv().is_err());
    }
}
