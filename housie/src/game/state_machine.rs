//! Housie session state machine.
//!
//! A [`GameSession`] owns the draw engine, every player's ticket and claim
//! state, and the pending timers. It never sleeps or spawns anything: the
//! caller polls [`GameSession::poll_timers`] once [`GameSession::next_timer_in`]
//! has elapsed, and drains the resulting [`GameEvent`]s.

use log::{debug, info};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, VecDeque},
    fmt,
    sync::Arc,
    time::Duration,
};

use super::{
    clock::Clock,
    constants::{DEFAULT_AUTO_DRAW_INTERVAL, DEFAULT_CAPACITY, DEFAULT_COUNTDOWN},
    draw::{DrawOutcome, NumberDrawEngine},
    entities::{
        CalledNumbers, ClaimState, Number, Points, Prize, PrizeStatus, Ticket, TicketId,
    },
    errors::{GameError, GameResult},
    functional::{Evaluation, evaluate},
    states::{EndReason, Ended, Live, Phase, SessionPhase, SessionStatus, StartReason},
    ticket::TicketGenerator,
};

/// Events that occur during a session
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PlayerJoined { ticket_id: TicketId, players: usize },
    CountdownStarted { seconds: u64 },
    SessionStarted { reason: StartReason },
    AutoModeChanged { enabled: bool },
    NumberDrawn { number: Number },
    PrizeAvailable { ticket_id: TicketId, prize: Prize },
    PrizeClaimed {
        ticket_id: TicketId,
        prize: Prize,
        points: Points,
    },
    SessionEnded { reason: EndReason },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::PlayerJoined { ticket_id, players } => {
                format!("ticket {ticket_id} joined ({players} players)")
            }
            Self::CountdownStarted { seconds } => format!("game starts in {seconds}s"),
            Self::SessionStarted { reason } => format!("game started: {reason}"),
            Self::AutoModeChanged { enabled: true } => "automatic calling on".to_string(),
            Self::AutoModeChanged { enabled: false } => "automatic calling off".to_string(),
            Self::NumberDrawn { number } => format!("number {number}"),
            Self::PrizeAvailable { ticket_id, prize } => {
                format!("ticket {ticket_id} can claim {prize}")
            }
            Self::PrizeClaimed {
                ticket_id,
                prize,
                points,
            } => format!("ticket {ticket_id} claimed {prize} for {points} points"),
            Self::SessionEnded { reason } => format!("game ended: {reason}"),
        };
        write!(f, "{repr}")
    }
}

/// Session configuration settings
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SessionSettings {
    /// Players (tickets) allowed in the session. Reaching it starts the game.
    pub capacity: usize,
    /// Delay between the first join and the automatic start.
    pub countdown: Duration,
    /// Time between numbers while auto mode is on.
    pub auto_draw_interval: Duration,
    /// Turn auto mode on as soon as the session goes live.
    pub auto_draw_on_start: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            countdown: DEFAULT_COUNTDOWN,
            auto_draw_interval: DEFAULT_AUTO_DRAW_INTERVAL,
            auto_draw_on_start: true,
        }
    }
}

impl SessionSettings {
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] for a zero capacity or a zero
    /// auto-draw interval.
    pub fn validate(&self) -> GameResult<()> {
        if self.capacity == 0 {
            return Err(GameError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }
        if self.auto_draw_interval.is_zero() {
            return Err(GameError::InvalidConfig(
                "auto draw interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// A player's ticket together with its prize statuses
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerEntry {
    pub ticket: Ticket,
    pub claims: ClaimState,
}

/// Points collected by one ticket
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Standing {
    pub ticket_id: TicketId,
    pub points: Points,
    pub claimed: Vec<Prize>,
}

/// Read-only summary of a session
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub players: usize,
    pub capacity: usize,
    pub called: CalledNumbers,
    pub last_called: Option<Number>,
    pub remaining: usize,
    pub auto_mode: bool,
    /// Whole seconds left before the game starts on its own.
    pub countdown_secs: Option<u64>,
    pub end_reason: Option<EndReason>,
}

/// Mutable session data shared across all phases
#[derive(Debug)]
pub struct SessionData {
    settings: SessionSettings,
    generator: TicketGenerator,
    engine: NumberDrawEngine,
    rng: StdRng,
    clock: Arc<dyn Clock>,
    players: BTreeMap<TicketId, PlayerEntry>,
    next_ticket_id: TicketId,
    /// Queue of events produced since the last drain.
    events: VecDeque<GameEvent>,
}

/// A single hosted game, from the waiting room to the last number.
#[derive(Debug)]
pub struct GameSession {
    data: SessionData,
    phase: Phase,
}

/// Timer that came due during [`GameSession::poll_timers`].
enum DueTimer {
    Countdown,
    AutoDraw(Duration),
}

impl GameSession {
    /// Creates a waiting session.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] if the settings don't validate.
    pub fn new(settings: SessionSettings, rng: StdRng, clock: Arc<dyn Clock>) -> GameResult<Self> {
        settings.validate()?;
        Ok(Self {
            data: SessionData {
                settings,
                generator: TicketGenerator::default(),
                engine: NumberDrawEngine::new(),
                rng,
                clock,
                players: BTreeMap::new(),
                next_ticket_id: 1,
                events: VecDeque::new(),
            },
            phase: Phase::default(),
        })
    }

    #[must_use]
    pub fn with_generator(mut self, generator: TicketGenerator) -> Self {
        self.data.generator = generator;
        self
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.phase.status()
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.data.settings
    }

    #[must_use]
    pub fn called(&self) -> &CalledNumbers {
        self.data.engine.called()
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.players.len()
    }

    #[must_use]
    pub fn ticket(&self, ticket_id: TicketId) -> Option<&Ticket> {
        self.data.players.get(&ticket_id).map(|entry| &entry.ticket)
    }

    #[must_use]
    pub fn claims(&self, ticket_id: TicketId) -> Option<&ClaimState> {
        self.data.players.get(&ticket_id).map(|entry| &entry.claims)
    }

    #[must_use]
    pub fn auto_mode(&self) -> bool {
        matches!(&self.phase, Phase::Live(live) if live.auto_mode())
    }

    pub fn drain_events(&mut self) -> VecDeque<GameEvent> {
        std::mem::take(&mut self.data.events)
    }

    /// Deals a ticket to a new player.
    ///
    /// The first join starts the countdown; the join that fills the room
    /// starts the game immediately, without announcing a countdown.
    ///
    /// # Errors
    ///
    /// Fails outside the waiting phase, when the room is full, or when
    /// no valid ticket could be generated.
    pub fn join(&mut self) -> GameResult<(TicketId, Ticket)> {
        self.expect_status("join", SessionStatus::Waiting)?;

        let capacity = self.data.settings.capacity;
        if self.data.players.len() >= capacity {
            return Err(GameError::RoomFull { capacity });
        }

        let ticket = self.data.generator.generate(&mut self.data.rng)?;
        let ticket_id = self.data.next_ticket_id;
        self.data.next_ticket_id += 1;
        self.data.players.insert(
            ticket_id,
            PlayerEntry {
                ticket: ticket.clone(),
                claims: ClaimState::new(),
            },
        );

        let players = self.data.players.len();
        info!("ticket {ticket_id} dealt ({players}/{capacity} players)");
        self.push(GameEvent::PlayerJoined { ticket_id, players });

        if players >= capacity {
            self.go_live(StartReason::RoomFull);
        } else if let Phase::Waiting(waiting) = &mut self.phase
            && waiting.countdown_deadline.is_none()
        {
            let countdown = self.data.settings.countdown;
            waiting.countdown_deadline = Some(self.data.clock.elapsed() + countdown);
            self.data.events.push_back(GameEvent::CountdownStarted {
                seconds: countdown.as_secs(),
            });
        }

        Ok((ticket_id, ticket))
    }

    /// Host start, skipping whatever is left of the countdown.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidTransition`] unless the session is waiting.
    pub fn start(&mut self) -> GameResult<()> {
        self.expect_status("start", SessionStatus::Waiting)?;
        self.go_live(StartReason::Host);
        Ok(())
    }

    /// Host end. Pending draws are dropped; claims stay open.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidTransition`] unless the session is live.
    pub fn end(&mut self) -> GameResult<()> {
        self.expect_status("end", SessionStatus::Live)?;
        self.finish(EndReason::Host);
        Ok(())
    }

    /// Turns automatic calling on or off.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidTransition`] unless the session is live.
    pub fn set_auto_mode(&mut self, enabled: bool) -> GameResult<()> {
        let status = self.status();
        let now = self.data.clock.elapsed();
        let interval = self.data.settings.auto_draw_interval;
        let Phase::Live(live) = &mut self.phase else {
            return Err(GameError::InvalidTransition {
                action: "change auto mode",
                status,
            });
        };

        if live.auto_mode() == enabled {
            return Ok(());
        }
        live.next_auto_draw = enabled.then(|| now + interval);
        info!("automatic calling {}", if enabled { "on" } else { "off" });
        self.push(GameEvent::AutoModeChanged { enabled });
        Ok(())
    }

    /// Host-triggered draw.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidTransition`] unless the session is live
    /// and [`GameError::AutoDrawActive`] while auto mode is on.
    pub fn manual_draw(&mut self) -> GameResult<DrawOutcome> {
        self.expect_status("draw", SessionStatus::Live)?;
        if self.auto_mode() {
            return Err(GameError::AutoDrawActive);
        }
        Ok(self.draw_next())
    }

    /// Claims an available prize for a ticket. Still honored after the
    /// session has ended.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownTicket`] or
    /// [`GameError::UnclaimablePrize`]; neither changes any state.
    pub fn claim(&mut self, ticket_id: TicketId, prize: Prize) -> GameResult<Points> {
        let entry = self
            .data
            .players
            .get_mut(&ticket_id)
            .ok_or(GameError::UnknownTicket(ticket_id))?;

        let points = entry.claims.claim(prize)?;
        info!("ticket {ticket_id} claimed {prize} for {points} points");
        self.push(GameEvent::PrizeClaimed {
            ticket_id,
            prize,
            points,
        });
        Ok(points)
    }

    /// Time left until the next timer is due.
    #[must_use]
    pub fn next_timer_in(&self) -> Option<Duration> {
        let now = self.data.clock.elapsed();
        self.phase
            .deadline()
            .map(|deadline| deadline.saturating_sub(now))
    }

    /// Fires every timer that is due, in order, and returns how many fired.
    ///
    /// Auto draws catch up one number per elapsed interval.
    pub fn poll_timers(&mut self) -> usize {
        let mut fired = 0;
        loop {
            let now = self.data.clock.elapsed();
            let due = match &self.phase {
                Phase::Waiting(waiting) => waiting
                    .countdown_deadline
                    .filter(|&deadline| deadline <= now)
                    .map(|_| DueTimer::Countdown),
                Phase::Live(live) => live
                    .next_auto_draw
                    .filter(|&deadline| deadline <= now)
                    .map(DueTimer::AutoDraw),
                Phase::Ended(_) => None,
            };

            match due {
                Some(DueTimer::Countdown) => self.go_live(StartReason::CountdownExpired),
                Some(DueTimer::AutoDraw(deadline)) => {
                    let interval = self.data.settings.auto_draw_interval;
                    if let Phase::Live(live) = &mut self.phase {
                        live.next_auto_draw = Some(deadline + interval);
                    }
                    self.draw_next();
                }
                None => break,
            }
            fired += 1;
        }
        fired
    }

    /// Points per ticket, best first.
    #[must_use]
    pub fn standings(&self) -> Vec<Standing> {
        let mut standings: Vec<Standing> = self
            .data
            .players
            .iter()
            .map(|(&ticket_id, entry)| Standing {
                ticket_id,
                points: entry.claims.points(),
                claimed: Prize::ALL
                    .into_iter()
                    .filter(|&prize| entry.claims.status(prize) == PrizeStatus::Claimed)
                    .collect(),
            })
            .collect();
        standings.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then_with(|| a.ticket_id.cmp(&b.ticket_id))
        });
        standings
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let called = self.data.engine.called();
        let now = self.data.clock.elapsed();
        let countdown_secs = match &self.phase {
            Phase::Waiting(waiting) => waiting
                .countdown_deadline
                .map(|deadline| deadline.saturating_sub(now).as_secs_f64().ceil() as u64),
            _ => None,
        };
        let end_reason = match &self.phase {
            Phase::Ended(ended) => Some(ended.reason()),
            _ => None,
        };

        SessionSnapshot {
            status: self.status(),
            players: self.data.players.len(),
            capacity: self.data.settings.capacity,
            called: called.clone(),
            last_called: called.last(),
            remaining: called.remaining(),
            auto_mode: self.auto_mode(),
            countdown_secs,
            end_reason,
        }
    }

    fn push(&mut self, event: GameEvent) {
        self.data.events.push_back(event);
    }

    fn expect_status(&self, action: &'static str, expected: SessionStatus) -> GameResult<()> {
        let status = self.status();
        if status == expected {
            Ok(())
        } else {
            Err(GameError::InvalidTransition { action, status })
        }
    }

    fn go_live(&mut self, reason: StartReason) {
        let auto = self.data.settings.auto_draw_on_start;
        let now = self.data.clock.elapsed();
        self.phase = Live {
            next_auto_draw: auto.then_some(now),
        }
        .into();

        info!(
            "game live with {} players: {reason}",
            self.data.players.len()
        );
        self.push(GameEvent::SessionStarted { reason });
        if auto {
            self.push(GameEvent::AutoModeChanged { enabled: true });
        }
    }

    fn finish(&mut self, reason: EndReason) {
        self.phase = Ended { reason }.into();
        info!(
            "game ended after {} numbers: {reason}",
            self.data.engine.called().len()
        );
        self.push(GameEvent::SessionEnded { reason });
    }

    /// Calls one number and evaluates every ticket against the result.
    fn draw_next(&mut self) -> DrawOutcome {
        let outcome = self.data.engine.draw(&mut self.data.rng);
        match outcome {
            DrawOutcome::Drawn(number) => {
                debug!(
                    "called {number} ({} remaining)",
                    self.data.engine.remaining()
                );
                self.push(GameEvent::NumberDrawn { number });
                self.evaluate_all();
                if self.data.engine.called().is_exhausted() {
                    self.finish(EndReason::PoolExhausted);
                }
            }
            DrawOutcome::Exhausted => self.finish(EndReason::PoolExhausted),
        }
        outcome
    }

    fn evaluate_all(&mut self) {
        let called = self.data.engine.called();
        for (&ticket_id, entry) in &mut self.data.players {
            let Evaluation {
                claims,
                newly_available,
            } = evaluate(&entry.ticket, called, &entry.claims);
            entry.claims = claims;
            for prize in newly_available {
                debug!("ticket {ticket_id} can claim {prize}");
                self.data
                    .events
                    .push_back(GameEvent::PrizeAvailable { ticket_id, prize });
            }
        }
    }
}
