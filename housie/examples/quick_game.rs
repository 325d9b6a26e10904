//! Quick Game Example
//!
//! Deals a few tickets, calls numbers by hand and claims prizes as soon as
//! they become available.

use housie::{DrawOutcome, GameEvent, GameSession, SessionSettings, SystemClock};
use rand::{SeedableRng, rngs::StdRng};
use std::sync::Arc;

fn main() {
    let settings = SessionSettings {
        capacity: 3,
        auto_draw_on_start: false,
        ..SessionSettings::default()
    };
    let mut session = GameSession::new(
        settings,
        StdRng::seed_from_u64(2024),
        Arc::new(SystemClock::new()),
    )
    .expect("default settings are valid");

    println!("=== Housie Quick Game ===\n");
    for _ in 0..3 {
        let (ticket_id, ticket) = session.join().expect("room has space");
        println!("Ticket {ticket_id}:\n{ticket}");
    }

    while let Ok(DrawOutcome::Drawn(_)) = session.manual_draw() {
        for event in session.drain_events() {
            match event {
                GameEvent::PrizeAvailable { ticket_id, prize } => {
                    let points = session.claim(ticket_id, prize).expect("prize is available");
                    println!("Ticket {ticket_id} wins {prize} (+{points})");
                }
                GameEvent::NumberDrawn { .. } | GameEvent::SessionEnded { .. } => {
                    println!("{event}");
                }
                _ => {}
            }
        }
    }

    println!("\nFinal standings:");
    for standing in session.standings() {
        println!("  ticket {}: {} points", standing.ticket_id, standing.points);
    }
}
