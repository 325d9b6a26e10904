/// Integration tests for the room actor
///
/// Time is paused, so tokio jumps straight to the next pending timer and
/// countdowns and draw cadences resolve instantly and deterministically.
use housie::{
    GameEvent, Prize, RoomActor, RoomConfig, RoomHandle, SessionStatus,
    game::{EndReason, StartReason},
    room::RoomResponse,
};
use tokio::{sync::mpsc, time::Duration};

fn spawn_room(config: RoomConfig) -> RoomHandle {
    let (actor, handle) = RoomActor::new(1, config).unwrap();
    tokio::spawn(actor.run());
    handle
}

fn seeded(capacity: usize, auto_draw_on_start: bool) -> RoomConfig {
    RoomConfig {
        capacity,
        auto_draw_on_start,
        seed: Some(2024),
        ..RoomConfig::default()
    }
}

async fn next_event(events: &mut mpsc::Receiver<GameEvent>) -> GameEvent {
    events.recv().await.expect("room dropped the subscriber")
}

#[tokio::test(start_paused = true)]
async fn test_full_room_starts_and_draws() {
    let handle = spawn_room(seeded(2, true));
    let mut events = handle.subscribe(1, 64).await.unwrap();

    assert!(handle.join().await.unwrap().is_success());
    assert!(handle.join().await.unwrap().is_success());

    assert!(matches!(
        next_event(&mut events).await,
        GameEvent::PlayerJoined { players: 1, .. }
    ));
    assert_eq!(
        next_event(&mut events).await,
        GameEvent::CountdownStarted { seconds: 60 }
    );
    assert!(matches!(
        next_event(&mut events).await,
        GameEvent::PlayerJoined { players: 2, .. }
    ));
    assert_eq!(
        next_event(&mut events).await,
        GameEvent::SessionStarted {
            reason: StartReason::RoomFull,
        }
    );
    assert_eq!(
        next_event(&mut events).await,
        GameEvent::AutoModeChanged { enabled: true }
    );
    assert!(matches!(
        next_event(&mut events).await,
        GameEvent::NumberDrawn { .. }
    ));

    assert_eq!(
        handle.join().await.unwrap(),
        RoomResponse::InvalidAction("can't join while the session is live".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_countdown_expiry_starts_room() {
    let handle = spawn_room(seeded(5, true));
    handle.join().await.unwrap();

    tokio::time::sleep(Duration::from_secs(30)).await;
    let state = handle.state().await.unwrap();
    assert_eq!(state.session.status, SessionStatus::Waiting);
    assert_eq!(state.session.countdown_secs, Some(30));

    tokio::time::sleep(Duration::from_secs(31)).await;
    let state = handle.state().await.unwrap();
    assert_eq!(state.session.status, SessionStatus::Live);
    assert_eq!(state.session.called.len(), 1);
    assert!(state.session.auto_mode);
}

#[tokio::test(start_paused = true)]
async fn test_manual_draw_blocked_while_auto() {
    let handle = spawn_room(seeded(5, true));
    handle.join().await.unwrap();
    assert_eq!(handle.start().await.unwrap(), RoomResponse::Success);

    assert_eq!(handle.draw().await.unwrap(), RoomResponse::AutoDrawActive);

    assert_eq!(
        handle.set_auto_mode(false).await.unwrap(),
        RoomResponse::Success
    );
    let before = handle.state().await.unwrap().session.called.len();
    assert!(matches!(
        handle.draw().await.unwrap(),
        RoomResponse::Drawn(_)
    ));

    // No automatic draw sneaks in afterwards
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(
        handle.state().await.unwrap().session.called.len(),
        before + 1
    );
}

#[tokio::test(start_paused = true)]
async fn test_claim_through_handle() {
    let handle = spawn_room(seeded(5, false));
    let mut events = handle.subscribe(7, 256).await.unwrap();

    let RoomResponse::Joined { ticket_id, ticket } = handle.join().await.unwrap() else {
        panic!("join should deal a ticket");
    };
    assert_eq!(handle.ticket(ticket_id).await.unwrap(), Some(ticket));
    handle.start().await.unwrap();

    // Draw until the first prize for this ticket shows up
    let prize = loop {
        assert!(handle.draw().await.unwrap().is_success());
        let mut found = None;
        while let Ok(event) = events.try_recv() {
            if let GameEvent::PrizeAvailable { ticket_id: id, prize } = event
                && id == ticket_id
            {
                found.get_or_insert(prize);
            }
        }
        if let Some(prize) = found {
            break prize;
        }
    };
    assert_eq!(prize, Prize::EarlyFive);

    assert_eq!(
        handle.claim(ticket_id, prize).await.unwrap(),
        RoomResponse::Claimed { prize, points: 25 }
    );
    let again = handle.claim(ticket_id, prize).await.unwrap();
    assert!(!again.is_success());
    assert!(again.error_message().is_some());

    assert_eq!(
        handle.claim(999, Prize::FullHouse).await.unwrap(),
        RoomResponse::UnknownTicket
    );

    let standings = handle.standings().await.unwrap();
    assert_eq!(standings[0].ticket_id, ticket_id);
    assert_eq!(standings[0].points, 25);
}

#[tokio::test(start_paused = true)]
async fn test_auto_draw_calls_every_number() {
    let handle = spawn_room(seeded(1, true));
    let mut events = handle.subscribe(1, 512).await.unwrap();
    handle.join().await.unwrap();

    let mut drawn = Vec::new();
    let reason = loop {
        match next_event(&mut events).await {
            GameEvent::NumberDrawn { number } => drawn.push(number),
            GameEvent::SessionEnded { reason } => break reason,
            _ => {}
        }
    };

    assert_eq!(reason, EndReason::PoolExhausted);
    drawn.sort_unstable();
    assert_eq!(drawn, (1..=90).collect::<Vec<u8>>());

    let state = handle.state().await.unwrap();
    assert_eq!(state.session.status, SessionStatus::Ended);
    assert!(!state.session.auto_mode);
}

#[tokio::test(start_paused = true)]
async fn test_unsubscribed_receives_nothing() {
    let handle = spawn_room(seeded(5, false));
    let mut events = handle.subscribe(3, 16).await.unwrap();
    handle.unsubscribe(3).await.unwrap();

    handle.join().await.unwrap();
    assert!(events.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_close_stops_actor() {
    let handle = spawn_room(seeded(5, false));
    assert_eq!(handle.close().await.unwrap(), RoomResponse::Success);
    assert!(handle.state().await.is_err());
}
