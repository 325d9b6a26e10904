//! Console Housie host using the async room actor.
//!
//! Spawns one room, lets simulated players join it at a fixed pace, logs
//! every game event and prints the final standings as JSON.

mod config;

use std::time::Duration;

use anyhow::{Error, anyhow};
use ctrlc::set_handler;
use housie::{GameEvent, RoomHandle, RoomManager, room::RoomResponse};
use log::{info, warn};
use pico_args::Arguments;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

use config::HostConfig;

const HELP: &str = "\
Host a game of Housie in the console

USAGE:
  housie_host [OPTIONS]

OPTIONS:
  --players    N           Simulated players joining  [default: env HOUSIE_PLAYERS or 5]
  --seed       N           RNG seed for a repeatable game  [default: env HOUSIE_SEED or random]
  --name       NAME        Room name  [default: env HOUSIE_ROOM_NAME or \"Housie Party\"]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  HOUSIE_CAPACITY          Tickets dealt before the game starts on its own
  HOUSIE_COUNTDOWN_SECS    Seconds from the first join to the automatic start
  HOUSIE_AUTO_DRAW_SECS    Seconds between draws
  HOUSIE_AUTO_DRAW_ON_START  Let the room call numbers itself; when false the
                           host requests each draw at the same pace
  HOUSIE_JOIN_INTERVAL_MS  Delay between simulated joins
  HOUSIE_AUTO_CLAIM        Claim prizes as soon as they are available
  RUST_LOG                 Log filter (e.g., info, housie=debug)
";

/// Subscriber id used by the host's own event feed.
const HOST_SUBSCRIBER: u64 = 0;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let config = HostConfig::from_env(
        pargs.opt_value_from_str("--players")?,
        pargs.opt_value_from_str("--seed")?,
        pargs.opt_value_from_str("--name")?,
    )?;
    config.validate()?;

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();

    let manager = RoomManager::new();
    let room_id = manager
        .create_room(config.room.clone())
        .await
        .map_err(Error::msg)?;
    let handle = manager
        .get_room(room_id)
        .await
        .ok_or_else(|| anyhow!("room {room_id} disappeared after creation"))?;
    info!(
        "Room '{}' open for {} players (countdown {}s, draws every {}s)",
        config.room.name, config.room.capacity, config.room.countdown_secs, config.room.auto_draw_secs
    );

    host_game(&handle, &config).await?;

    let standings = handle.standings().await.map_err(Error::msg)?;
    println!("{}", serde_json::to_string_pretty(&standings)?);

    manager.close_room(room_id).await.map_err(Error::msg)?;

    Ok(())
}

/// Follows the room's event feed until the session ends.
///
/// Players join in the background. When the room doesn't call numbers on
/// its own, the host requests a draw every `auto_draw_secs` once the game
/// is live.
async fn host_game(handle: &RoomHandle, config: &HostConfig) -> Result<(), Error> {
    let mut events = handle
        .subscribe(HOST_SUBSCRIBER, 256)
        .await
        .map_err(Error::msg)?;
    let joiner = tokio::spawn(join_players(
        handle.clone(),
        config.players,
        config.join_interval,
    ));
    let mut caller: Option<JoinHandle<()>> = None;

    while let Some(event) = events.recv().await {
        info!("{event}");
        match event {
            GameEvent::SessionStarted { .. } if !config.room.auto_draw_on_start => {
                caller = Some(tokio::spawn(call_numbers(
                    handle.clone(),
                    Duration::from_secs(config.room.auto_draw_secs),
                )));
            }
            GameEvent::PrizeAvailable { ticket_id, prize } if config.auto_claim => {
                let response = handle
                    .claim(ticket_id, prize)
                    .await
                    .map_err(Error::msg)?;
                if let Some(message) = response.error_message() {
                    warn!("Claim of {prize} for ticket {ticket_id} refused: {message}");
                }
            }
            GameEvent::SessionEnded { .. } => break,
            _ => {}
        }
    }

    joiner.abort();
    if let Some(caller) = caller {
        caller.abort();
    }

    Ok(())
}

/// Requests one draw every `period` until the room stops drawing.
async fn call_numbers(handle: RoomHandle, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match handle.draw().await {
            Ok(RoomResponse::Drawn(_)) => {}
            Ok(response) => {
                info!(
                    "Host stopped calling: {}",
                    response.error_message().unwrap_or_default()
                );
                break;
            }
            Err(e) => {
                warn!("Room unavailable: {e}");
                break;
            }
        }
    }
}

/// Joins `players` simulated players, one every `interval`.
///
/// Stops early once the room no longer accepts joins.
async fn join_players(handle: RoomHandle, players: usize, interval: Duration) {
    for _ in 0..players {
        tokio::time::sleep(interval).await;
        match handle.join().await {
            Ok(RoomResponse::Joined { ticket_id, ticket }) => {
                info!("Dealt ticket {ticket_id}:\n{ticket}");
            }
            Ok(response) => {
                warn!(
                    "Join refused: {}",
                    response.error_message().unwrap_or_default()
                );
                break;
            }
            Err(e) => {
                warn!("Room unavailable: {e}");
                break;
            }
        }
    }
}
