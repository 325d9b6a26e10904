//! Room module hosting Housie sessions with an async actor model.
//!
//! Each room runs in its own Tokio task with an mpsc message inbox. The
//! actor owns a [`GameSession`](crate::game::GameSession), sleeps until the
//! session's next timer is due, and forwards session events to
//! subscribers. The [`RoomManager`] spawns rooms and keeps their handles.
//!
//! ## Example
//!
//! ```no_run
//! use housie::room::{RoomActor, RoomConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), String> {
//!     let (actor, handle) = RoomActor::new(1, RoomConfig::default())?;
//!     tokio::spawn(actor.run());
//!
//!     let joined = handle.join().await?;
//!     assert!(joined.is_success());
//!     Ok(())
//! }
//! ```

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;

pub use actor::{RoomActor, RoomHandle, TokioClock};
pub use config::RoomConfig;
pub use manager::{RoomManager, RoomMetadata};
pub use messages::{RoomId, RoomMessage, RoomResponse, RoomStateResponse};
