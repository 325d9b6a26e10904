//! Room manager for spawning and managing multiple room actors.

use super::{
    actor::{RoomActor, RoomHandle},
    config::RoomConfig,
    messages::{RoomId, RoomStateResponse},
};
use crate::game::SessionStatus;
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

/// Room metadata for discovery
#[derive(Debug, Clone, Serialize)]
pub struct RoomMetadata {
    pub id: RoomId,
    pub name: String,
    pub players: usize,
    pub capacity: usize,
    pub status: SessionStatus,
    pub numbers_called: usize,
}

impl From<RoomStateResponse> for RoomMetadata {
    fn from(state: RoomStateResponse) -> Self {
        Self {
            id: state.room_id,
            name: state.room_name,
            players: state.session.players,
            capacity: state.session.capacity,
            status: state.session.status,
            numbers_called: state.session.called.len(),
        }
    }
}

/// Room manager for managing multiple room instances
#[derive(Clone, Default)]
pub struct RoomManager {
    /// Active room handles
    rooms: Arc<RwLock<HashMap<RoomId, RoomHandle>>>,

    /// Next room ID
    next_room_id: Arc<RwLock<RoomId>>,
}

impl RoomManager {
    /// Create a new room manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and spawn a new room
    ///
    /// # Arguments
    ///
    /// * `config` - Room configuration
    ///
    /// # Returns
    ///
    /// * `Result<RoomId, String>` - Room ID or error
    pub async fn create_room(&self, config: RoomConfig) -> Result<RoomId, String> {
        // Validate before an ID is handed out
        config.validate()?;

        let mut next_id = self.next_room_id.write().await;
        *next_id += 1;
        let room_id = *next_id;
        drop(next_id);

        let (actor, handle) = RoomActor::new(room_id, config)?;

        let mut rooms = self.rooms.write().await;
        rooms.insert(room_id, handle);
        drop(rooms);

        tokio::spawn(async move {
            actor.run().await;
        });

        log::info!("Created and spawned room {}", room_id);

        Ok(room_id)
    }

    /// Get a room handle
    pub async fn get_room(&self, room_id: RoomId) -> Option<RoomHandle> {
        let rooms = self.rooms.read().await;
        rooms.get(&room_id).cloned()
    }

    /// List all active rooms, ordered by ID
    ///
    /// Rooms whose actor has already stopped are skipped.
    pub async fn list_rooms(&self) -> Vec<RoomMetadata> {
        let handles: Vec<RoomHandle> = {
            let rooms = self.rooms.read().await;
            rooms.values().cloned().collect()
        };

        let mut metadata_list = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.state().await {
                Ok(state) => metadata_list.push(state.into()),
                Err(e) => log::warn!("Room {} unavailable: {}", handle.room_id(), e),
            }
        }
        metadata_list.sort_by_key(|metadata: &RoomMetadata| metadata.id);
        metadata_list
    }

    /// Close a room
    ///
    /// # Arguments
    ///
    /// * `room_id` - Room ID
    ///
    /// # Returns
    ///
    /// * `Result<(), String>` - Success or error
    pub async fn close_room(&self, room_id: RoomId) -> Result<(), String> {
        let handle = self
            .rooms
            .write()
            .await
            .remove(&room_id)
            .ok_or_else(|| "Room not found".to_string())?;

        // The actor may already be gone; the room is unlisted either way
        if let Err(e) = handle.close().await {
            log::debug!("Room {} close: {}", room_id, e);
        }

        log::info!("Closed room {}", room_id);

        Ok(())
    }

    /// Get active room count
    pub async fn active_room_count(&self) -> usize {
        let rooms = self.rooms.read().await;
        rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_list_rooms() {
        let manager = RoomManager::new();
        let first = manager.create_room(RoomConfig::default()).await.unwrap();
        let second = manager
            .create_room(RoomConfig {
                name: "Second".to_string(),
                ..RoomConfig::default()
            })
            .await
            .unwrap();
        assert_eq!((first, second), (1, 2));

        let rooms = manager.list_rooms().await;
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[1].name, "Second");
        assert_eq!(rooms[0].status, SessionStatus::Waiting);
    }

    #[tokio::test]
    async fn test_invalid_room_not_created() {
        let manager = RoomManager::new();
        let result = manager
            .create_room(RoomConfig {
                name: String::new(),
                ..RoomConfig::default()
            })
            .await;
        assert!(result.is_err());
        assert_eq!(manager.active_room_count().await, 0);
    }

    #[tokio::test]
    async fn test_close_room() {
        let manager = RoomManager::new();
        let room_id = manager.create_room(RoomConfig::default()).await.unwrap();
        let handle = manager.get_room(room_id).await.unwrap();

        manager.close_room(room_id).await.unwrap();
        assert!(manager.get_room(room_id).await.is_none());
        assert!(handle.state().await.is_err());
        assert!(manager.close_room(room_id).await.is_err());
    }
}
