use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;

use crate::models::Room;

/// Repository trait for room data access
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn get_room(
        &self,
        id: i32,
    ) -> Result<Option<Room>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_rooms(&self) -> Result<Vec<Room>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Fixed room list held in memory, used when no database is configured.
pub struct InMemoryRoomRepository {
    rooms: BTreeMap<i32, Room>,
}

impl InMemoryRoomRepository {
    pub fn new(rooms: Vec<Room>) -> Self {
        Self {
            rooms: rooms.into_iter().map(|r| (r.id, r)).collect(),
        }
    }

    /// Same rows the initial migration seeds.
    pub fn with_default_rooms() -> Self {
        let now = Utc::now();
        let room = |id: i32, name: &str| Room {
            id,
            room_name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        Self::new(vec![room(1, "General's Quarters"), room(2, "Major's Suite")])
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn get_room(
        &self,
        id: i32,
    ) -> Result<Option<Room>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.rooms.get(&id).cloned())
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.rooms.values().cloned().collect())
    }
}
