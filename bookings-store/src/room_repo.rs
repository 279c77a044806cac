use async_trait::async_trait;
use bookings_core::models::Room;
use bookings_core::repository::RoomRepository;
use sqlx::PgPool;

pub struct StoreRoomRepository {
    pool: PgPool,
}

impl StoreRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct RoomRow {
    id: i32,
    room_name: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: row.id,
            room_name: row.room_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl RoomRepository for StoreRoomRepository {
    async fn get_room(
        &self,
        id: i32,
    ) -> Result<Option<Room>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, RoomRow>(
            "SELECT id, room_name, created_at, updated_at FROM rooms WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Room::from))
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, RoomRow>(
            "SELECT id, room_name, created_at, updated_at FROM rooms ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Room::from).collect())
    }
}
