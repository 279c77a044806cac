use async_trait::async_trait;
use bookings_core::session::{SessionError, SessionResult, SessionStore};
use redis::{AsyncCommands, RedisResult};
use tracing::debug;

/// Sessions as Redis hashes: `session:{id}` maps keys to JSON values and
/// expires `lifetime_seconds` after the last write.
#[derive(Clone)]
pub struct RedisSessionStore {
    client: redis::Client,
    lifetime_seconds: u64,
}

impl RedisSessionStore {
    pub async fn new(connection_string: &str, lifetime_seconds: u64) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        // Fail at startup rather than on the first visitor.
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(Self { client, lifetime_seconds })
    }

    fn key(session_id: &str) -> String {
        format!("session:{}", session_id)
    }

    async fn hset_session_field(&self, session_id: &str, field: &str, value: &str) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::key(session_id);
        let _: () = redis::pipe()
            .atomic()
            .hset(&key, field, value)
            .ignore()
            .expire(&key, self.lifetime_seconds as i64)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn hget_session_field(&self, session_id: &str, field: &str) -> RedisResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.hget(Self::key(session_id), field).await
    }

    async fn hdel_session_field(&self, session_id: &str, field: &str) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.hdel::<_, _, ()>(Self::key(session_id), field).await
    }

    async fn hpop_session_field(&self, session_id: &str, field: &str) -> RedisResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::key(session_id);
        let (value,): (Option<String>,) = redis::pipe()
            .atomic()
            .hget(&key, field)
            .hdel(&key, field)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }
}

fn backend(err: redis::RedisError) -> SessionError {
    SessionError::Backend(err.to_string())
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn insert(&self, session_id: &str, key: &str, value: String) -> SessionResult<()> {
        debug!("Session {} set '{}'", session_id, key);
        self.hset_session_field(session_id, key, &value).await.map_err(backend)
    }

    async fn load(&self, session_id: &str, key: &str) -> SessionResult<Option<String>> {
        self.hget_session_field(session_id, key).await.map_err(backend)
    }

    async fn delete(&self, session_id: &str, key: &str) -> SessionResult<()> {
        self.hdel_session_field(session_id, key).await.map_err(backend)
    }

    async fn take(&self, session_id: &str, key: &str) -> SessionResult<Option<String>> {
        self.hpop_session_field(session_id, key).await.map_err(backend)
    }
}
