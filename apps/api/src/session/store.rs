use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::Client as RedisClient;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::{Session, SessionStore};

const KEY_PREFIX: &str = "listing:session:";

/// Process-local store with the same sliding TTL as the Redis backend.
/// Expired sessions read as missing and are swept on the next save.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Uuid, (Session, Instant)>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: ttl.max(Duration::from_secs(1)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<Session>, AppError> {
        let now = Instant::now();
        Ok(self
            .sessions
            .read()
            .await
            .get(&id)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(session, _)| session.clone()))
    }

    async fn save(&self, session: &Session) -> Result<(), AppError> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, (_, expires_at)| *expires_at > now);
        if sessions.len() < before {
            debug!(evicted = before - sessions.len(), "Expired sessions evicted");
        }
        sessions.insert(session.id, (session.clone(), now + self.ttl));
        Ok(())
    }
}

/// Redis-backed store. Each session is one JSON value with a sliding TTL.
pub struct RedisSessionStore {
    client: RedisClient,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub fn new(client: RedisClient, ttl_seconds: u64) -> Self {
        Self {
            client,
            ttl_seconds,
        }
    }
}

fn key(id: Uuid) -> String {
    format!("{KEY_PREFIX}{id}")
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<Session>, AppError> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(key(id))
            .query_async(&mut con)
            .await?;

        match raw {
            Some(json) => {
                let session = serde_json::from_str(&json).map_err(|e| {
                    AppError::SessionStore(format!("Corrupt session {id}: {e}"))
                })?;
                Ok(Some(session))
            }
            None => {
                debug!(session_id = %id, "Session not found in Redis");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<(), AppError> {
        let json = serde_json::to_string(session)
            .map_err(|e| AppError::SessionStore(format!("Failed to serialize session: {e}")))?;
        let mut con = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(key(session.id))
            .arg(json)
            .arg("EX")
            .arg(self.ttl_seconds.max(1))
            .query_async::<_, ()>(&mut con)
            .await?;
        Ok(())
    }
}
