use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::User;

/// A signed-in user, addressable by its opaque bearer token.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Session {
    pub token: Uuid,
    pub usuario: User,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(usuario: User) -> Self {
        Self {
            token: Uuid::new_v4(),
            usuario,
            created_at: Utc::now(),
        }
    }
}

/// Persistence of the current session, injected into whatever needs the
/// caller's identity.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, token: Uuid) -> Option<Session>;
    async fn save(&self, session: Session);
    async fn clear(&self, token: Uuid);
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, token: Uuid) -> Option<Session> {
        self.sessions.read().await.get(&token).cloned()
    }

    async fn save(&self, session: Session) {
        self.sessions.write().await.insert(session.token, session);
    }

    async fn clear(&self, token: Uuid) {
        self.sessions.write().await.remove(&token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usuario() -> User {
        User {
            id: Uuid::new_v4(),
            nombre: "Prueba".into(),
            email: "prueba@textil.com".into(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn save_load_clear_round_trip() {
        let store = MemorySessionStore::new();
        let session = Session::new(usuario());
        let token = session.token;

        store.save(session).await;
        let loaded = store.load(token).await.expect("session stored");
        assert_eq!(loaded.token, token);

        store.clear(token).await;
        assert!(store.load(token).await.is_none());
    }

    #[tokio::test]
    async fn unknown_token_loads_nothing() {
        let store = MemorySessionStore::new();
        assert!(store.load(Uuid::new_v4()).await.is_none());
    }
}
