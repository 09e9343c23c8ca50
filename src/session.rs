//! Login-stub sessions. Each session owns exactly one ledger; logout drops both.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::ledger::{Ledger, SellPolicy};

pub type SessionId = Uuid;

pub type SharedSessions = Arc<RwLock<HashMap<SessionId, Session>>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("email is required")]
    EmailRequired,
    #[error("session not found")]
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub user: User,
    pub ledger: Ledger,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: SharedSessions,
    sell_policy: SellPolicy,
}

impl SessionStore {
    pub fn new(sell_policy: SellPolicy) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            sell_policy,
        }
    }

    /// Opens a session for `email`. No credentials are checked.
    pub async fn login(
        &self,
        email: &str,
        name: Option<String>,
    ) -> Result<(SessionId, User), SessionError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(SessionError::EmailRequired);
        }
        let user = User {
            email: email.to_lowercase(),
            name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        };
        let session = Session {
            id: Uuid::new_v4(),
            user: user.clone(),
            ledger: Ledger::with_policy(self.sell_policy),
            created_at: Utc::now(),
        };
        let id = session.id;

        self.sessions.write().await.insert(id, session);
        tracing::info!(session_id = %id, email = %user.email, "session opened");
        Ok((id, user))
    }

    /// Removes the session and resets its ledger to empty. Returns whether
    /// one existed.
    pub async fn logout(&self, id: SessionId) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(mut session) => {
                tracing::info!(
                    session_id = %id,
                    open_positions = session.ledger.len(),
                    "session closed"
                );
                session.ledger.clear();
                true
            }
            None => {
                tracing::debug!(session_id = %id, "logout for unknown session");
                false
            }
        }
    }

    pub async fn contains(&self, id: SessionId) -> bool {
        self.sessions.read().await.contains_key(&id)
    }

    pub async fn user(&self, id: SessionId) -> Result<User, SessionError> {
        self.with_session(id, |s| s.user.clone()).await
    }

    /// Runs `f` against the session under the read lock.
    pub async fn with_session<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&Session) -> T,
    ) -> Result<T, SessionError> {
        let guard = self.sessions.read().await;
        guard.get(&id).map(f).ok_or(SessionError::NotFound)
    }

    /// Runs `f` against the session under the write lock, so a whole
    /// read-modify-write on its ledger is one critical section.
    pub async fn with_session_mut<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, SessionError> {
        let mut guard = self.sessions.write().await;
        guard.get_mut(&id).map(f).ok_or(SessionError::NotFound)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
