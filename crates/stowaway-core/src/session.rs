use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A user-id-bearing credential for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub access_token: Option<String>,
}

/// Produces a session at startup. Which strategy runs underneath (demo
/// account sign-in, anonymous auth, a real login screen) is the
/// implementation's concern; the core only needs a credential, injected
/// once.
pub trait SessionProvider: Send + Sync {
    fn ensure_session(&self) -> Result<Session>;
}

/// Fixed credential for tests and offline use.
#[derive(Debug, Clone)]
pub struct FixedSession(pub Session);

impl FixedSession {
    pub fn offline() -> Self {
        Self(Session {
            user_id: "offline_user_123".into(),
            access_token: None,
        })
    }
}

impl SessionProvider for FixedSession {
    fn ensure_session(&self) -> Result<Session> {
        Ok(self.0.clone())
    }
}
