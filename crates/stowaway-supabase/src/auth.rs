//! Silent demo-account authentication against GoTrue.
//!
//! The ladder: reuse a cached session, otherwise sign in with the configured
//! credentials, otherwise sign the account up. The user never sees a login
//! screen; a failure at the last rung is the only surfaced error.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use stowaway_core::{Result, Session, SessionProvider};

use crate::config::SupabaseConfig;
use crate::error::SupabaseError;
use crate::runtime::block_on;

/// Credentials for the shared demo account.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub struct SilentAuth {
    http: Client,
    config: SupabaseConfig,
    credentials: Credentials,
    cached: Mutex<Option<Session>>,
}

#[derive(Deserialize)]
struct AuthUser {
    id: String,
}

#[derive(Deserialize)]
struct AuthResponse {
    access_token: Option<String>,
    user: Option<AuthUser>,
}

impl SilentAuth {
    pub fn new(
        config: SupabaseConfig,
        credentials: Credentials,
    ) -> std::result::Result<Self, SupabaseError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(SupabaseError::from)?;
        Ok(Self {
            http,
            config,
            credentials,
            cached: Mutex::new(None),
        })
    }

    async fn auth_request(
        &self,
        endpoint: &str,
    ) -> std::result::Result<AuthResponse, SupabaseError> {
        let response = self
            .http
            .post(self.config.auth_url(endpoint))
            .header("apikey", &self.config.anon_key)
            .json(&json!({
                "email": self.credentials.email,
                "password": self.credentials.password,
            }))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SupabaseError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(SupabaseError::from)
    }

    async fn sign_in_or_up(&self) -> std::result::Result<Session, SupabaseError> {
        match self.auth_request("token?grant_type=password").await {
            Ok(response) => {
                if let Some(session) = into_session(response) {
                    tracing::info!(user_id = %session.user_id, "silent sign-in");
                    return Ok(session);
                }
            }
            Err(err) => {
                tracing::debug!(%err, "sign-in failed, trying sign-up");
            }
        }
        let response = self
            .auth_request("signup")
            .await
            .map_err(|err| SupabaseError::Auth(err.to_string()))?;
        match into_session(response) {
            Some(session) => {
                tracing::info!(user_id = %session.user_id, "silent sign-up");
                Ok(session)
            }
            None => Err(SupabaseError::Auth(
                "sign-up returned no user".into(),
            )),
        }
    }
}

fn into_session(response: AuthResponse) -> Option<Session> {
    let user = response.user?;
    Some(Session {
        user_id: user.id,
        access_token: response.access_token,
    })
}

impl SessionProvider for SilentAuth {
    fn ensure_session(&self) -> Result<Session> {
        if let Some(session) = self.cached.lock().unwrap().clone() {
            return Ok(session);
        }
        let session = block_on(self.sign_in_or_up())?;
        *self.cached.lock().unwrap() = Some(session.clone());
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_requires_a_user() {
        assert!(into_session(AuthResponse {
            access_token: Some("jwt".into()),
            user: None,
        })
        .is_none());

        let session = into_session(AuthResponse {
            access_token: Some("jwt".into()),
            user: Some(AuthUser { id: "abc".into() }),
        })
        .unwrap();
        assert_eq!(session.user_id, "abc");
        assert_eq!(session.access_token.as_deref(), Some("jwt"));
    }
}
