//! Supabase storage bucket as an [`ObjectStore`].

use std::time::Duration;

use reqwest::Client;

use stowaway_core::{ObjectStore, Result, Session};

use crate::config::SupabaseConfig;
use crate::error::SupabaseError;
use crate::runtime::block_on;

/// Uploads scan photos to the configured bucket and hands back public URLs.
/// The bucket is expected to be public; no signed-URL dance.
pub struct SupabaseStorage {
    http: Client,
    config: SupabaseConfig,
    access_token: Option<String>,
}

impl SupabaseStorage {
    pub fn new(config: SupabaseConfig) -> std::result::Result<Self, SupabaseError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(SupabaseError::from)?;
        Ok(Self {
            http,
            config,
            access_token: None,
        })
    }

    pub fn with_session(mut self, session: &Session) -> Self {
        self.access_token = session.access_token.clone();
        self
    }

    fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.config.anon_key)
    }

    async fn upload_inner(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        upsert: bool,
    ) -> std::result::Result<String, SupabaseError> {
        let response = self
            .http
            .post(self.config.object_url(path))
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", self.bearer()))
            .header("Content-Type", content_type)
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(bytes.to_vec())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(self.config.public_object_url(path))
    }
}

impl ObjectStore for SupabaseStorage {
    fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        upsert: bool,
    ) -> Result<String> {
        tracing::debug!(path, size = bytes.len(), "uploading object");
        Ok(block_on(self.upload_inner(path, bytes, content_type, upsert))?)
    }
}
