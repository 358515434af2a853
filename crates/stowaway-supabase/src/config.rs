use serde::{Deserialize, Serialize};

use crate::error::SupabaseError;

/// Default storage bucket for scan photos.
pub const DEFAULT_BUCKET: &str = "inventory-images";

/// Connection settings for one Supabase project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupabaseConfig {
    /// Project base URL, e.g. `https://abcdefgh.supabase.co`.
    pub url: String,
    /// The project's anon (publishable) key.
    pub anon_key: String,
    /// Storage bucket for uploaded photos.
    pub bucket: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            bucket: DEFAULT_BUCKET.to_string(),
        }
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Read `STOWAWAY_SUPABASE_URL` and `STOWAWAY_SUPABASE_ANON_KEY` from the
    /// environment, with `STOWAWAY_SUPABASE_BUCKET` optional.
    pub fn from_env() -> Result<Self, SupabaseError> {
        let url = std::env::var("STOWAWAY_SUPABASE_URL")
            .map_err(|_| SupabaseError::Config("STOWAWAY_SUPABASE_URL is not set".into()))?;
        let anon_key = std::env::var("STOWAWAY_SUPABASE_ANON_KEY")
            .map_err(|_| SupabaseError::Config("STOWAWAY_SUPABASE_ANON_KEY is not set".into()))?;
        let mut config = Self::new(url, anon_key);
        if let Ok(bucket) = std::env::var("STOWAWAY_SUPABASE_BUCKET") {
            config.bucket = bucket;
        }
        Ok(config)
    }

    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.url)
    }

    pub(crate) fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{endpoint}", self.url)
    }

    pub(crate) fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{path}", self.url, self.bucket)
    }

    pub(crate) fn public_object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{path}", self.url, self.bucket)
    }
}
