use serde::{Deserialize, Serialize};
use thiserror::Error;

use stowaway_core::InventoryError;

/// Default Gemini model for item detection.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Settings for the Gemini provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionConfig {
    pub api_key: String,
    pub model: String,
}

impl VisionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Read `STOWAWAY_GEMINI_API_KEY` from the environment, with
    /// `STOWAWAY_GEMINI_MODEL` optional.
    pub fn from_env() -> Result<Self, VisionError> {
        let api_key = std::env::var("STOWAWAY_GEMINI_API_KEY")
            .map_err(|_| VisionError::Config("STOWAWAY_GEMINI_API_KEY is not set".into()))?;
        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("STOWAWAY_GEMINI_MODEL") {
            config.model = model;
        }
        Ok(config)
    }

    pub(crate) fn generate_url(&self) -> String {
        format!(
            "{API_BASE}/models/{}:generateContent?key={}",
            self.model, self.api_key
        )
    }
}

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Request failed: {message}")]
    Request { message: String },
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Model reply had no text part")]
    EmptyReply,
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for VisionError {
    fn from(err: reqwest::Error) -> Self {
        VisionError::Request {
            message: err.to_string(),
        }
    }
}

impl From<VisionError> for InventoryError {
    fn from(err: VisionError) -> Self {
        InventoryError::Backend(err.to_string())
    }
}
