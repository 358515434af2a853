use stowaway_core::InventoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupabaseError {
    #[error("Request failed: {message}")]
    Request { message: String },
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Parse error: {message}")]
    Parse { message: String },
    #[error("Server returned no rows where one was expected")]
    MissingRow,
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for SupabaseError {
    fn from(err: reqwest::Error) -> Self {
        SupabaseError::Request {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SupabaseError {
    fn from(err: serde_json::Error) -> Self {
        SupabaseError::Parse {
            message: err.to_string(),
        }
    }
}

impl From<SupabaseError> for InventoryError {
    fn from(err: SupabaseError) -> Self {
        InventoryError::Backend(err.to_string())
    }
}
