//! stowaway-supabase: hosted backend for the Stowaway inventory app.
//!
//! Implements the `stowaway-core` backend traits against a Supabase
//! project: PostgREST for rows, the storage API for scan photos, and
//! GoTrue for the silent demo-account session. All calls are blocking
//! facades over a shared tokio runtime so the core stays runtime-free.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
mod runtime;
pub mod storage;

pub use auth::{Credentials, SilentAuth};
pub use client::SupabaseClient;
pub use config::SupabaseConfig;
pub use error::SupabaseError;
pub use storage::SupabaseStorage;
