//! stowaway-vision: vision-model item detection.
//!
//! Sends a scan photo to Gemini's `generateContent` endpoint and turns the
//! model's (frequently messy) reply into `DetectedItem`s. Parsing is
//! deliberately forgiving: markdown fences are stripped, a bare object is
//! wrapped into a one-element list, and anything unusable becomes an empty
//! detection list rather than an error; the review screen owns the
//! placeholder row.

mod parse;
pub mod provider;
pub mod types;

mod runtime;

pub use provider::GeminiProvider;
pub use types::{VisionConfig, VisionError};
