//! stowaway-core: Cross-platform core library for the Stowaway inventory app.
//!
//! Stowaway tracks household items in a rooms → storage units → items
//! hierarchy backed by a hosted relational service. This crate holds the
//! logic the UI layers drive:
//! - domain models and the hierarchy snapshot (including the "unsorted" set)
//! - multi-select session state for bulk actions
//! - the mutation coordinator (rename, move, delete, bulk edit) with
//!   strict/cascade delete policies and partial-success reporting
//! - location resolution for move/creation pickers
//! - the scan-review flow between vision analysis and save
//!
//! Network collaborators (hosted rows, object storage, vision inference,
//! auth) are traits in [`backend`] and [`session`]; the hosted
//! implementations live in `stowaway-supabase` and `stowaway-vision`.

pub mod backend;
pub mod coordinator;
pub mod error;
pub mod hierarchy;
pub mod location;
pub mod memory;
pub mod model;
pub mod scan;
pub mod selection;
pub mod session;

pub use backend::*;
pub use coordinator::*;
pub use error::*;
pub use hierarchy::*;
pub use location::*;
pub use memory::{MemoryBackend, MemoryObjectStore};
pub use model::*;
pub use scan::*;
pub use selection::*;
pub use session::*;
