//! `volley-storage` — SQLite persistence for saved broadcast configs.
//!
//! Records are owner-scoped: every row carries the operator email it was
//! saved under, and the HTTP layer enforces that callers only see their
//! own rows.

pub mod db;
pub mod error;
pub mod store;
pub mod types;

pub use error::{Result, StorageError};
pub use store::ConfigStore;
pub use types::{BroadcastConfig, NewBroadcastConfig};
