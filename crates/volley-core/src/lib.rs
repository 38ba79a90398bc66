//! `volley-core` — shared configuration and error types for the Volley
//! broadcast dashboard.

pub mod config;
pub mod error;

pub use config::VolleyConfig;
pub use error::{Result, VolleyError};
