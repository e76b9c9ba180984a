//! Shared plumbing for katalog services
//!
//! Provides the common error type and TOML configuration model used by the
//! sync service.

pub mod config;
pub mod error;

pub use error::{Error, Result};
