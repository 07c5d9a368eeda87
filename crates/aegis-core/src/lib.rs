//! # aegis-core
//!
//! Core types, errors, and utilities for the Aegis event-safety alerting console.
//!
//! This crate provides:
//! - [`AegisError`] - Error types for configuration and I/O failures
//! - [`logging`] - Tracing setup and log management utilities
//! - [`types`] - Shared geographic types used by targeting and the user map
//!
//! ## Example
//!
//! ```no_run
//! use aegis_core::{AegisError, Result, logging};
//!
//! fn main() -> aegis_core::Result<()> {
//!     // Initialize logging
//!     let _guard = logging::init_logging(None, false)?;
//!
//!     let config_path = std::path::Path::new("/etc/aegis/config.yaml");
//!     if !config_path.exists() {
//!         return Err(AegisError::config_not_found(config_path));
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export main types for convenience
pub use error::{AegisError, Result};
pub use logging::{LogGuard, init_logging};
pub use types::{GeoPoint, LATITUDE_RANGE, LONGITUDE_RANGE};
