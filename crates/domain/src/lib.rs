//! # Courier Domain
//!
//! Data model shared by every layer of the Courier request layer.
//!
//! This crate contains:
//! - The uniform response envelope returned by every client call
//! - The closed taxonomy of normalized request failures
//! - Client configuration and the credential value type
//! - Setup-time error types and user-facing message constants
//!
//! ## Architecture
//! - No dependencies on other Courier crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::serde::duration_millis;
