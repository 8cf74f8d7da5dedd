//! # Rampart Common
//!
//! Shared types, constants, and errors used across Rampart components.
//!
//! ## Modules
//! - `types` - Core data structures (FieldKind, Stage, Notification, etc.)
//! - `error` - Common error types
//! - `constants` - Shared limits, durations, and storage keys

pub mod constants;
pub mod error;
pub mod types;

pub use error::RampartError;
pub use types::*;
