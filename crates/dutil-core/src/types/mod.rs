//! Shared type definitions

/// Flat error enum and classification
pub mod error;

/// Reference identity for opaque references
pub mod identity;

pub use error::{Error, ErrorKind, Result};
pub use identity::Identity;
