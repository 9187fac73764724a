//! # fugue-primitives
//!
//! Primitive types for the Fugue replay engine.
//!
//! This crate provides the fundamental data types used throughout the system.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;

pub use address::Address;
pub use error::PrimitiveError;
pub use hash::{Hash, H256};

// Re-export primitive-types for U256
pub use primitive_types::U256;

/// Transaction number within a replay window
pub type TxNum = u64;
