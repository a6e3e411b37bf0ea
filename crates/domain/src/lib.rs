//! # ChainView Domain
//!
//! Domain types shared by every ChainView crate.
//!
//! This crate contains:
//! - Domain error types and Result definitions
//! - Configuration structures for the OAuth credential lifecycle
//! - Domain constants (environment variable names, storage keys)
//!
//! ## Architecture
//! - No dependencies on other ChainView crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
