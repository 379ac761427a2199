//! `sieeg-core` — shared building blocks for the invoicing shell.
//!
//! This crate contains **pure** primitives (no IO, no async).

pub mod error;
pub mod validation;

pub use error::DomainError;
pub use validation::{RequiredField, missing_required};
