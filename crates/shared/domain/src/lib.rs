//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Aggregates are grouped by bounded context: identity, person and academic.

mod macros;

pub mod academic;
pub mod constants;
pub mod error;
pub mod identity;
pub mod password;
pub mod person;
pub mod validation;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use password::Password;
