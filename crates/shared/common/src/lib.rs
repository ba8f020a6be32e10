//! Common utilities shared across all services.
//!
//! This crate provides:
//! - Unified error handling mapped onto HTTP responses
//! - Configuration loaded from the environment
//! - Pagination types and the database connection wrapper

pub mod config;
#[cfg(feature = "database")]
pub mod database;
pub mod error;
pub mod pagination;

pub use config::*;
#[cfg(feature = "database")]
pub use database::{Database, MigrateAction, MigrationEntry};
pub use error::{AppError, AppResult, OptionExt};
pub use pagination::{Page, Paginated, PaginationMeta, PaginationParams};
