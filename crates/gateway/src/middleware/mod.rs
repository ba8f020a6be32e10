//! Middleware for authentication, rate limiting, and caching.

mod auth;
mod cache;
mod rate_limit;

pub use auth::{
    auth_middleware, require_any_permission, require_permission, require_self_or, CurrentUser,
};
pub use cache::Cache;
pub use rate_limit::{client_ip, rate_limit_auth_middleware, rate_limit_middleware};
