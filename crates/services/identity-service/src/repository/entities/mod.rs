//! SeaORM entities for the identity schema.

pub mod login_attempt;
pub mod permission;
pub mod refresh_token;
pub mod role;
pub mod role_permission;
pub mod two_factor;
pub mod user;
pub mod user_permission;
pub mod user_role;
