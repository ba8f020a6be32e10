//! Identity and access management aggregates.

mod login;
mod role;
mod token;
mod two_factor;
mod user;

pub use login::{ClientInfo, LoginAttempt, LoginFailureReason};
pub use role::{Permission, Role, RoleResponse};
pub use token::{RefreshToken, TokenResponse};
pub use two_factor::{TwoFactorAuth, TwoFactorSetup};
pub use user::{LockoutPolicy, User, UserResponse};
