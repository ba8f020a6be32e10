//! Service layer for identity use cases.

mod auth_service;
mod role_service;
mod two_factor_service;
mod user_service;

pub use auth_service::{AuthService, AuthSettings, Authenticator, Claims, Credentials, Registration};
pub use role_service::{RoleManager, RoleService};
pub use two_factor_service::{TwoFactorManager, TwoFactorService};
pub use user_service::{UserManager, UserService, UserUpdate};

#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use role_service::MockRoleService;
#[cfg(any(test, feature = "test-utils"))]
pub use two_factor_service::MockTwoFactorService;
#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
