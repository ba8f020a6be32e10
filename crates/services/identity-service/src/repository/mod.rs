//! Repository layer for data access.

pub mod entities;
mod login_history_repository;
mod permission_repository;
mod role_repository;
mod token_repository;
mod two_factor_repository;
mod user_repository;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use login_history_repository::{LoginHistoryRepository, LoginHistoryStore};
pub use permission_repository::{PermissionRepository, PermissionStore};
pub use role_repository::{RoleRepository, RoleStore};
pub use token_repository::{RefreshTokenRepository, RefreshTokenStore};
pub use two_factor_repository::{TwoFactorRepository, TwoFactorStore};
pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use login_history_repository::MockLoginHistoryRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use permission_repository::MockPermissionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use role_repository::MockRoleRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use token_repository::MockRefreshTokenRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use two_factor_repository::MockTwoFactorRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;

/// Every identity repository, shared by the service managers.
#[derive(Clone)]
pub struct IdentityRepositories {
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub permissions: Arc<dyn PermissionRepository>,
    pub tokens: Arc<dyn RefreshTokenRepository>,
    pub two_factor: Arc<dyn TwoFactorRepository>,
    pub login_history: Arc<dyn LoginHistoryRepository>,
}

impl IdentityRepositories {
    /// Build the SeaORM-backed repositories over one connection pool
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self {
            users: Arc::new(UserStore::new(db.clone())),
            roles: Arc::new(RoleStore::new(db.clone())),
            permissions: Arc::new(PermissionStore::new(db.clone())),
            tokens: Arc::new(RefreshTokenStore::new(db.clone())),
            two_factor: Arc::new(TwoFactorStore::new(db.clone())),
            login_history: Arc::new(LoginHistoryStore::new(db)),
        }
    }
}
