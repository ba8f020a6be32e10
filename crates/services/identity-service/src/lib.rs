//! Identity Service Library
//!
//! Users, roles, permissions, refresh tokens, two-factor authentication,
//! account lockout and login history. Embedded by the gateway, which reaches
//! it through the service traits re-exported here.

pub mod infra;
pub mod repository;
pub mod security;
pub mod service;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use infra::Migrator;
pub use repository::IdentityRepositories;
pub use service::{
    AuthService, AuthSettings, Authenticator, Claims, Credentials, Registration, RoleManager,
    RoleService, TwoFactorManager, TwoFactorService, UserManager, UserService, UserUpdate,
};

/// Service container for the identity context.
#[derive(Clone)]
pub struct IdentityServices {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserService>,
    pub roles: Arc<dyn RoleService>,
    pub two_factor: Arc<dyn TwoFactorService>,
}

impl IdentityServices {
    /// Wire every identity service over a database connection.
    pub fn build(db: DatabaseConnection, settings: AuthSettings) -> Self {
        let repos = IdentityRepositories::from_connection(db);

        Self {
            auth: Arc::new(Authenticator::new(repos.clone(), settings)),
            users: Arc::new(UserManager::new(repos.clone())),
            roles: Arc::new(RoleManager::new(
                repos.roles.clone(),
                repos.permissions.clone(),
            )),
            two_factor: Arc::new(TwoFactorManager::new(repos)),
        }
    }
}
