//! Role and permission administration.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::identity::{Permission, Role, RoleResponse};
use domain::{DEFAULT_PERMISSIONS, DEFAULT_ROLE_PERMISSIONS, SYSTEM_ROLES};

use crate::repository::{PermissionRepository, RoleRepository};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoleService: Send + Sync {
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Role with its permissions
    async fn get_role(&self, id: Uuid) -> AppResult<RoleResponse>;

    async fn create_role(&self, name: String, description: Option<String>) -> AppResult<Role>;

    async fn update_role(
        &self,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
    ) -> AppResult<Role>;

    /// Soft delete; system roles are refused
    async fn delete_role(&self, id: Uuid) -> AppResult<()>;

    async fn add_role_permission(&self, role_id: Uuid, permission_id: Uuid)
        -> AppResult<RoleResponse>;

    async fn remove_role_permission(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> AppResult<RoleResponse>;

    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;

    async fn create_permission(
        &self,
        name: String,
        description: Option<String>,
    ) -> AppResult<Permission>;

    async fn delete_permission(&self, id: Uuid) -> AppResult<()>;

    /// Create missing default roles, permissions and role grants
    async fn seed_defaults(&self) -> AppResult<()>;
}

pub struct RoleManager {
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
}

impl RoleManager {
    pub fn new(roles: Arc<dyn RoleRepository>, permissions: Arc<dyn PermissionRepository>) -> Self {
        Self { roles, permissions }
    }

    async fn load_role(&self, id: Uuid) -> AppResult<Role> {
        self.roles.find_by_id(id).await?.ok_or_not_found("Role")
    }

    async fn with_permissions(&self, role: Role) -> AppResult<RoleResponse> {
        let permissions = self.roles.role_permissions(role.id).await?;
        Ok(RoleResponse::new(role, permissions))
    }

    async fn ensure_permission(&self, name: &str, description: &str) -> AppResult<Permission> {
        if let Some(existing) = self.permissions.find_by_name(name).await? {
            return Ok(existing);
        }
        let permission = Permission::new(name, Some(description.to_string()))?;
        let created = self.permissions.create(&permission).await?;
        info!(permission = %created.name, "Seeded permission");
        Ok(created)
    }

    async fn ensure_role(&self, name: &str) -> AppResult<Role> {
        if let Some(existing) = self.roles.find_by_name_with_deleted(name).await? {
            return Ok(existing);
        }
        let role = Role::new(name, None)?;
        let created = self.roles.create(&role).await?;
        info!(role = %created.name, "Seeded role");
        Ok(created)
    }
}

#[async_trait]
impl RoleService for RoleManager {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.roles.list().await
    }

    async fn get_role(&self, id: Uuid) -> AppResult<RoleResponse> {
        let role = self.load_role(id).await?;
        self.with_permissions(role).await
    }

    async fn create_role(&self, name: String, description: Option<String>) -> AppResult<Role> {
        let role = Role::new(&name, description)?;
        if self
            .roles
            .find_by_name_with_deleted(&role.name)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Role"));
        }
        let role = self.roles.create(&role).await?;
        info!(role = %role.name, "Role created");
        Ok(role)
    }

    async fn update_role(
        &self,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
    ) -> AppResult<Role> {
        let mut role = self.load_role(id).await?;
        let previous_name = role.name.clone();
        role.update(name.as_deref(), description)?;

        if role.name != previous_name
            && self
                .roles
                .find_by_name_with_deleted(&role.name)
                .await?
                .is_some()
        {
            return Err(AppError::conflict("Role"));
        }
        self.roles.save(&role).await
    }

    async fn delete_role(&self, id: Uuid) -> AppResult<()> {
        let mut role = self.load_role(id).await?;
        role.soft_delete()?;
        self.roles.save(&role).await?;
        info!(role = %role.name, "Role deleted");
        Ok(())
    }

    async fn add_role_permission(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> AppResult<RoleResponse> {
        let role = self.load_role(role_id).await?;
        let permission = self
            .permissions
            .find_by_id(permission_id)
            .await?
            .ok_or_not_found("Permission")?;
        self.roles.add_role_permission(role_id, permission_id).await?;
        info!(role = %role.name, permission = %permission.name, "Permission added to role");
        self.with_permissions(role).await
    }

    async fn remove_role_permission(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> AppResult<RoleResponse> {
        let role = self.load_role(role_id).await?;
        if !self
            .roles
            .remove_role_permission(role_id, permission_id)
            .await?
        {
            return Err(AppError::not_found("Role permission"));
        }
        info!(role = %role.name, permission_id = %permission_id, "Permission removed from role");
        self.with_permissions(role).await
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.permissions.list().await
    }

    async fn create_permission(
        &self,
        name: String,
        description: Option<String>,
    ) -> AppResult<Permission> {
        let permission = Permission::new(&name, description)?;
        if self
            .permissions
            .find_by_name(&permission.name)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Permission"));
        }
        self.permissions.create(&permission).await
    }

    async fn delete_permission(&self, id: Uuid) -> AppResult<()> {
        if !self.permissions.delete(id).await? {
            return Err(AppError::not_found("Permission"));
        }
        info!(permission_id = %id, "Permission deleted");
        Ok(())
    }

    async fn seed_defaults(&self) -> AppResult<()> {
        let mut seeded = Vec::with_capacity(DEFAULT_PERMISSIONS.len());
        for (name, description) in DEFAULT_PERMISSIONS {
            seeded.push(self.ensure_permission(name, description).await?);
        }

        for name in SYSTEM_ROLES {
            let role = self.ensure_role(name).await?;
            let grants = DEFAULT_ROLE_PERMISSIONS
                .iter()
                .find(|(role_name, _)| role_name == name)
                .map(|(_, grants)| *grants)
                .unwrap_or_default();

            for grant in grants {
                if let Some(permission) = seeded.iter().find(|p| p.name == *grant) {
                    self.roles.add_role_permission(role.id, permission.id).await?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockPermissionRepository, MockRoleRepository};

    fn manager(roles: MockRoleRepository, permissions: MockPermissionRepository) -> RoleManager {
        RoleManager::new(Arc::new(roles), Arc::new(permissions))
    }

    #[tokio::test]
    async fn test_create_role_conflict() {
        let mut roles = MockRoleRepository::new();
        roles
            .expect_find_by_name_with_deleted()
            .returning(|name| Ok(Some(Role::new(name, None).unwrap())));
        roles.expect_create().never();
        let service = manager(roles, MockPermissionRepository::new());

        let result = service.create_role("librarian".to_string(), None).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_system_role_cannot_be_deleted() {
        let mut roles = MockRoleRepository::new();
        roles
            .expect_find_by_id()
            .returning(|_| Ok(Some(Role::new("admin", None).unwrap())));
        roles.expect_save().never();
        let service = manager(roles, MockPermissionRepository::new());

        let result = service.delete_role(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_get_role_includes_permissions() {
        let mut roles = MockRoleRepository::new();
        roles
            .expect_find_by_id()
            .returning(|_| Ok(Some(Role::new("registrar", None).unwrap())));
        roles.expect_role_permissions().returning(|_| {
            Ok(vec![Permission::new("persons.manage", None).unwrap()])
        });
        let service = manager(roles, MockPermissionRepository::new());

        let role = service.get_role(Uuid::new_v4()).await.unwrap();
        assert!(role.is_system);
        assert_eq!(role.permissions.len(), 1);
    }

    #[tokio::test]
    async fn test_seed_defaults_creates_missing_entries() {
        let mut permissions = MockPermissionRepository::new();
        permissions.expect_find_by_name().returning(|_| Ok(None));
        permissions
            .expect_create()
            .times(DEFAULT_PERMISSIONS.len())
            .returning(|p| Ok(p.clone()));

        let mut roles = MockRoleRepository::new();
        roles
            .expect_find_by_name_with_deleted()
            .returning(|_| Ok(None));
        roles
            .expect_create()
            .times(SYSTEM_ROLES.len())
            .returning(|r| Ok(r.clone()));
        let expected_links: usize = DEFAULT_ROLE_PERMISSIONS.iter().map(|(_, p)| p.len()).sum();
        roles
            .expect_add_role_permission()
            .times(expected_links)
            .returning(|_, _| Ok(()));

        let service = manager(roles, permissions);
        assert!(service.seed_defaults().await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_permission() {
        let mut permissions = MockPermissionRepository::new();
        permissions.expect_delete().returning(|_| Ok(false));
        let service = manager(MockRoleRepository::new(), permissions);

        let result = service.delete_permission(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
