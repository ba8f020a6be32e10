//! Permissions and direct user grants.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::{permission, role, role_permission, user_permission, user_role};
use common::AppResult;
use domain::identity::Permission;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Permission>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Permission>>;

    async fn list(&self) -> AppResult<Vec<Permission>>;

    async fn create(&self, permission: &Permission) -> AppResult<Permission>;

    /// Hard delete; role and user links cascade
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Permissions granted to the user directly
    async fn direct_permissions(&self, user_id: Uuid) -> AppResult<Vec<Permission>>;

    /// Direct grants plus permissions of every active role the user holds
    async fn effective_permissions(&self, user_id: Uuid) -> AppResult<Vec<Permission>>;

    async fn grant(&self, user_id: Uuid, permission_id: Uuid) -> AppResult<()>;

    async fn revoke(&self, user_id: Uuid, permission_id: Uuid) -> AppResult<bool>;
}

pub struct PermissionStore {
    db: DatabaseConnection,
}

impl PermissionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load(&self, ids: HashSet<Uuid>) -> AppResult<Vec<Permission>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = permission::Entity::find()
            .filter(permission::Column::Id.is_in(ids))
            .order_by_asc(permission::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Permission::from).collect())
    }
}

#[async_trait]
impl PermissionRepository for PermissionStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Permission>> {
        let result = permission::Entity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Permission::from))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        let result = permission::Entity::find()
            .filter(permission::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        Ok(result.map(Permission::from))
    }

    async fn list(&self) -> AppResult<Vec<Permission>> {
        let models = permission::Entity::find()
            .order_by_asc(permission::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Permission::from).collect())
    }

    async fn create(&self, permission: &Permission) -> AppResult<Permission> {
        let active = permission::ActiveModel {
            id: Set(permission.id),
            name: Set(permission.name.clone()),
            description: Set(permission.description.clone()),
            created_at: Set(permission.created_at),
        };
        let model = active.insert(&self.db).await?;
        Ok(Permission::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = permission::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn direct_permissions(&self, user_id: Uuid) -> AppResult<Vec<Permission>> {
        let ids: HashSet<Uuid> = user_permission::Entity::find()
            .filter(user_permission::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|grant| grant.permission_id)
            .collect();
        self.load(ids).await
    }

    async fn effective_permissions(&self, user_id: Uuid) -> AppResult<Vec<Permission>> {
        let mut ids: HashSet<Uuid> = user_permission::Entity::find()
            .filter(user_permission::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|grant| grant.permission_id)
            .collect();

        let assigned: Vec<Uuid> = user_role::Entity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|link| link.role_id)
            .collect();

        if !assigned.is_empty() {
            let active_roles: Vec<Uuid> = role::Entity::find()
                .filter(role::Column::Id.is_in(assigned))
                .filter(role::Column::DeletedAt.is_null())
                .all(&self.db)
                .await?
                .into_iter()
                .map(|r| r.id)
                .collect();

            if !active_roles.is_empty() {
                ids.extend(
                    role_permission::Entity::find()
                        .filter(role_permission::Column::RoleId.is_in(active_roles))
                        .all(&self.db)
                        .await?
                        .into_iter()
                        .map(|link| link.permission_id),
                );
            }
        }

        self.load(ids).await
    }

    async fn grant(&self, user_id: Uuid, permission_id: Uuid) -> AppResult<()> {
        let grant = user_permission::ActiveModel {
            user_id: Set(user_id),
            permission_id: Set(permission_id),
            granted_at: Set(Utc::now()),
        };
        user_permission::Entity::insert(grant)
            .on_conflict(
                OnConflict::columns([
                    user_permission::Column::UserId,
                    user_permission::Column::PermissionId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn revoke(&self, user_id: Uuid, permission_id: Uuid) -> AppResult<bool> {
        let result = user_permission::Entity::delete_many()
            .filter(user_permission::Column::UserId.eq(user_id))
            .filter(user_permission::Column::PermissionId.eq(permission_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
