//! Roles, role permissions and user role assignments.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::{permission, role, role_permission, user_role};
use common::{AppError, AppResult};
use domain::identity::{Permission, Role};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Role repository trait.
///
/// Lookups exclude soft-deleted roles unless stated otherwise.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Role>>;

    /// Find a role by name including soft-deleted (names stay reserved)
    async fn find_by_name_with_deleted(&self, name: &str) -> AppResult<Option<Role>>;

    async fn list(&self) -> AppResult<Vec<Role>>;

    async fn create(&self, role: &Role) -> AppResult<Role>;

    async fn save(&self, role: &Role) -> AppResult<Role>;

    /// Permissions attached to a role
    async fn role_permissions(&self, role_id: Uuid) -> AppResult<Vec<Permission>>;

    /// Attach a permission; attaching twice is a no-op
    async fn add_role_permission(&self, role_id: Uuid, permission_id: Uuid) -> AppResult<()>;

    /// Returns `false` when the permission was not attached
    async fn remove_role_permission(&self, role_id: Uuid, permission_id: Uuid) -> AppResult<bool>;

    /// Active roles assigned to a user
    async fn user_roles(&self, user_id: Uuid) -> AppResult<Vec<Role>>;

    /// Assign a role; assigning twice is a no-op
    async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()>;

    /// Returns `false` when the role was not assigned
    async fn remove_role(&self, user_id: Uuid, role_id: Uuid) -> AppResult<bool>;
}

pub struct RoleStore {
    db: DatabaseConnection,
}

impl RoleStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoleRepository for RoleStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Role>> {
        let result = role::Entity::find_by_id(id)
            .filter(role::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;
        Ok(result.map(Role::from))
    }

    async fn find_by_name_with_deleted(&self, name: &str) -> AppResult<Option<Role>> {
        let result = role::Entity::find()
            .filter(role::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        Ok(result.map(Role::from))
    }

    async fn list(&self) -> AppResult<Vec<Role>> {
        let models = role::Entity::find()
            .filter(role::Column::DeletedAt.is_null())
            .order_by_asc(role::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Role::from).collect())
    }

    async fn create(&self, role: &Role) -> AppResult<Role> {
        let model = role::ActiveModel::from(role).insert(&self.db).await?;
        Ok(Role::from(model))
    }

    async fn save(&self, role: &Role) -> AppResult<Role> {
        let model = role::ActiveModel::from(role).update(&self.db).await?;
        Ok(Role::from(model))
    }

    async fn role_permissions(&self, role_id: Uuid) -> AppResult<Vec<Permission>> {
        let permission_ids: Vec<Uuid> = role_permission::Entity::find()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|link| link.permission_id)
            .collect();

        if permission_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = permission::Entity::find()
            .filter(permission::Column::Id.is_in(permission_ids))
            .order_by_asc(permission::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Permission::from).collect())
    }

    async fn add_role_permission(&self, role_id: Uuid, permission_id: Uuid) -> AppResult<()> {
        let link = role_permission::ActiveModel {
            role_id: Set(role_id),
            permission_id: Set(permission_id),
        };
        role_permission::Entity::insert(link)
            .on_conflict(
                OnConflict::columns([
                    role_permission::Column::RoleId,
                    role_permission::Column::PermissionId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn remove_role_permission(&self, role_id: Uuid, permission_id: Uuid) -> AppResult<bool> {
        let result = role_permission::Entity::delete_many()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .filter(role_permission::Column::PermissionId.eq(permission_id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected > 0)
    }

    async fn user_roles(&self, user_id: Uuid) -> AppResult<Vec<Role>> {
        let role_ids: HashSet<Uuid> = user_role::Entity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|link| link.role_id)
            .collect();

        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = role::Entity::find()
            .filter(role::Column::Id.is_in(role_ids))
            .filter(role::Column::DeletedAt.is_null())
            .order_by_asc(role::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Role::from).collect())
    }

    async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()> {
        let link = user_role::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role_id),
            assigned_at: Set(Utc::now()),
        };
        user_role::Entity::insert(link)
            .on_conflict(
                OnConflict::columns([user_role::Column::UserId, user_role::Column::RoleId])
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn remove_role(&self, user_id: Uuid, role_id: Uuid) -> AppResult<bool> {
        let result = user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .filter(user_role::Column::RoleId.eq(role_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
