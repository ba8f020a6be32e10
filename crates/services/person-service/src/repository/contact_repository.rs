//! Addresses and emergency contacts.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use super::entities::{address, emergency_contact};
use common::{AppError, AppResult};
use domain::person::{Address, EmergencyContact};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Contact data owned by a person.
///
/// Saving a primary address demotes every other address of the same person
/// in the same transaction.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Addresses of a person, primary first
    async fn list_addresses(&self, person_id: Uuid) -> AppResult<Vec<Address>>;

    async fn find_address(&self, id: Uuid) -> AppResult<Option<Address>>;

    async fn create_address(&self, address: &Address) -> AppResult<Address>;

    async fn save_address(&self, address: &Address) -> AppResult<Address>;

    /// Returns `false` when no such address existed
    async fn delete_address(&self, id: Uuid) -> AppResult<bool>;

    async fn list_contacts(&self, person_id: Uuid) -> AppResult<Vec<EmergencyContact>>;

    async fn find_contact(&self, id: Uuid) -> AppResult<Option<EmergencyContact>>;

    async fn create_contact(&self, contact: &EmergencyContact) -> AppResult<EmergencyContact>;

    async fn delete_contact(&self, id: Uuid) -> AppResult<bool>;
}

pub struct ContactStore {
    db: DatabaseConnection,
}

impl ContactStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

async fn demote_other_addresses<C: ConnectionTrait>(conn: &C, address: &Address) -> AppResult<()> {
    address::Entity::update_many()
        .col_expr(address::Column::IsPrimary, Expr::value(false))
        .filter(address::Column::PersonId.eq(address.person_id))
        .filter(address::Column::Id.ne(address.id))
        .exec(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl ContactRepository for ContactStore {
    async fn list_addresses(&self, person_id: Uuid) -> AppResult<Vec<Address>> {
        address::Entity::find()
            .filter(address::Column::PersonId.eq(person_id))
            .order_by_desc(address::Column::IsPrimary)
            .order_by_asc(address::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?
            .into_iter()
            .map(Address::try_from)
            .collect()
    }

    async fn find_address(&self, id: Uuid) -> AppResult<Option<Address>> {
        address::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(Address::try_from)
            .transpose()
    }

    async fn create_address(&self, address: &Address) -> AppResult<Address> {
        let txn = self.db.begin().await?;
        if address.is_primary {
            demote_other_addresses(&txn, address).await?;
        }
        let model = address::ActiveModel::from(address).insert(&txn).await?;
        txn.commit().await?;
        Address::try_from(model)
    }

    async fn save_address(&self, address: &Address) -> AppResult<Address> {
        let txn = self.db.begin().await?;
        if address.is_primary {
            demote_other_addresses(&txn, address).await?;
        }
        let model = address::ActiveModel::from(address).update(&txn).await?;
        txn.commit().await?;
        Address::try_from(model)
    }

    async fn delete_address(&self, id: Uuid) -> AppResult<bool> {
        let result = address::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_contacts(&self, person_id: Uuid) -> AppResult<Vec<EmergencyContact>> {
        let contacts = emergency_contact::Entity::find()
            .filter(emergency_contact::Column::PersonId.eq(person_id))
            .order_by_asc(emergency_contact::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(contacts.into_iter().map(EmergencyContact::from).collect())
    }

    async fn find_contact(&self, id: Uuid) -> AppResult<Option<EmergencyContact>> {
        let contact = emergency_contact::Entity::find_by_id(id).one(&self.db).await?;
        Ok(contact.map(EmergencyContact::from))
    }

    async fn create_contact(&self, contact: &EmergencyContact) -> AppResult<EmergencyContact> {
        let model = emergency_contact::ActiveModel::from(contact)
            .insert(&self.db)
            .await?;
        Ok(EmergencyContact::from(model))
    }

    async fn delete_contact(&self, id: Uuid) -> AppResult<bool> {
        let result = emergency_contact::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
