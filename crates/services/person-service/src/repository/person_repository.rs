//! Person repository with soft delete and name search.

use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::entities::person::{self, ActiveModel, Entity as PersonEntity};
use common::{AppError, AppResult, Page, PaginationParams};
use domain::person::Person;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Person repository trait.
///
/// Lookups exclude soft-deleted persons unless the method says otherwise.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PersonRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Person>>;

    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<Person>>;

    /// National IDs stay reserved after a soft delete
    async fn find_by_national_id_with_deleted(&self, national_id: &str)
        -> AppResult<Option<Person>>;

    async fn create(&self, person: &Person) -> AppResult<Person>;

    async fn save(&self, person: &Person) -> AppResult<Person>;

    /// List persons ordered by last name. `search` matches first name, last
    /// name, national ID or email, case-insensitively.
    async fn list(&self, params: PaginationParams, search: Option<String>)
        -> AppResult<Page<Person>>;
}

pub struct PersonStore {
    db: DatabaseConnection,
}

impl PersonStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn ilike(column: person::Column, pattern: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(pattern)
}

#[async_trait]
impl PersonRepository for PersonStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Person>> {
        PersonEntity::find_by_id(id)
            .filter(person::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(Person::try_from)
            .transpose()
    }

    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<Person>> {
        PersonEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(Person::try_from)
            .transpose()
    }

    async fn find_by_national_id_with_deleted(
        &self,
        national_id: &str,
    ) -> AppResult<Option<Person>> {
        PersonEntity::find()
            .filter(person::Column::NationalId.eq(national_id.trim().to_uppercase()))
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(Person::try_from)
            .transpose()
    }

    async fn create(&self, person: &Person) -> AppResult<Person> {
        let model = ActiveModel::from(person)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;
        Person::try_from(model)
    }

    async fn save(&self, person: &Person) -> AppResult<Person> {
        let model = ActiveModel::from(person)
            .update(&self.db)
            .await
            .map_err(AppError::from)?;
        Person::try_from(model)
    }

    async fn list(
        &self,
        params: PaginationParams,
        search: Option<String>,
    ) -> AppResult<Page<Person>> {
        let mut query = PersonEntity::find()
            .filter(person::Column::DeletedAt.is_null())
            .order_by_asc(person::Column::LastName)
            .order_by_asc(person::Column::FirstName);

        if let Some(term) = search.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", term);
            query = query.filter(
                Condition::any()
                    .add(ilike(person::Column::FirstName, &pattern))
                    .add(ilike(person::Column::LastName, &pattern))
                    .add(ilike(person::Column::NationalId, &pattern))
                    .add(ilike(person::Column::Email, &pattern)),
            );
        }

        let paginator = query.paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let persons = paginator
            .fetch_page(params.page_index())
            .await?
            .into_iter()
            .map(Person::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Page::new(persons, total))
    }
}
