//! Login history entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use common::AppError;
use domain::identity::{LoginAttempt, LoginFailureReason};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "login_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub succeeded: bool,
    pub failure_reason: Option<String>,
    pub attempted_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for LoginAttempt {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let failure_reason = model
            .failure_reason
            .as_deref()
            .map(str::parse::<LoginFailureReason>)
            .transpose()?;

        Ok(LoginAttempt {
            id: model.id,
            user_id: model.user_id,
            email: model.email,
            ip_address: model.ip_address,
            user_agent: model.user_agent,
            succeeded: model.succeeded,
            failure_reason,
            attempted_at: model.attempted_at,
        })
    }
}

impl From<&LoginAttempt> for ActiveModel {
    fn from(attempt: &LoginAttempt) -> Self {
        ActiveModel {
            id: Set(attempt.id),
            user_id: Set(attempt.user_id),
            email: Set(attempt.email.clone()),
            ip_address: Set(attempt.ip_address.clone()),
            user_agent: Set(attempt.user_agent.clone()),
            succeeded: Set(attempt.succeeded),
            failure_reason: Set(attempt.failure_reason.map(|r| r.as_str().to_string())),
            attempted_at: Set(attempt.attempted_at),
        }
    }
}
