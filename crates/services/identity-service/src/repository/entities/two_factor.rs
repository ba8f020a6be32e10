//! Two-factor enrolment entity. Backup codes are a JSON array of hashes.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use common::AppError;
use domain::identity::TwoFactorAuth;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "two_factor_auth")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub secret: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub backup_codes: Json,
    pub is_verified: bool,
    pub verified_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for TwoFactorAuth {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let backup_code_hashes: Vec<String> = serde_json::from_value(model.backup_codes)
            .map_err(|e| AppError::internal(format!("Corrupt backup codes: {}", e)))?;

        Ok(TwoFactorAuth {
            user_id: model.user_id,
            secret: model.secret,
            backup_code_hashes,
            is_verified: model.is_verified,
            verified_at: model.verified_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&TwoFactorAuth> for ActiveModel {
    fn from(auth: &TwoFactorAuth) -> Self {
        ActiveModel {
            user_id: Set(auth.user_id),
            secret: Set(auth.secret.clone()),
            backup_codes: Set(Json::from(auth.backup_code_hashes.clone())),
            is_verified: Set(auth.is_verified),
            verified_at: Set(auth.verified_at),
            created_at: Set(auth.created_at),
            updated_at: Set(auth.updated_at),
        }
    }
}
