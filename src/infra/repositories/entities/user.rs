//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{User, UserRole};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    /// NULL for accounts created through Google
    pub password_hash: Option<String>,
    #[sea_orm(unique)]
    pub google_id: Option<String>,
    pub is_verified: bool,
    pub role: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub age: Option<String>,
    pub photo_url: Option<String>,
    pub password_changed_at: Option<DateTimeUtc>,
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            name: model.name,
            email: model.email,
            password_hash: model.password_hash,
            google_id: model.google_id,
            is_verified: model.is_verified,
            role: UserRole::from(model.role.as_str()),
            phone: model.phone,
            address: model.address,
            age: model.age,
            photo_url: model.photo_url,
            password_changed_at: model.password_changed_at,
            password_reset_token: model.password_reset_token,
            password_reset_expires: model.password_reset_expires,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
