//! User entity - Credentials held by the database-backed identity provider.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// UUID v4 assigned at sign-up
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Lower-cased login email
    #[sea_orm(unique)]
    pub email: String,
    /// Base64 PBKDF2-HMAC-SHA256 digest of the password
    pub password_hash: String,
    /// Base64 random salt used for `password_hash`
    pub salt: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
