//! Session token storage.
//!
//! One row per live token. Logging in rotates the user's tokens: every
//! existing row is deleted before the fresh one is inserted, so a user holds
//! at most one live session.

use chrono::Utc;
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub token: String,
    pub username: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn find(db: &DatabaseConnection, token: &str) -> Result<Option<Model>, DbErr> {
    Entity::find_by_id(token).one(db).await
}

/// Deletes every session the user holds.
pub async fn delete_for_user(db: &DatabaseConnection, username: &str) -> Result<(), DbErr> {
    Entity::delete_many()
        .filter(Column::Username.eq(username))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn delete_token(db: &DatabaseConnection, token: &str) -> Result<(), DbErr> {
    Entity::delete_by_id(token).exec(db).await?;
    Ok(())
}

/// Issues a fresh token for the user, invalidating all previous ones.
pub async fn rotate(db: &DatabaseConnection, username: &str) -> Result<String, DbErr> {
    delete_for_user(db, username).await?;

    let token = Uuid::new_v4().to_string();
    let session = ActiveModel {
        token: ActiveValue::Set(token.clone()),
        username: ActiveValue::Set(username.to_string()),
        created_at: ActiveValue::Set(Utc::now()),
    };
    session.insert(db).await?;
    Ok(token)
}
