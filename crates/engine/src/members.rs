//! Member records.
//!
//! A `Member` is a registered waste-bank participant. The row carries cached
//! balance/point/weight totals; the append-only `balance_history` table is
//! the source of truth those totals must reconcile to.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    /// Immutable member number issued at registration (`A-0001`, ...).
    pub number: String,
    pub name: String,
    pub phone: Option<String>,
    pub balance_minor: i64,
    pub points: i64,
    /// Cumulative deposited waste weight, in grams.
    pub total_weight_grams: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(
        number: String,
        name: String,
        phone: Option<String>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if name.is_empty() {
            return Err(EngineError::InvalidAmount(
                "member name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            number,
            name,
            phone,
            balance_minor: 0,
            points: 0,
            total_weight_grams: 0,
            active: true,
            created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub number: String,
    pub name: String,
    pub phone: Option<String>,
    pub balance_minor: i64,
    pub points: i64,
    pub total_weight_grams: i64,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::deposits::Entity")]
    Deposits,
    #[sea_orm(has_many = "super::balance_history::Entity")]
    BalanceHistory,
}

impl Related<super::deposits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deposits.def()
    }
}

impl Related<super::balance_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BalanceHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Member> for ActiveModel {
    fn from(member: &Member) -> Self {
        Self {
            id: ActiveValue::Set(member.id.to_string()),
            number: ActiveValue::Set(member.number.clone()),
            name: ActiveValue::Set(member.name.clone()),
            phone: ActiveValue::Set(member.phone.clone()),
            balance_minor: ActiveValue::Set(member.balance_minor),
            points: ActiveValue::Set(member.points),
            total_weight_grams: ActiveValue::Set(member.total_weight_grams),
            active: ActiveValue::Set(member.active),
            created_at: ActiveValue::Set(member.created_at),
        }
    }
}

impl TryFrom<Model> for Member {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("member not exists".to_string()))?,
            number: model.number,
            name: model.name,
            phone: model.phone,
            balance_minor: model.balance_minor,
            points: model.points,
            total_weight_grams: model.total_weight_grams,
            active: model.active,
            created_at: model.created_at,
        })
    }
}
