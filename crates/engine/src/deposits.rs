//! Deposit rows.
//!
//! One row per physical waste drop-off. Price and point rates are snapshots
//! taken from the catalog at recording time; `total_minor` and
//! `points_earned` are derived with the fixed rounding policy in
//! [`crate::util`]. Rows are insert-only.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub id: Uuid,
    pub member_id: Uuid,
    pub waste_type_id: Uuid,
    pub admin_id: String,
    pub weight_grams: i64,
    /// Price per kg at deposit time, in minor units.
    pub price_per_kg_minor: i64,
    /// Point rate per kg at deposit time.
    pub points_per_kg: i64,
    /// `round_half_up(weight_grams * price_per_kg_minor / 1000)`.
    pub total_minor: i64,
    /// `floor(weight_grams * points_per_kg / 1000)`.
    pub points_earned: i64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "deposits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub member_id: String,
    pub waste_type_id: String,
    pub admin_id: String,
    pub weight_grams: i64,
    pub price_per_kg_minor: i64,
    pub points_per_kg: i64,
    pub total_minor: i64,
    pub points_earned: i64,
    pub occurred_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id"
    )]
    Members,
    #[sea_orm(
        belongs_to = "super::waste_types::Entity",
        from = "Column::WasteTypeId",
        to = "super::waste_types::Column::Id"
    )]
    WasteTypes,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::waste_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WasteTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Deposit> for ActiveModel {
    fn from(deposit: &Deposit) -> Self {
        Self {
            id: ActiveValue::Set(deposit.id.to_string()),
            member_id: ActiveValue::Set(deposit.member_id.to_string()),
            waste_type_id: ActiveValue::Set(deposit.waste_type_id.to_string()),
            admin_id: ActiveValue::Set(deposit.admin_id.clone()),
            weight_grams: ActiveValue::Set(deposit.weight_grams),
            price_per_kg_minor: ActiveValue::Set(deposit.price_per_kg_minor),
            points_per_kg: ActiveValue::Set(deposit.points_per_kg),
            total_minor: ActiveValue::Set(deposit.total_minor),
            points_earned: ActiveValue::Set(deposit.points_earned),
            occurred_at: ActiveValue::Set(deposit.occurred_at),
        }
    }
}

impl TryFrom<Model> for Deposit {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("deposit not exists".to_string()))?,
            member_id: util::parse_uuid(&model.member_id, "member")?,
            waste_type_id: util::parse_uuid(&model.waste_type_id, "waste_type")?,
            admin_id: model.admin_id,
            weight_grams: model.weight_grams,
            price_per_kg_minor: model.price_per_kg_minor,
            points_per_kg: model.points_per_kg,
            total_minor: model.total_minor,
            points_earned: model.points_earned,
            occurred_at: model.occurred_at,
        })
    }
}
