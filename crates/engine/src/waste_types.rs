//! Waste-type catalog.
//!
//! Each row prices one category of recyclable material. Deposits snapshot the
//! rates at recording time, so later catalog edits never rewrite history.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WasteType {
    pub id: Uuid,
    pub name: String,
    /// Purchase price per kilogram, in minor units.
    pub price_per_kg_minor: i64,
    /// Loyalty points credited per kilogram.
    pub points_per_kg: i64,
    pub active: bool,
}

impl WasteType {
    pub fn new(name: String, price_per_kg_minor: i64, points_per_kg: i64) -> ResultEngine<Self> {
        if price_per_kg_minor < 0 || points_per_kg < 0 {
            return Err(EngineError::InvalidAmount(
                "price and point rate must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            price_per_kg_minor,
            points_per_kg,
            active: true,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "waste_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub name: String,
    pub price_per_kg_minor: i64,
    pub points_per_kg: i64,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::deposits::Entity")]
    Deposits,
}

impl Related<super::deposits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deposits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&WasteType> for ActiveModel {
    fn from(waste_type: &WasteType) -> Self {
        Self {
            id: ActiveValue::Set(waste_type.id.to_string()),
            name: ActiveValue::Set(waste_type.name.clone()),
            price_per_kg_minor: ActiveValue::Set(waste_type.price_per_kg_minor),
            points_per_kg: ActiveValue::Set(waste_type.points_per_kg),
            active: ActiveValue::Set(waste_type.active),
        }
    }
}

impl TryFrom<Model> for WasteType {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("waste_type not exists".to_string()))?,
            name: model.name,
            price_per_kg_minor: model.price_per_kg_minor,
            points_per_kg: model.points_per_kg,
            active: model.active,
        })
    }
}
