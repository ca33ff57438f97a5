use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, WasteType, waste_types};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Adds a waste type to the catalog. Names are unique.
    pub async fn create_waste_type(
        &self,
        name: &str,
        price_per_kg_minor: i64,
        points_per_kg: i64,
    ) -> ResultEngine<WasteType> {
        let name = normalize_required_name(name, "waste type")?;

        with_tx!(self, |db_tx| {
            let existing = waste_types::Entity::find()
                .filter(waste_types::Column::Name.eq(name.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(name));
            }

            let waste_type = WasteType::new(name, price_per_kg_minor, points_per_kg)?;
            waste_types::ActiveModel::from(&waste_type).insert(&db_tx).await?;
            Ok(waste_type)
        })
    }

    /// Updates catalog rates. Existing deposits keep their snapshots.
    pub async fn update_waste_type(
        &self,
        waste_type_id: Uuid,
        price_per_kg_minor: Option<i64>,
        points_per_kg: Option<i64>,
    ) -> ResultEngine<WasteType> {
        if price_per_kg_minor.is_some_and(|p| p < 0) || points_per_kg.is_some_and(|p| p < 0) {
            return Err(EngineError::InvalidAmount(
                "price and point rate must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let model = waste_types::Entity::find_by_id(waste_type_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("waste_type not exists".to_string()))?;

            let mut update = waste_types::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                ..Default::default()
            };
            if let Some(price) = price_per_kg_minor {
                update.price_per_kg_minor = ActiveValue::Set(price);
            }
            if let Some(points) = points_per_kg {
                update.points_per_kg = ActiveValue::Set(points);
            }

            let updated = update.update(&db_tx).await?;
            WasteType::try_from(updated)
        })
    }

    /// Deactivates or reactivates a catalog entry. Deactivated types stay
    /// referenced by old deposits.
    pub async fn set_waste_type_active(
        &self,
        waste_type_id: Uuid,
        active: bool,
    ) -> ResultEngine<WasteType> {
        with_tx!(self, |db_tx| {
            let model = waste_types::Entity::find_by_id(waste_type_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("waste_type not exists".to_string()))?;

            let update = waste_types::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                active: ActiveValue::Set(active),
                ..Default::default()
            };
            let updated = update.update(&db_tx).await?;
            WasteType::try_from(updated)
        })
    }

    /// Lists catalog entries, alphabetically.
    pub async fn list_waste_types(&self, active_only: bool) -> ResultEngine<Vec<WasteType>> {
        let mut query = waste_types::Entity::find().order_by_asc(waste_types::Column::Name);
        if active_only {
            query = query.filter(waste_types::Column::Active.eq(true));
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(WasteType::try_from).collect()
    }

    /// Return a waste type by id.
    pub async fn waste_type(&self, waste_type_id: Uuid) -> ResultEngine<WasteType> {
        let model = waste_types::Entity::find_by_id(waste_type_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("waste_type not exists".to_string()))?;
        WasteType::try_from(model)
    }

    /// Return a waste type by its unique name.
    pub async fn waste_type_by_name(&self, name: &str) -> ResultEngine<WasteType> {
        let model = waste_types::Entity::find()
            .filter(waste_types::Column::Name.eq(name))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("waste_type not exists".to_string()))?;
        WasteType::try_from(model)
    }
}
