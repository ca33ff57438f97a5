use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Deposit, DepositCmd, EngineError, LedgerCategory, ResultEngine, deposits, members, util,
    waste_types,
};

use super::{Engine, ledger::PostEntry, with_tx};

impl Engine {
    /// Records a waste drop-off: snapshots the catalog rates, prices the
    /// weight, inserts the deposit row, and posts the matching `deposit`
    /// ledger entry. One atomic unit; a failure anywhere rolls back all of
    /// it.
    pub async fn record_deposit(&self, cmd: DepositCmd) -> ResultEngine<Deposit> {
        if cmd.weight_grams <= 0 {
            return Err(EngineError::InvalidAmount(
                "deposit weight must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let waste_type_model = waste_types::Entity::find_by_id(cmd.waste_type_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("waste_type not exists".to_string()))?;
            if !waste_type_model.active {
                return Err(EngineError::KeyNotFound(
                    "waste_type not exists".to_string(),
                ));
            }

            let total_minor =
                util::deposit_total_minor(cmd.weight_grams, waste_type_model.price_per_kg_minor)?;
            let points_earned =
                util::deposit_points(cmd.weight_grams, waste_type_model.points_per_kg)?;

            let deposit = Deposit {
                id: Uuid::new_v4(),
                member_id: cmd.member_id,
                waste_type_id: cmd.waste_type_id,
                admin_id: cmd.admin_id.clone(),
                weight_grams: cmd.weight_grams,
                price_per_kg_minor: waste_type_model.price_per_kg_minor,
                points_per_kg: waste_type_model.points_per_kg,
                total_minor,
                points_earned,
                occurred_at: cmd.occurred_at,
            };
            deposits::ActiveModel::from(&deposit).insert(&db_tx).await?;

            // Member existence/activity and the cached balance update happen
            // inside the posting.
            self.post_entry(
                &db_tx,
                PostEntry {
                    member_id: cmd.member_id,
                    category: LedgerCategory::Deposit,
                    amount_delta_minor: total_minor,
                    point_delta: points_earned,
                    deposit_id: Some(deposit.id),
                    cash_transaction_id: None,
                    admin_id: cmd.admin_id,
                    occurred_at: cmd.occurred_at,
                },
            )
            .await?;

            self.bump_member_weight(&db_tx, cmd.member_id, cmd.weight_grams)
                .await?;

            Ok(deposit)
        })
    }

    /// Lists a member's deposits, newest first.
    pub async fn list_deposits_for_member(
        &self,
        member_id: Uuid,
        limit: u64,
    ) -> ResultEngine<Vec<Deposit>> {
        let models: Vec<deposits::Model> = deposits::Entity::find()
            .filter(deposits::Column::MemberId.eq(member_id.to_string()))
            .order_by_desc(deposits::Column::OccurredAt)
            .limit(limit)
            .all(&self.database)
            .await?;

        models.into_iter().map(Deposit::try_from).collect()
    }

    /// Lists recent deposits across all members.
    pub async fn list_deposits(&self, limit: u64) -> ResultEngine<Vec<Deposit>> {
        let models: Vec<deposits::Model> = deposits::Entity::find()
            .order_by_desc(deposits::Column::OccurredAt)
            .limit(limit)
            .all(&self.database)
            .await?;

        models.into_iter().map(Deposit::try_from).collect()
    }

    async fn bump_member_weight(
        &self,
        db_tx: &sea_orm::DatabaseTransaction,
        member_id: Uuid,
        weight_grams: i64,
    ) -> ResultEngine<()> {
        let model = members::Entity::find_by_id(member_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;

        let total = model
            .total_weight_grams
            .checked_add(weight_grams)
            .ok_or_else(|| EngineError::InvalidAmount("weight overflow".to_string()))?;

        let update = members::ActiveModel {
            id: ActiveValue::Set(model.id),
            total_weight_grams: ActiveValue::Set(total),
            ..Default::default()
        };
        update.update(db_tx).await?;
        Ok(())
    }
}
