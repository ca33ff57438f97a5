//! Balance-history posting.
//!
//! `post_entry` is the single choke point through which every member
//! balance/point change flows: it snapshots the member's totals, validates
//! the category invariants, inserts the history row, and moves the cached
//! totals to the after values, all inside the caller's DB transaction.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect,
    Statement, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AdjustmentCmd, BalanceHistoryEntry, EngineError, LedgerCategory, ResultEngine,
    balance_history, members,
};

use super::{Engine, numbers, with_tx};

/// Parameters for one ledger posting. Internal; public operations build this.
pub(super) struct PostEntry {
    pub member_id: Uuid,
    pub category: LedgerCategory,
    pub amount_delta_minor: i64,
    pub point_delta: i64,
    pub deposit_id: Option<Uuid>,
    pub cash_transaction_id: Option<Uuid>,
    pub admin_id: String,
    pub occurred_at: DateTime<Utc>,
}

/// Result of reconciling a member's cached totals against the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerCheck {
    pub member_id: Uuid,
    pub cached_balance_minor: i64,
    pub cached_points: i64,
    pub ledger_balance_minor: i64,
    pub ledger_points: i64,
}

impl LedgerCheck {
    /// `true` when the cached projection equals the sum of history deltas.
    #[must_use]
    pub fn consistent(&self) -> bool {
        self.cached_balance_minor == self.ledger_balance_minor
            && self.cached_points == self.ledger_points
    }
}

impl Engine {
    /// Posts one history entry and updates the member's cached totals.
    ///
    /// Runs entirely on `db_tx`; the caller owns commit/rollback, so a
    /// failure here can never leave a half-applied posting behind.
    pub(super) async fn post_entry(
        &self,
        db_tx: &DatabaseTransaction,
        post: PostEntry,
    ) -> ResultEngine<BalanceHistoryEntry> {
        let member_model = members::Entity::find_by_id(post.member_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;

        if !member_model.active && post.category != LedgerCategory::Adjustment {
            return Err(EngineError::InactiveMember(member_model.number));
        }

        post.category
            .validate_deltas(post.amount_delta_minor, post.point_delta)?;
        validate_source_refs(post.category, post.deposit_id, post.cash_transaction_id)?;

        let balance_before = member_model.balance_minor;
        let points_before = member_model.points;
        let balance_after = balance_before
            .checked_add(post.amount_delta_minor)
            .ok_or_else(|| EngineError::InvalidAmount("balance overflow".to_string()))?;
        let points_after = points_before
            .checked_add(post.point_delta)
            .ok_or_else(|| EngineError::InvalidAmount("points overflow".to_string()))?;

        if balance_after < 0 {
            return Err(EngineError::InsufficientBalance(format!(
                "member {} holds {balance_before}, change {} refused",
                member_model.number, post.amount_delta_minor
            )));
        }
        if points_after < 0 {
            return Err(EngineError::InsufficientBalance(format!(
                "member {} holds {points_before} points, change {} refused",
                member_model.number, post.point_delta
            )));
        }

        let number = self
            .next_number(
                db_tx,
                "balance_history",
                numbers::LEDGER_TAG,
                post.occurred_at,
            )
            .await?;

        let entry = BalanceHistoryEntry {
            id: Uuid::new_v4(),
            number,
            member_id: post.member_id,
            direction: post
                .category
                .direction_for(post.amount_delta_minor, post.point_delta),
            category: post.category,
            amount_delta_minor: post.amount_delta_minor,
            point_delta: post.point_delta,
            balance_before_minor: balance_before,
            balance_after_minor: balance_after,
            points_before,
            points_after,
            deposit_id: post.deposit_id,
            cash_transaction_id: post.cash_transaction_id,
            admin_id: post.admin_id,
            occurred_at: post.occurred_at,
        };

        balance_history::ActiveModel::from(&entry)
            .insert(db_tx)
            .await
            .map_err(|err| numbers::map_number_conflict(err, &entry.number))?;

        let member_update = members::ActiveModel {
            id: ActiveValue::Set(member_model.id),
            balance_minor: ActiveValue::Set(balance_after),
            points: ActiveValue::Set(points_after),
            ..Default::default()
        };
        member_update.update(db_tx).await?;

        Ok(entry)
    }

    /// Redeems loyalty points, optionally crediting the member's balance.
    ///
    /// `points` is the amount spent (must be > 0); `credit_minor` is the
    /// balance credited in exchange (may be 0 when points buy goods).
    pub async fn exchange_points(
        &self,
        member_id: Uuid,
        points: i64,
        credit_minor: i64,
        admin_id: &str,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<BalanceHistoryEntry> {
        if points <= 0 {
            return Err(EngineError::InvalidAmount(
                "points to exchange must be > 0".to_string(),
            ));
        }
        if credit_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "exchange credit must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.post_entry(
                &db_tx,
                PostEntry {
                    member_id,
                    category: LedgerCategory::PointExchange,
                    amount_delta_minor: credit_minor,
                    point_delta: -points,
                    deposit_id: None,
                    cash_transaction_id: None,
                    admin_id: admin_id.to_string(),
                    occurred_at,
                },
            )
            .await
        })
    }

    /// Posts an admin correction. The only category valid on inactive
    /// members; corrections never rewrite earlier entries.
    pub async fn record_adjustment(
        &self,
        cmd: AdjustmentCmd,
    ) -> ResultEngine<BalanceHistoryEntry> {
        if cmd.amount_delta_minor == 0 && cmd.point_delta == 0 {
            return Err(EngineError::InvalidAmount(
                "adjustment must change balance or points".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.post_entry(
                &db_tx,
                PostEntry {
                    member_id: cmd.member_id,
                    category: LedgerCategory::Adjustment,
                    amount_delta_minor: cmd.amount_delta_minor,
                    point_delta: cmd.point_delta,
                    deposit_id: None,
                    cash_transaction_id: None,
                    admin_id: cmd.admin_id,
                    occurred_at: cmd.occurred_at,
                },
            )
            .await
        })
    }

    /// Lists a member's history entries, newest first.
    pub async fn list_balance_history(
        &self,
        member_id: Uuid,
        limit: u64,
    ) -> ResultEngine<Vec<BalanceHistoryEntry>> {
        let models: Vec<balance_history::Model> = balance_history::Entity::find()
            .filter(balance_history::Column::MemberId.eq(member_id.to_string()))
            .order_by_desc(balance_history::Column::OccurredAt)
            .order_by_desc(balance_history::Column::Number)
            .limit(limit)
            .all(&self.database)
            .await?;

        models.into_iter().map(BalanceHistoryEntry::try_from).collect()
    }

    /// Recomputes a member's balance/points from the sum of history deltas
    /// and reports whether the cached projection reconciles.
    pub async fn verify_member_ledger(&self, member_id: Uuid) -> ResultEngine<LedgerCheck> {
        let member_model = members::Entity::find_by_id(member_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;

        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT COALESCE(SUM(amount_delta_minor), 0) AS balance_sum, \
             COALESCE(SUM(point_delta), 0) AS point_sum \
             FROM balance_history WHERE member_id = ?",
            vec![member_id.to_string().into()],
        );
        let row = self.database.query_one(stmt).await?;
        let (ledger_balance_minor, ledger_points) = match row {
            Some(row) => (
                row.try_get("", "balance_sum").unwrap_or(0),
                row.try_get("", "point_sum").unwrap_or(0),
            ),
            None => (0, 0),
        };

        Ok(LedgerCheck {
            member_id,
            cached_balance_minor: member_model.balance_minor,
            cached_points: member_model.points,
            ledger_balance_minor,
            ledger_points,
        })
    }
}

fn validate_source_refs(
    category: LedgerCategory,
    deposit_id: Option<Uuid>,
    cash_transaction_id: Option<Uuid>,
) -> ResultEngine<()> {
    let ok = match category {
        LedgerCategory::Deposit => deposit_id.is_some() && cash_transaction_id.is_none(),
        LedgerCategory::Withdrawal => deposit_id.is_none() && cash_transaction_id.is_some(),
        LedgerCategory::PointExchange | LedgerCategory::Adjustment => {
            deposit_id.is_none() && cash_transaction_id.is_none()
        }
    };
    if !ok {
        return Err(EngineError::InvalidCategoryDirection(format!(
            "category {} carries the wrong source reference",
            category.as_str()
        )));
    }
    Ok(())
}
