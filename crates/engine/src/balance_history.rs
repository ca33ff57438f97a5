//! Append-only balance/point ledger.
//!
//! Every change to a member's balance or points is recorded here with
//! before/after snapshots. Rows are never updated or deleted; corrections are
//! posted as new `adjustment` entries. Member rows cache the latest after
//! values and must always reconcile to the sum of these deltas.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerDirection {
    In,
    Out,
}

impl LedgerDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl TryFrom<&str> for LedgerDirection {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid ledger direction: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerCategory {
    /// Waste drop-off credit.
    Deposit,
    /// Balance payout, always linked to a cash transaction.
    Withdrawal,
    /// Points redeemed, optionally for a balance credit.
    PointExchange,
    /// Admin correction; the only category allowed on inactive members.
    Adjustment,
}

impl LedgerCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::PointExchange => "point_exchange",
            Self::Adjustment => "adjustment",
        }
    }

    /// Validates that the delta signs match the category's direction.
    ///
    /// - deposit: both deltas credit (>= 0)
    /// - withdrawal: amount strictly debits, points untouched
    /// - point exchange: points strictly spent, amount may credit
    /// - adjustment: either sign
    pub fn validate_deltas(self, amount_delta_minor: i64, point_delta: i64) -> ResultEngine<()> {
        let ok = match self {
            Self::Deposit => amount_delta_minor >= 0 && point_delta >= 0,
            Self::Withdrawal => amount_delta_minor < 0 && point_delta == 0,
            Self::PointExchange => point_delta < 0 && amount_delta_minor >= 0,
            Self::Adjustment => true,
        };
        if !ok {
            return Err(EngineError::InvalidCategoryDirection(format!(
                "category {} cannot take amount delta {amount_delta_minor} and point delta {point_delta}",
                self.as_str()
            )));
        }
        Ok(())
    }

    /// The direction column recorded for the given deltas.
    pub fn direction_for(self, amount_delta_minor: i64, point_delta: i64) -> LedgerDirection {
        match self {
            Self::Deposit => LedgerDirection::In,
            Self::Withdrawal => LedgerDirection::Out,
            Self::PointExchange => {
                if amount_delta_minor > 0 {
                    LedgerDirection::In
                } else {
                    LedgerDirection::Out
                }
            }
            Self::Adjustment => {
                if amount_delta_minor > 0 || (amount_delta_minor == 0 && point_delta >= 0) {
                    LedgerDirection::In
                } else {
                    LedgerDirection::Out
                }
            }
        }
    }
}

impl TryFrom<&str> for LedgerCategory {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            "point_exchange" => Ok(Self::PointExchange),
            "adjustment" => Ok(Self::Adjustment),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid ledger category: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceHistoryEntry {
    pub id: Uuid,
    /// Unique document number (`TRX/{YYYYMMDD}/{seq}`).
    pub number: String,
    pub member_id: Uuid,
    pub direction: LedgerDirection,
    pub category: LedgerCategory,
    pub amount_delta_minor: i64,
    pub point_delta: i64,
    pub balance_before_minor: i64,
    pub balance_after_minor: i64,
    pub points_before: i64,
    pub points_after: i64,
    pub deposit_id: Option<Uuid>,
    pub cash_transaction_id: Option<Uuid>,
    pub admin_id: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "balance_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub number: String,
    pub member_id: String,
    pub direction: String,
    pub category: String,
    pub amount_delta_minor: i64,
    pub point_delta: i64,
    pub balance_before_minor: i64,
    pub balance_after_minor: i64,
    pub points_before: i64,
    pub points_after: i64,
    pub deposit_id: Option<String>,
    pub cash_transaction_id: Option<String>,
    pub admin_id: String,
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
        belongs_to = "super::deposits::Entity",
        from = "Column::DepositId",
        to = "super::deposits::Column::Id"
    )]
    Deposits,
    #[sea_orm(
        belongs_to = "super::cash_transactions::Entity",
        from = "Column::CashTransactionId",
        to = "super::cash_transactions::Column::Id"
    )]
    CashTransactions,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BalanceHistoryEntry> for ActiveModel {
    fn from(entry: &BalanceHistoryEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            number: ActiveValue::Set(entry.number.clone()),
            member_id: ActiveValue::Set(entry.member_id.to_string()),
            direction: ActiveValue::Set(entry.direction.as_str().to_string()),
            category: ActiveValue::Set(entry.category.as_str().to_string()),
            amount_delta_minor: ActiveValue::Set(entry.amount_delta_minor),
            point_delta: ActiveValue::Set(entry.point_delta),
            balance_before_minor: ActiveValue::Set(entry.balance_before_minor),
            balance_after_minor: ActiveValue::Set(entry.balance_after_minor),
            points_before: ActiveValue::Set(entry.points_before),
            points_after: ActiveValue::Set(entry.points_after),
            deposit_id: ActiveValue::Set(entry.deposit_id.map(|id| id.to_string())),
            cash_transaction_id: ActiveValue::Set(
                entry.cash_transaction_id.map(|id| id.to_string()),
            ),
            admin_id: ActiveValue::Set(entry.admin_id.clone()),
            occurred_at: ActiveValue::Set(entry.occurred_at),
        }
    }
}

impl TryFrom<Model> for BalanceHistoryEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("history entry not exists".to_string()))?,
            number: model.number,
            member_id: util::parse_uuid(&model.member_id, "member")?,
            direction: LedgerDirection::try_from(model.direction.as_str())?,
            category: LedgerCategory::try_from(model.category.as_str())?,
            amount_delta_minor: model.amount_delta_minor,
            point_delta: model.point_delta,
            balance_before_minor: model.balance_before_minor,
            balance_after_minor: model.balance_after_minor,
            points_before: model.points_before,
            points_after: model.points_after,
            deposit_id: model
                .deposit_id
                .as_deref()
                .map(|s| util::parse_uuid(s, "deposit"))
                .transpose()?,
            cash_transaction_id: model
                .cash_transaction_id
                .as_deref()
                .map(|s| util::parse_uuid(s, "cash_transaction"))
                .transpose()?,
            admin_id: model.admin_id,
            occurred_at: model.occurred_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_deltas_must_credit() {
        assert!(LedgerCategory::Deposit.validate_deltas(100, 2).is_ok());
        assert!(LedgerCategory::Deposit.validate_deltas(0, 0).is_ok());
        assert!(LedgerCategory::Deposit.validate_deltas(-1, 0).is_err());
    }

    #[test]
    fn withdrawal_deltas_must_debit_amount_only() {
        assert!(LedgerCategory::Withdrawal.validate_deltas(-100, 0).is_ok());
        assert!(LedgerCategory::Withdrawal.validate_deltas(100, 0).is_err());
        assert!(LedgerCategory::Withdrawal.validate_deltas(-100, -1).is_err());
    }

    #[test]
    fn point_exchange_spends_points() {
        assert!(LedgerCategory::PointExchange.validate_deltas(500, -10).is_ok());
        assert!(LedgerCategory::PointExchange.validate_deltas(0, -10).is_ok());
        assert!(LedgerCategory::PointExchange.validate_deltas(500, 10).is_err());
        assert!(LedgerCategory::PointExchange.validate_deltas(-500, -10).is_err());
    }

    #[test]
    fn adjustment_takes_either_sign() {
        assert!(LedgerCategory::Adjustment.validate_deltas(-100, 10).is_ok());
        assert!(LedgerCategory::Adjustment.validate_deltas(100, -10).is_ok());
    }
}
