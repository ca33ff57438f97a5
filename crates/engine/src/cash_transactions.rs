//! Organization-level cash ledger.
//!
//! Cash transactions track money entering and leaving the bank itself (sales
//! to collectors, operational expenses, member withdrawals). Member balances
//! are touched only via the balance-history ledger; a withdrawal row links to
//! the history entry it produced.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashDirection {
    In,
    Out,
}

impl CashDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl TryFrom<&str> for CashDirection {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid cash direction: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashCategory {
    /// Sale of collected waste to a collector (money in).
    CollectorSale,
    /// Operational expense (money out).
    OperationalExpense,
    /// Payout of a member's balance (money out).
    MemberWithdrawal,
}

impl CashCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CollectorSale => "collector_sale",
            Self::OperationalExpense => "operational_expense",
            Self::MemberWithdrawal => "member_withdrawal",
        }
    }

    /// The direction every transaction of this category must carry.
    pub fn direction(self) -> CashDirection {
        match self {
            Self::CollectorSale => CashDirection::In,
            Self::OperationalExpense | Self::MemberWithdrawal => CashDirection::Out,
        }
    }

    /// Whether a member reference is required (withdrawals) or forbidden.
    pub fn requires_member(self) -> bool {
        matches!(self, Self::MemberWithdrawal)
    }
}

impl TryFrom<&str> for CashCategory {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "collector_sale" => Ok(Self::CollectorSale),
            "operational_expense" => Ok(Self::OperationalExpense),
            "member_withdrawal" => Ok(Self::MemberWithdrawal),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid cash category: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashTransaction {
    pub id: Uuid,
    /// Unique document number (`KAS/{YYYYMMDD}/{seq}`).
    pub number: String,
    pub direction: CashDirection,
    pub category: CashCategory,
    pub amount_minor: i64,
    /// Set iff `category == MemberWithdrawal`.
    pub member_id: Option<Uuid>,
    pub admin_id: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub number: String,
    pub direction: String,
    pub category: String,
    pub amount_minor: i64,
    pub member_id: Option<String>,
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
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CashTransaction> for ActiveModel {
    fn from(tx: &CashTransaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            number: ActiveValue::Set(tx.number.clone()),
            direction: ActiveValue::Set(tx.direction.as_str().to_string()),
            category: ActiveValue::Set(tx.category.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            member_id: ActiveValue::Set(tx.member_id.map(|id| id.to_string())),
            admin_id: ActiveValue::Set(tx.admin_id.clone()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
        }
    }
}

impl TryFrom<Model> for CashTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("cash_transaction not exists".to_string()))?,
            number: model.number,
            direction: CashDirection::try_from(model.direction.as_str())?,
            category: CashCategory::try_from(model.category.as_str())?,
            amount_minor: model.amount_minor,
            member_id: model
                .member_id
                .as_deref()
                .map(|s| util::parse_uuid(s, "member"))
                .transpose()?,
            admin_id: model.admin_id,
            occurred_at: model.occurred_at,
        })
    }
}
