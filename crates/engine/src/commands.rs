//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::cash_transactions::{CashCategory, CashDirection};

/// Record a waste drop-off for a member.
#[derive(Clone, Debug)]
pub struct DepositCmd {
    pub member_id: Uuid,
    pub waste_type_id: Uuid,
    pub weight_grams: i64,
    pub admin_id: String,
    pub occurred_at: DateTime<Utc>,
}

impl DepositCmd {
    #[must_use]
    pub fn new(
        member_id: Uuid,
        waste_type_id: Uuid,
        weight_grams: i64,
        admin_id: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            member_id,
            waste_type_id,
            weight_grams,
            admin_id: admin_id.into(),
            occurred_at,
        }
    }
}

/// Record an organization cash movement.
#[derive(Clone, Debug)]
pub struct CashTransactionCmd {
    pub direction: CashDirection,
    pub category: CashCategory,
    pub amount_minor: i64,
    /// Required iff `category == MemberWithdrawal`.
    pub member_id: Option<Uuid>,
    pub admin_id: String,
    pub occurred_at: DateTime<Utc>,
}

impl CashTransactionCmd {
    #[must_use]
    pub fn new(
        direction: CashDirection,
        category: CashCategory,
        amount_minor: i64,
        admin_id: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            direction,
            category,
            amount_minor,
            member_id: None,
            admin_id: admin_id.into(),
            occurred_at,
        }
    }

    #[must_use]
    pub fn member_id(mut self, member_id: Uuid) -> Self {
        self.member_id = Some(member_id);
        self
    }
}

/// Post an admin correction to a member's ledger.
///
/// Either delta may be positive or negative; the result must not drive the
/// cached balance or points below zero.
#[derive(Clone, Debug)]
pub struct AdjustmentCmd {
    pub member_id: Uuid,
    pub amount_delta_minor: i64,
    pub point_delta: i64,
    pub admin_id: String,
    pub occurred_at: DateTime<Utc>,
}

impl AdjustmentCmd {
    #[must_use]
    pub fn new(member_id: Uuid, admin_id: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            member_id,
            amount_delta_minor: 0,
            point_delta: 0,
            admin_id: admin_id.into(),
            occurred_at,
        }
    }

    #[must_use]
    pub fn amount_delta_minor(mut self, delta: i64) -> Self {
        self.amount_delta_minor = delta;
        self
    }

    #[must_use]
    pub fn point_delta(mut self, delta: i64) -> Self {
        self.point_delta = delta;
        self
    }
}
