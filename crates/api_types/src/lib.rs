use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role attached to a login.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Member,
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        /// Opaque bearer token; send as `Authorization: Bearer <token>`.
        pub token: String,
        pub role: Role,
    }
}

pub mod member {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberNew {
        pub name: String,
        pub phone: Option<String>,
    }

    /// Request body for suspending/reactivating a member.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberActive {
        pub active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub id: Uuid,
        /// Human-facing member number (`A-0001`).
        pub number: String,
        pub name: String,
        pub phone: Option<String>,
        pub balance_minor: i64,
        pub points: i64,
        pub total_weight_grams: i64,
        pub active: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<MemberView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MemberList {
        pub active_only: Option<bool>,
        pub limit: Option<u64>,
    }
}

pub mod waste_type {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WasteTypeNew {
        pub name: String,
        pub price_per_kg_minor: i64,
        pub points_per_kg: i64,
    }

    /// Partial update; absent fields keep their value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct WasteTypePatch {
        pub price_per_kg_minor: Option<i64>,
        pub points_per_kg: Option<i64>,
        pub active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WasteTypeView {
        pub id: Uuid,
        pub name: String,
        pub price_per_kg_minor: i64,
        pub points_per_kg: i64,
        pub active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WasteTypesResponse {
        pub waste_types: Vec<WasteTypeView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct WasteTypeList {
        pub active_only: Option<bool>,
    }
}

pub mod deposit {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepositNew {
        pub member_id: Uuid,
        pub waste_type_id: Uuid,
        pub weight_grams: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepositView {
        pub id: Uuid,
        pub member_id: Uuid,
        pub waste_type_id: Uuid,
        pub weight_grams: i64,
        /// Catalog rate snapshotted at deposit time.
        pub price_per_kg_minor: i64,
        pub points_per_kg: i64,
        pub total_minor: i64,
        pub points_earned: i64,
        pub occurred_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepositsResponse {
        pub deposits: Vec<DepositView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DepositList {
        pub limit: Option<u64>,
    }
}

pub mod cash {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CashDirection {
        In,
        Out,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CashCategory {
        CollectorSale,
        OperationalExpense,
        MemberWithdrawal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashTransactionNew {
        pub direction: CashDirection,
        pub category: CashCategory,
        pub amount_minor: i64,
        /// Required iff `category == member_withdrawal`.
        pub member_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashTransactionView {
        pub id: Uuid,
        /// Document number (`KAS/{YYYYMMDD}/{seq}`).
        pub number: String,
        pub direction: CashDirection,
        pub category: CashCategory,
        pub amount_minor: i64,
        pub member_id: Option<Uuid>,
        pub occurred_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashTransactionsResponse {
        pub cash_transactions: Vec<CashTransactionView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CashList {
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashSummaryView {
        pub total_in_minor: i64,
        pub total_out_minor: i64,
        pub net_minor: i64,
        pub collector_sales_minor: i64,
        pub operational_expenses_minor: i64,
        pub member_withdrawals_minor: i64,
    }
}

pub mod history {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum LedgerCategory {
        Deposit,
        Withdrawal,
        PointExchange,
        Adjustment,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryEntryView {
        pub id: Uuid,
        /// Document number (`TRX/{YYYYMMDD}/{seq}`).
        pub number: String,
        pub category: LedgerCategory,
        pub amount_delta_minor: i64,
        pub point_delta: i64,
        pub balance_before_minor: i64,
        pub balance_after_minor: i64,
        pub points_before: i64,
        pub points_after: i64,
        pub occurred_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryResponse {
        pub entries: Vec<HistoryEntryView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct HistoryList {
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PointExchangeNew {
        pub member_id: Uuid,
        /// Points spent; must be > 0.
        pub points: i64,
        /// Balance credited in exchange; 0 when points buy goods directly.
        pub credit_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AdjustmentNew {
        pub member_id: Uuid,
        pub amount_delta_minor: i64,
        pub point_delta: i64,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardView {
        pub member_count: i64,
        pub active_member_count: i64,
        pub total_balance_minor: i64,
        pub total_points: i64,
        pub total_weight_grams: i64,
        pub deposit_count: i64,
        pub cash: super::cash::CashSummaryView,
    }
}
