//! Aggregate read queries for reporting.

use sea_orm::{ConnectionTrait, Statement};
use serde::{Deserialize, Serialize};

use crate::{CashCategory, CashDirection, ResultEngine};

use super::Engine;

/// Organization cash totals, overall and per category (minor units).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashSummary {
    pub total_in_minor: i64,
    pub total_out_minor: i64,
    pub collector_sales_minor: i64,
    pub operational_expenses_minor: i64,
    pub member_withdrawals_minor: i64,
}

impl CashSummary {
    /// Net cash position.
    #[must_use]
    pub fn net_minor(&self) -> i64 {
        self.total_in_minor - self.total_out_minor
    }
}

/// Headline figures for the admin dashboard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub member_count: i64,
    pub active_member_count: i64,
    pub total_balance_minor: i64,
    pub total_points: i64,
    pub total_weight_grams: i64,
    pub deposit_count: i64,
    pub cash: CashSummary,
}

impl Engine {
    /// Cash totals via SQL aggregation; the table is small enough that no
    /// denormalized counters are kept for it.
    pub async fn cash_summary(&self) -> ResultEngine<CashSummary> {
        let total_in_minor = self
            .sum_cash("direction = ?", vec![CashDirection::In.as_str().into()])
            .await?;
        let total_out_minor = self
            .sum_cash("direction = ?", vec![CashDirection::Out.as_str().into()])
            .await?;
        let collector_sales_minor = self
            .sum_cash(
                "category = ?",
                vec![CashCategory::CollectorSale.as_str().into()],
            )
            .await?;
        let operational_expenses_minor = self
            .sum_cash(
                "category = ?",
                vec![CashCategory::OperationalExpense.as_str().into()],
            )
            .await?;
        let member_withdrawals_minor = self
            .sum_cash(
                "category = ?",
                vec![CashCategory::MemberWithdrawal.as_str().into()],
            )
            .await?;

        Ok(CashSummary {
            total_in_minor,
            total_out_minor,
            collector_sales_minor,
            operational_expenses_minor,
            member_withdrawals_minor,
        })
    }

    /// Headline dashboard figures.
    pub async fn dashboard(&self) -> ResultEngine<DashboardStats> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_string(
            backend,
            "SELECT COUNT(*) AS member_count, \
             COALESCE(SUM(active), 0) AS active_member_count, \
             COALESCE(SUM(balance_minor), 0) AS total_balance, \
             COALESCE(SUM(points), 0) AS total_points, \
             COALESCE(SUM(total_weight_grams), 0) AS total_weight \
             FROM members"
                .to_string(),
        );
        let row = self.database.query_one(stmt).await?;

        let (member_count, active_member_count, total_balance_minor, total_points, total_weight_grams) =
            match row {
                Some(row) => (
                    row.try_get("", "member_count").unwrap_or(0),
                    row.try_get("", "active_member_count").unwrap_or(0),
                    row.try_get("", "total_balance").unwrap_or(0),
                    row.try_get("", "total_points").unwrap_or(0),
                    row.try_get("", "total_weight").unwrap_or(0),
                ),
                None => (0, 0, 0, 0, 0),
            };

        let deposit_stmt = Statement::from_string(
            backend,
            "SELECT COUNT(*) AS deposit_count FROM deposits".to_string(),
        );
        let deposit_count = self
            .database
            .query_one(deposit_stmt)
            .await?
            .and_then(|r| r.try_get("", "deposit_count").ok())
            .unwrap_or(0);

        Ok(DashboardStats {
            member_count,
            active_member_count,
            total_balance_minor,
            total_points,
            total_weight_grams,
            deposit_count,
            cash: self.cash_summary().await?,
        })
    }

    async fn sum_cash(
        &self,
        condition: &str,
        values: Vec<sea_orm::Value>,
    ) -> ResultEngine<i64> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            format!(
                "SELECT COALESCE(SUM(amount_minor), 0) AS sum \
                 FROM cash_transactions WHERE {condition}"
            ),
            values,
        );
        let row = self.database.query_one(stmt).await?;
        Ok(row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0))
    }
}
