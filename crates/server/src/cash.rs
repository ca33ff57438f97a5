//! Organization cash endpoints (admin side).

use api_types::cash::{
    CashCategory as ApiCategory, CashDirection as ApiDirection, CashList, CashSummaryView,
    CashTransactionNew, CashTransactionView, CashTransactionsResponse,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::{ServerError, server::AuthUser, server::ServerState};
use engine::{CashCategory, CashDirection, CashTransactionCmd};

fn map_direction(direction: ApiDirection) -> CashDirection {
    match direction {
        ApiDirection::In => CashDirection::In,
        ApiDirection::Out => CashDirection::Out,
    }
}

fn direction_view(direction: CashDirection) -> ApiDirection {
    match direction {
        CashDirection::In => ApiDirection::In,
        CashDirection::Out => ApiDirection::Out,
    }
}

fn map_category(category: ApiCategory) -> CashCategory {
    match category {
        ApiCategory::CollectorSale => CashCategory::CollectorSale,
        ApiCategory::OperationalExpense => CashCategory::OperationalExpense,
        ApiCategory::MemberWithdrawal => CashCategory::MemberWithdrawal,
    }
}

fn category_view(category: CashCategory) -> ApiCategory {
    match category {
        CashCategory::CollectorSale => ApiCategory::CollectorSale,
        CashCategory::OperationalExpense => ApiCategory::OperationalExpense,
        CashCategory::MemberWithdrawal => ApiCategory::MemberWithdrawal,
    }
}

fn cash_view(tx: engine::CashTransaction) -> CashTransactionView {
    CashTransactionView {
        id: tx.id,
        number: tx.number,
        direction: direction_view(tx.direction),
        category: category_view(tx.category),
        amount_minor: tx.amount_minor,
        member_id: tx.member_id,
        occurred_at: tx.occurred_at,
    }
}

pub async fn create(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<CashTransactionNew>,
) -> Result<(StatusCode, Json<CashTransactionView>), ServerError> {
    auth.require_admin()?;

    let mut cmd = CashTransactionCmd::new(
        map_direction(payload.direction),
        map_category(payload.category),
        payload.amount_minor,
        auth.username,
        Utc::now(),
    );
    if let Some(member_id) = payload.member_id {
        cmd = cmd.member_id(member_id);
    }

    let tx = state.engine.record_cash_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(cash_view(tx))))
}

pub async fn list(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<CashList>,
) -> Result<Json<CashTransactionsResponse>, ServerError> {
    auth.require_admin()?;

    let transactions = state
        .engine
        .list_cash_transactions(query.limit.unwrap_or(100))
        .await?;
    Ok(Json(CashTransactionsResponse {
        cash_transactions: transactions.into_iter().map(cash_view).collect(),
    }))
}

pub(crate) fn summary_view(summary: &engine::CashSummary) -> CashSummaryView {
    CashSummaryView {
        total_in_minor: summary.total_in_minor,
        total_out_minor: summary.total_out_minor,
        net_minor: summary.net_minor(),
        collector_sales_minor: summary.collector_sales_minor,
        operational_expenses_minor: summary.operational_expenses_minor,
        member_withdrawals_minor: summary.member_withdrawals_minor,
    }
}

pub async fn summary(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<CashSummaryView>, ServerError> {
    auth.require_admin()?;

    let summary = state.engine.cash_summary().await?;
    Ok(Json(summary_view(&summary)))
}
