//! Point exchanges and admin adjustments, plus the shared history view.

use api_types::history::{
    AdjustmentNew, HistoryEntryView, LedgerCategory as ApiCategory, PointExchangeNew,
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::{ServerError, server::AuthUser, server::ServerState};
use engine::{AdjustmentCmd, LedgerCategory};

fn category_view(category: LedgerCategory) -> ApiCategory {
    match category {
        LedgerCategory::Deposit => ApiCategory::Deposit,
        LedgerCategory::Withdrawal => ApiCategory::Withdrawal,
        LedgerCategory::PointExchange => ApiCategory::PointExchange,
        LedgerCategory::Adjustment => ApiCategory::Adjustment,
    }
}

pub(crate) fn history_view(entry: engine::BalanceHistoryEntry) -> HistoryEntryView {
    HistoryEntryView {
        id: entry.id,
        number: entry.number,
        category: category_view(entry.category),
        amount_delta_minor: entry.amount_delta_minor,
        point_delta: entry.point_delta,
        balance_before_minor: entry.balance_before_minor,
        balance_after_minor: entry.balance_after_minor,
        points_before: entry.points_before,
        points_after: entry.points_after,
        occurred_at: entry.occurred_at,
    }
}

pub async fn exchange_points(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<PointExchangeNew>,
) -> Result<(StatusCode, Json<HistoryEntryView>), ServerError> {
    auth.require_admin()?;

    let entry = state
        .engine
        .exchange_points(
            payload.member_id,
            payload.points,
            payload.credit_minor,
            &auth.username,
            Utc::now(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(history_view(entry))))
}

pub async fn adjust(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<AdjustmentNew>,
) -> Result<(StatusCode, Json<HistoryEntryView>), ServerError> {
    auth.require_admin()?;

    let entry = state
        .engine
        .record_adjustment(
            AdjustmentCmd::new(payload.member_id, auth.username, Utc::now())
                .amount_delta_minor(payload.amount_delta_minor)
                .point_delta(payload.point_delta),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(history_view(entry))))
}
