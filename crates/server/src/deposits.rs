//! Deposit recording endpoints (admin side).

use api_types::deposit::{DepositList, DepositNew, DepositView, DepositsResponse};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::{ServerError, server::AuthUser, server::ServerState};
use engine::DepositCmd;

pub(crate) fn deposit_view(deposit: engine::Deposit) -> DepositView {
    DepositView {
        id: deposit.id,
        member_id: deposit.member_id,
        waste_type_id: deposit.waste_type_id,
        weight_grams: deposit.weight_grams,
        price_per_kg_minor: deposit.price_per_kg_minor,
        points_per_kg: deposit.points_per_kg,
        total_minor: deposit.total_minor,
        points_earned: deposit.points_earned,
        occurred_at: deposit.occurred_at,
    }
}

pub async fn create(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<DepositNew>,
) -> Result<(StatusCode, Json<DepositView>), ServerError> {
    auth.require_admin()?;

    let deposit = state
        .engine
        .record_deposit(DepositCmd::new(
            payload.member_id,
            payload.waste_type_id,
            payload.weight_grams,
            auth.username,
            Utc::now(),
        ))
        .await?;
    Ok((StatusCode::CREATED, Json(deposit_view(deposit))))
}

pub async fn list(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<DepositList>,
) -> Result<Json<DepositsResponse>, ServerError> {
    auth.require_admin()?;

    let deposits = state
        .engine
        .list_deposits(query.limit.unwrap_or(100))
        .await?;
    Ok(Json(DepositsResponse {
        deposits: deposits.into_iter().map(deposit_view).collect(),
    }))
}
