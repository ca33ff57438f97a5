//! Member self-service endpoints. Admins get 403 here; they have the
//! member-scoped routes instead.

use api_types::deposit::{DepositList, DepositsResponse};
use api_types::history::{HistoryList, HistoryResponse};
use api_types::member::MemberView;
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{ServerError, deposits, ledger, members, server::AuthUser, server::ServerState};

pub async fn profile(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<MemberView>, ServerError> {
    let member_id = auth.require_member()?;

    let member = state.engine.member(member_id).await?;
    Ok(Json(members::member_view(member)))
}

pub async fn history(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<HistoryList>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let member_id = auth.require_member()?;

    let entries = state
        .engine
        .list_balance_history(member_id, query.limit.unwrap_or(100))
        .await?;
    Ok(Json(HistoryResponse {
        entries: entries.into_iter().map(ledger::history_view).collect(),
    }))
}

pub async fn deposits(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<DepositList>,
) -> Result<Json<DepositsResponse>, ServerError> {
    let member_id = auth.require_member()?;

    let rows = state
        .engine
        .list_deposits_for_member(member_id, query.limit.unwrap_or(100))
        .await?;
    Ok(Json(DepositsResponse {
        deposits: rows.into_iter().map(deposits::deposit_view).collect(),
    }))
}
