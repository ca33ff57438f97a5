//! Member management endpoints (admin side).

use api_types::member::{MemberActive, MemberList, MemberNew, MemberView, MembersResponse};
use api_types::{deposit::DepositsResponse, history::HistoryResponse};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, deposits as deposit_views, ledger, server::AuthUser, server::ServerState};

const DEFAULT_LIST_LIMIT: u64 = 100;

pub(crate) fn member_view(member: engine::Member) -> MemberView {
    MemberView {
        id: member.id,
        number: member.number,
        name: member.name,
        phone: member.phone,
        balance_minor: member.balance_minor,
        points: member.points,
        total_weight_grams: member.total_weight_grams,
        active: member.active,
        created_at: member.created_at,
    }
}

pub async fn create(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<MemberNew>,
) -> Result<(StatusCode, Json<MemberView>), ServerError> {
    auth.require_admin()?;

    let member = state
        .engine
        .register_member(&payload.name, payload.phone.as_deref(), Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(member_view(member))))
}

pub async fn list(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<MemberList>,
) -> Result<Json<MembersResponse>, ServerError> {
    auth.require_admin()?;

    let members = state
        .engine
        .list_members(
            query.active_only.unwrap_or(false),
            query.limit.unwrap_or(DEFAULT_LIST_LIMIT),
        )
        .await?;
    Ok(Json(MembersResponse {
        members: members.into_iter().map(member_view).collect(),
    }))
}

pub async fn get(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<MemberView>, ServerError> {
    auth.require_admin()?;

    let member = state.engine.member(member_id).await?;
    Ok(Json(member_view(member)))
}

pub async fn set_active(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<MemberActive>,
) -> Result<Json<MemberView>, ServerError> {
    auth.require_admin()?;

    let member = state
        .engine
        .set_member_active(member_id, payload.active)
        .await?;
    Ok(Json(member_view(member)))
}

pub async fn history(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(member_id): Path<Uuid>,
    Query(query): Query<api_types::history::HistoryList>,
) -> Result<Json<HistoryResponse>, ServerError> {
    auth.require_admin()?;

    let entries = state
        .engine
        .list_balance_history(member_id, query.limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .await?;
    Ok(Json(HistoryResponse {
        entries: entries.into_iter().map(ledger::history_view).collect(),
    }))
}

pub async fn deposits(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(member_id): Path<Uuid>,
    Query(query): Query<api_types::deposit::DepositList>,
) -> Result<Json<DepositsResponse>, ServerError> {
    auth.require_admin()?;

    let deposits = state
        .engine
        .list_deposits_for_member(member_id, query.limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .await?;
    Ok(Json(DepositsResponse {
        deposits: deposits
            .into_iter()
            .map(deposit_views::deposit_view)
            .collect(),
    }))
}
