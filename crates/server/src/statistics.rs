//! Dashboard endpoint.

use api_types::stats::DashboardView;
use axum::{Extension, Json, extract::State};

use crate::{ServerError, cash, server::AuthUser, server::ServerState};

pub async fn dashboard(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<DashboardView>, ServerError> {
    auth.require_admin()?;

    let stats = state.engine.dashboard().await?;
    Ok(Json(DashboardView {
        member_count: stats.member_count,
        active_member_count: stats.active_member_count,
        total_balance_minor: stats.total_balance_minor,
        total_points: stats.total_points,
        total_weight_grams: stats.total_weight_grams,
        deposit_count: stats.deposit_count,
        cash: cash::summary_view(&stats.cash),
    }))
}
