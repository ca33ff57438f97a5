//! Waste-type catalog endpoints.

use api_types::waste_type::{
    WasteTypeList, WasteTypeNew, WasteTypePatch, WasteTypeView, WasteTypesResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::AuthUser, server::ServerState};

fn waste_type_view(waste_type: engine::WasteType) -> WasteTypeView {
    WasteTypeView {
        id: waste_type.id,
        name: waste_type.name,
        price_per_kg_minor: waste_type.price_per_kg_minor,
        points_per_kg: waste_type.points_per_kg,
        active: waste_type.active,
    }
}

pub async fn create(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<WasteTypeNew>,
) -> Result<(StatusCode, Json<WasteTypeView>), ServerError> {
    auth.require_admin()?;

    let waste_type = state
        .engine
        .create_waste_type(
            &payload.name,
            payload.price_per_kg_minor,
            payload.points_per_kg,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(waste_type_view(waste_type))))
}

/// Members may read the catalog; prices are not a secret to them.
pub async fn list(
    Extension(_auth): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<WasteTypeList>,
) -> Result<Json<WasteTypesResponse>, ServerError> {
    let waste_types = state
        .engine
        .list_waste_types(query.active_only.unwrap_or(false))
        .await?;
    Ok(Json(WasteTypesResponse {
        waste_types: waste_types.into_iter().map(waste_type_view).collect(),
    }))
}

pub async fn update(
    Extension(auth): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(waste_type_id): Path<Uuid>,
    Json(payload): Json<WasteTypePatch>,
) -> Result<Json<WasteTypeView>, ServerError> {
    auth.require_admin()?;

    if payload.price_per_kg_minor.is_none()
        && payload.points_per_kg.is_none()
        && payload.active.is_none()
    {
        return Err(ServerError::Generic("no fields to update".to_string()));
    }

    let mut waste_type = if payload.price_per_kg_minor.is_some() || payload.points_per_kg.is_some()
    {
        state
            .engine
            .update_waste_type(
                waste_type_id,
                payload.price_per_kg_minor,
                payload.points_per_kg,
            )
            .await?
    } else {
        state.engine.waste_type(waste_type_id).await?
    };

    if let Some(active) = payload.active {
        waste_type = state
            .engine
            .set_waste_type_active(waste_type_id, active)
            .await?;
    }

    Ok(Json(waste_type_view(waste_type)))
}
