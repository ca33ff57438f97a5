//! Login and logout.

use api_types::auth::{LoginRequest, LoginResponse};
use axum::{Json, extract::State, http::StatusCode};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, session};
use engine::{EngineError, Role};

fn map_role(role: Role) -> api_types::Role {
    match role {
        Role::Admin => api_types::Role::Admin,
        Role::Member => api_types::Role::Member,
    }
}

/// Exchanges credentials for a fresh session token, invalidating any
/// previous tokens for the user.
///
/// Member-role logins whose linked member record is missing or inactive are
/// refused with 403 after deleting every session row the user holds; the
/// response body names no member.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
    let user = engine::users::Entity::find_by_id(payload.username)
        .one(&state.db)
        .await?;
    let user = match user {
        Some(user) if user.password == payload.password => user,
        _ => return Err(ServerError::Unauthorized),
    };

    let role = Role::try_from(user.role.as_str())?;
    if role == Role::Member {
        // A database fault here must not kill the sessions; only a missing
        // or suspended member record does.
        let active = match user
            .member_id
            .as_deref()
            .and_then(|id| Uuid::parse_str(id).ok())
        {
            Some(member_id) => match state.engine.member(member_id).await {
                Ok(member) => member.active,
                Err(EngineError::KeyNotFound(_)) => false,
                Err(err) => return Err(err.into()),
            },
            None => false,
        };
        if !active {
            session::delete_for_user(&state.db, &user.username).await?;
            return Err(ServerError::Forbidden("account inactive".to_string()));
        }
    }

    let token = session::rotate(&state.db, &user.username).await?;
    Ok(Json(LoginResponse {
        token,
        role: map_role(role),
    }))
}

/// Deletes the presented token.
pub async fn logout(
    TypedHeader(bearer): TypedHeader<Authorization<Bearer>>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    session::delete_token(&state.db, bearer.token()).await?;
    Ok(StatusCode::NO_CONTENT)
}
