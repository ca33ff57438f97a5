use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use std::sync::Arc;

use crate::{
    ServerError, auth, cash, deposits, ledger, me, members, session, statistics, waste_types,
};
use engine::{Engine, EngineError, Role};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// Authenticated caller, injected as a request extension by the auth
/// middleware.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub username: String,
    pub role: Role,
    /// Linked member record; set for member-role users only.
    pub member_id: Option<Uuid>,
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), EngineError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(EngineError::Forbidden("admin only".to_string()))
        }
    }

    /// Returns the caller's member id; admins are refused.
    pub fn require_member(&self) -> Result<Uuid, EngineError> {
        match (self.role, self.member_id) {
            (Role::Member, Some(id)) => Ok(id),
            _ => Err(EngineError::Forbidden("member only".to_string())),
        }
    }
}

/// Resolves `Authorization: Bearer <token>` to an [`AuthUser`].
///
/// Member-role sessions are re-evaluated on every request: once the linked
/// member record is missing or inactive, all of the user's sessions are
/// deleted and the request fails with 403. The response body carries no
/// member identifier.
async fn auth_middleware(
    TypedHeader(bearer): TypedHeader<Authorization<Bearer>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let session = session::find(&state.db, bearer.token())
        .await?
        .ok_or(ServerError::Unauthorized)?;

    let user = engine::users::Entity::find_by_id(session.username)
        .one(&state.db)
        .await?
        .ok_or(ServerError::Unauthorized)?;
    let role = Role::try_from(user.role.as_str())?;

    let member_id = match role {
        Role::Admin => None,
        Role::Member => {
            let member_id = user
                .member_id
                .as_deref()
                .and_then(|id| Uuid::parse_str(id).ok());
            // Only a definitively missing or suspended member terminates the
            // session; database faults propagate as 500 and leave it alone.
            let active = match member_id {
                Some(id) => match state.engine.member(id).await {
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
            member_id
        }
    };

    request.extensions_mut().insert(AuthUser {
        username: user.username,
        role,
        member_id,
    });
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/dashboard", get(statistics::dashboard))
        .route("/members", post(members::create).get(members::list))
        .route("/members/{id}", get(members::get))
        .route("/members/{id}/active", post(members::set_active))
        .route("/members/{id}/history", get(members::history))
        .route("/members/{id}/deposits", get(members::deposits))
        .route(
            "/wasteTypes",
            post(waste_types::create).get(waste_types::list),
        )
        .route("/wasteTypes/{id}", patch(waste_types::update))
        .route("/deposits", post(deposits::create).get(deposits::list))
        .route("/cash", post(cash::create).get(cash::list))
        .route("/cash/summary", get(cash::summary))
        .route("/pointExchanges", post(ledger::exchange_points))
        .route("/adjustments", post(ledger::adjust))
        .route("/me", get(me::profile))
        .route("/me/history", get(me::history))
        .route("/me/deposits", get(me::deposits))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route("/auth/login", post(auth::login))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
