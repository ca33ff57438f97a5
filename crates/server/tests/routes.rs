use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

use migration::MigratorTrait;
use server::ServerState;

async fn setup() -> (Router, DatabaseConnection) {
    // A second pooled connection would open a distinct in-memory database.
    let mut options = sea_orm::ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password, role, member_id) VALUES (?, ?, ?, NULL)",
        vec!["admin".into(), "secret".into(), "admin".into()],
    ))
    .await
    .unwrap();

    let engine = engine::Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    let state = ServerState {
        engine: Arc::new(engine),
        db: db.clone(),
    };
    (server::router(state), db)
}

async fn request(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    // Extractor rejections (e.g. a missing Authorization header) come back
    // as plain text, not JSON.
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn login(router: &Router, username: &str, password: &str) -> String {
    let (status, body) = request(
        router,
        "POST",
        "/auth/login",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

/// Registers a member via the API and creates the linked login.
async fn register_member_login(
    router: &Router,
    db: &DatabaseConnection,
    admin_token: &str,
    name: &str,
    username: &str,
) -> String {
    let (status, member) = request(
        router,
        "POST",
        "/members",
        Some(admin_token),
        Some(json!({"name": name, "phone": null})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let member_id = member["id"].as_str().unwrap().to_string();

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password, role, member_id) VALUES (?, ?, ?, ?)",
        vec![
            username.into(),
            "secret".into(),
            "member".into(),
            member_id.clone().into(),
        ],
    ))
    .await
    .unwrap();

    member_id
}

async fn count_sessions(db: &DatabaseConnection, username: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT COUNT(*) AS n FROM sessions WHERE username = ?",
            vec![username.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let (router, _db) = setup().await;

    let (status, _) = request(
        &router,
        "POST",
        "/auth/login",
        None,
        Some(json!({"username": "admin", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(
        &router,
        "POST",
        "/auth/login",
        None,
        Some(json!({"username": "ghost", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rotates_previous_session() {
    let (router, db) = setup().await;

    let first = login(&router, "admin", "secret").await;
    let (status, _) = request(&router, "GET", "/dashboard", Some(&first), None).await;
    assert_eq!(status, StatusCode::OK);

    let second = login(&router, "admin", "secret").await;
    assert_eq!(count_sessions(&db, "admin").await, 1);

    let (status, _) = request(&router, "GET", "/dashboard", Some(&first), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = request(&router, "GET", "/dashboard", Some(&second), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn logout_invalidates_token() {
    let (router, _db) = setup().await;
    let token = login(&router, "admin", "secret").await;

    let (status, _) = request(&router, "POST", "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(&router, "GET", "/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_or_unknown_token_is_401() {
    let (router, _db) = setup().await;

    let (status, _) = request(&router, "GET", "/dashboard", None, None).await;
    assert!(status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED);

    let (status, _) = request(&router, "GET", "/dashboard", Some("nope"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn inactive_member_login_kills_sessions_without_identifier() {
    let (router, db) = setup().await;
    let admin = login(&router, "admin", "secret").await;
    let member_id = register_member_login(&router, &db, &admin, "Siti", "siti").await;

    // Active member can log in.
    let member_token = login(&router, "siti", "secret").await;
    let (status, _) = request(&router, "GET", "/me", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &router,
        "POST",
        &format!("/members/{member_id}/active"),
        Some(&admin),
        Some(json!({"active": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The login is refused, every session row is gone, and the body names no
    // member.
    let (status, body) = request(
        &router,
        "POST",
        "/auth/login",
        None,
        Some(json!({"username": "siti", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "account inactive");
    assert!(!body.to_string().contains(&member_id));
    assert_eq!(count_sessions(&db, "siti").await, 0);

    // The previously issued token is dead too.
    let (status, _) = request(&router, "GET", "/me", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn database_fault_surfaces_500_and_keeps_session() {
    let (router, db) = setup().await;
    let admin = login(&router, "admin", "secret").await;
    register_member_login(&router, &db, &admin, "Siti", "siti").await;
    let member_token = login(&router, "siti", "secret").await;

    let backend = db.get_database_backend();
    db.execute(Statement::from_string(
        backend,
        "ALTER TABLE members RENAME TO members_offline".to_string(),
    ))
    .await
    .unwrap();

    // The fault is not "member inactive": 500, and the session survives.
    let (status, _) = request(&router, "GET", "/me", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(count_sessions(&db, "siti").await, 1);

    db.execute(Statement::from_string(
        backend,
        "ALTER TABLE members_offline RENAME TO members".to_string(),
    ))
    .await
    .unwrap();

    let (status, _) = request(&router, "GET", "/me", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn role_gate_blocks_both_directions() {
    let (router, db) = setup().await;
    let admin = login(&router, "admin", "secret").await;
    register_member_login(&router, &db, &admin, "Siti", "siti").await;
    let member = login(&router, "siti", "secret").await;

    let (status, _) = request(&router, "GET", "/dashboard", Some(&member), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = request(
        &router,
        "POST",
        "/members",
        Some(&member),
        Some(json!({"name": "X", "phone": null})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(&router, "GET", "/me", Some(&admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The catalog is readable by members.
    let (status, _) = request(&router, "GET", "/wasteTypes", Some(&member), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn deposit_withdrawal_flow_over_http() {
    let (router, db) = setup().await;
    let admin = login(&router, "admin", "secret").await;
    let member_id = register_member_login(&router, &db, &admin, "Siti", "siti").await;

    let (status, waste_type) = request(
        &router,
        "POST",
        "/wasteTypes",
        Some(&admin),
        Some(json!({"name": "Plastic PET", "price_per_kg_minor": 2000, "points_per_kg": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let waste_type_id = waste_type["id"].as_str().unwrap();

    let (status, deposit) = request(
        &router,
        "POST",
        "/deposits",
        Some(&admin),
        Some(json!({
            "member_id": member_id,
            "waste_type_id": waste_type_id,
            "weight_grams": 2500,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(deposit["total_minor"], 5000);
    assert_eq!(deposit["points_earned"], 5);

    // The member sees the credited balance.
    let member_token = login(&router, "siti", "secret").await;
    let (status, profile) = request(&router, "GET", "/me", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["balance_minor"], 5000);
    assert_eq!(profile["points"], 5);

    let (status, history) = request(&router, "GET", "/me/history", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["entries"].as_array().unwrap().len(), 1);
    assert_eq!(history["entries"][0]["category"], "deposit");

    // Withdrawal over HTTP, then check the summary.
    let (status, withdrawal) = request(
        &router,
        "POST",
        "/cash",
        Some(&admin),
        Some(json!({
            "direction": "out",
            "category": "member_withdrawal",
            "amount_minor": 2000,
            "member_id": member_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(withdrawal["number"].as_str().unwrap().starts_with("KAS/"));

    let (status, _) = request(
        &router,
        "POST",
        "/cash",
        Some(&admin),
        Some(json!({
            "direction": "out",
            "category": "member_withdrawal",
            "amount_minor": 99_000,
            "member_id": member_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, summary) = request(&router, "GET", "/cash/summary", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["member_withdrawals_minor"], 2000);
    assert_eq!(summary["net_minor"], -2000);

    let (status, dashboard) = request(&router, "GET", "/dashboard", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["total_balance_minor"], 3000);
    assert_eq!(dashboard["member_count"], 1);
}

#[tokio::test]
async fn unknown_ids_map_to_404() {
    let (router, _db) = setup().await;
    let admin = login(&router, "admin", "secret").await;

    let missing = uuid::Uuid::new_v4();
    let (status, _) = request(
        &router,
        "GET",
        &format!("/members/{missing}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &router,
        "POST",
        "/deposits",
        Some(&admin),
        Some(json!({
            "member_id": missing,
            "waste_type_id": missing,
            "weight_grams": 1000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_waste_type_maps_to_409() {
    let (router, _db) = setup().await;
    let admin = login(&router, "admin", "secret").await;

    let body = json!({"name": "Plastic PET", "price_per_kg_minor": 2000, "points_per_kg": 2});
    let (status, _) = request(&router, "POST", "/wasteTypes", Some(&admin), Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = request(&router, "POST", "/wasteTypes", Some(&admin), Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}
