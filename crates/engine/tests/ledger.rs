use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AdjustmentCmd, CashCategory, CashDirection, CashTransactionCmd, DepositCmd, Engine,
    EngineError, LedgerCategory, Member,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    // A second pooled connection would open a distinct in-memory database.
    let mut options = sea_orm::ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password, role, member_id) VALUES (?, ?, ?, NULL)",
        vec!["admin".into(), "password".into(), "admin".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    (engine, db)
}

/// Member with 5000 balance and 5 points from one deposit.
async fn funded_member(engine: &Engine) -> Member {
    let member = engine
        .register_member("Siti", None, Utc::now())
        .await
        .unwrap();
    let waste_type = engine
        .create_waste_type("Plastic PET", 2000, 2)
        .await
        .unwrap();
    engine
        .record_deposit(DepositCmd::new(
            member.id,
            waste_type.id,
            2500,
            "admin",
            Utc::now(),
        ))
        .await
        .unwrap();
    engine.member(member.id).await.unwrap()
}

async fn count_rows(db: &DatabaseConnection, table: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}

#[tokio::test]
async fn history_entries_carry_before_after_snapshots() {
    let (engine, _db) = engine_with_db().await;
    let member = funded_member(&engine).await;

    engine
        .record_cash_transaction(
            CashTransactionCmd::new(
                CashDirection::Out,
                CashCategory::MemberWithdrawal,
                2000,
                "admin",
                Utc::now(),
            )
            .member_id(member.id),
        )
        .await
        .unwrap();

    let history = engine.list_balance_history(member.id, 10).await.unwrap();
    assert_eq!(history.len(), 2);

    // Newest first: the withdrawal.
    let withdrawal = &history[0];
    assert_eq!(withdrawal.category, LedgerCategory::Withdrawal);
    assert_eq!(withdrawal.amount_delta_minor, -2000);
    assert_eq!(withdrawal.balance_before_minor, 5000);
    assert_eq!(withdrawal.balance_after_minor, 3000);
    assert_eq!(withdrawal.points_before, 5);
    assert_eq!(withdrawal.points_after, 5);
    assert!(withdrawal.cash_transaction_id.is_some());
    assert!(withdrawal.number.starts_with("TRX/"));

    let deposit = &history[1];
    assert_eq!(deposit.category, LedgerCategory::Deposit);
    assert_eq!(deposit.balance_before_minor, 0);
    assert_eq!(deposit.balance_after_minor, 5000);
    assert!(deposit.deposit_id.is_some());
}

#[tokio::test]
async fn withdrawal_over_balance_leaves_no_rows() {
    let (engine, db) = engine_with_db().await;
    let member = funded_member(&engine).await;
    let history_before = count_rows(&db, "balance_history").await;
    let cash_before = count_rows(&db, "cash_transactions").await;

    let err = engine
        .record_cash_transaction(
            CashTransactionCmd::new(
                CashDirection::Out,
                CashCategory::MemberWithdrawal,
                6000,
                "admin",
                Utc::now(),
            )
            .member_id(member.id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientBalance(_)));

    // The whole transaction rolled back, cash row included.
    assert_eq!(count_rows(&db, "balance_history").await, history_before);
    assert_eq!(count_rows(&db, "cash_transactions").await, cash_before);
    let member = engine.member(member.id).await.unwrap();
    assert_eq!(member.balance_minor, 5000);
}

#[tokio::test]
async fn competing_withdrawals_cannot_overdraw() {
    let (engine, _db) = engine_with_db().await;
    let member = funded_member(&engine).await;

    let cmd = |amount| {
        CashTransactionCmd::new(
            CashDirection::Out,
            CashCategory::MemberWithdrawal,
            amount,
            "admin",
            Utc::now(),
        )
        .member_id(member.id)
    };

    engine.record_cash_transaction(cmd(3000)).await.unwrap();
    let err = engine.record_cash_transaction(cmd(3000)).await.unwrap_err();
    assert!(matches!(err, EngineError::InsufficientBalance(_)));

    let member = engine.member(member.id).await.unwrap();
    assert_eq!(member.balance_minor, 2000);
}

#[tokio::test]
async fn cash_direction_must_match_category() {
    let (engine, _db) = engine_with_db().await;
    let member = funded_member(&engine).await;

    let err = engine
        .record_cash_transaction(
            CashTransactionCmd::new(
                CashDirection::In,
                CashCategory::MemberWithdrawal,
                1000,
                "admin",
                Utc::now(),
            )
            .member_id(member.id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCategoryDirection(_)));

    // Non-withdrawal categories must not reference a member.
    let err = engine
        .record_cash_transaction(
            CashTransactionCmd::new(
                CashDirection::In,
                CashCategory::CollectorSale,
                1000,
                "admin",
                Utc::now(),
            )
            .member_id(member.id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn collector_sale_touches_no_member_ledger() {
    let (engine, db) = engine_with_db().await;
    let member = funded_member(&engine).await;
    let history_before = count_rows(&db, "balance_history").await;

    let tx = engine
        .record_cash_transaction(CashTransactionCmd::new(
            CashDirection::In,
            CashCategory::CollectorSale,
            150_000,
            "admin",
            Utc::now(),
        ))
        .await
        .unwrap();
    assert!(tx.number.starts_with("KAS/"));
    assert!(tx.member_id.is_none());

    assert_eq!(count_rows(&db, "balance_history").await, history_before);
    let member = engine.member(member.id).await.unwrap();
    assert_eq!(member.balance_minor, 5000);
}

#[tokio::test]
async fn point_exchange_spends_points_and_credits_balance() {
    let (engine, _db) = engine_with_db().await;
    let member = funded_member(&engine).await;

    let entry = engine
        .exchange_points(member.id, 3, 1500, "admin", Utc::now())
        .await
        .unwrap();
    assert_eq!(entry.category, LedgerCategory::PointExchange);
    assert_eq!(entry.point_delta, -3);
    assert_eq!(entry.amount_delta_minor, 1500);
    assert_eq!(entry.points_before, 5);
    assert_eq!(entry.points_after, 2);

    let member = engine.member(member.id).await.unwrap();
    assert_eq!(member.balance_minor, 6500);
    assert_eq!(member.points, 2);

    // Points buying goods: zero credit is valid.
    engine
        .exchange_points(member.id, 2, 0, "admin", Utc::now())
        .await
        .unwrap();
    let member = engine.member(member.id).await.unwrap();
    assert_eq!(member.points, 0);

    let err = engine
        .exchange_points(member.id, 1, 0, "admin", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientBalance(_)));
}

#[tokio::test]
async fn adjustment_allowed_on_inactive_member() {
    let (engine, _db) = engine_with_db().await;
    let member = funded_member(&engine).await;
    engine.set_member_active(member.id, false).await.unwrap();

    let entry = engine
        .record_adjustment(
            AdjustmentCmd::new(member.id, "admin", Utc::now()).amount_delta_minor(-500),
        )
        .await
        .unwrap();
    assert_eq!(entry.category, LedgerCategory::Adjustment);
    assert_eq!(entry.balance_after_minor, 4500);

    let err = engine
        .record_adjustment(AdjustmentCmd::new(member.id, "admin", Utc::now()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    // Still bounded below by zero.
    let err = engine
        .record_adjustment(
            AdjustmentCmd::new(member.id, "admin", Utc::now()).amount_delta_minor(-9999),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientBalance(_)));
}

#[tokio::test]
async fn document_numbers_increment_per_day() {
    let (engine, _db) = engine_with_db().await;
    let member = funded_member(&engine).await;

    let first = engine
        .record_adjustment(AdjustmentCmd::new(member.id, "admin", Utc::now()).point_delta(1))
        .await
        .unwrap();
    let second = engine
        .record_adjustment(AdjustmentCmd::new(member.id, "admin", Utc::now()).point_delta(1))
        .await
        .unwrap();

    let prefix = format!("TRX/{}/", Utc::now().format("%Y%m%d"));
    let first_seq: u64 = first.number.strip_prefix(&prefix).unwrap().parse().unwrap();
    let second_seq: u64 = second.number.strip_prefix(&prefix).unwrap().parse().unwrap();
    assert_eq!(second_seq, first_seq + 1);
}

#[tokio::test]
async fn document_numbers_grow_past_four_digits() {
    let (engine, db) = engine_with_db().await;
    let member = funded_member(&engine).await;

    let prefix = format!("TRX/{}/", Utc::now().format("%Y%m%d"));
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE balance_history SET number = ?",
        vec![format!("{prefix}9999").into()],
    ))
    .await
    .unwrap();

    let entry = engine
        .record_adjustment(AdjustmentCmd::new(member.id, "admin", Utc::now()).point_delta(1))
        .await
        .unwrap();
    assert_eq!(entry.number, format!("{prefix}10000"));
}

#[tokio::test]
async fn simultaneous_withdrawals_cannot_overdraw() {
    let (engine, db) = engine_with_db().await;
    let member = funded_member(&engine).await;
    let engine = std::sync::Arc::new(engine);

    let withdraw = |engine: std::sync::Arc<Engine>| {
        tokio::spawn(async move {
            engine
                .record_cash_transaction(
                    CashTransactionCmd::new(
                        CashDirection::Out,
                        CashCategory::MemberWithdrawal,
                        3000,
                        "admin",
                        Utc::now(),
                    )
                    .member_id(member.id),
                )
                .await
        })
    };

    let first = withdraw(engine.clone());
    let second = withdraw(engine.clone());
    let outcomes = [first.await.unwrap(), second.await.unwrap()];

    let succeeded = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1);
    assert!(outcomes.iter().any(|r| matches!(
        r,
        Err(EngineError::InsufficientBalance(_))
    )));

    let member = engine.member(member.id).await.unwrap();
    assert_eq!(member.balance_minor, 2000);
    // 1 deposit entry + 1 withdrawal entry, 1 cash row.
    assert_eq!(count_rows(&db, "balance_history").await, 2);
    assert_eq!(count_rows(&db, "cash_transactions").await, 1);
}

#[tokio::test]
async fn verify_member_ledger_detects_corrupted_cache() {
    let (engine, db) = engine_with_db().await;
    let member = funded_member(&engine).await;
    engine
        .exchange_points(member.id, 2, 100, "admin", Utc::now())
        .await
        .unwrap();

    let check = engine.verify_member_ledger(member.id).await.unwrap();
    assert!(check.consistent());
    assert_eq!(check.ledger_balance_minor, 5100);
    assert_eq!(check.ledger_points, 3);

    // Corrupt the cached projection directly.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE members SET balance_minor = ? WHERE id = ?",
        vec![999i64.into(), member.id.to_string().into()],
    ))
    .await
    .unwrap();

    let check = engine.verify_member_ledger(member.id).await.unwrap();
    assert!(!check.consistent());
    assert_eq!(check.cached_balance_minor, 999);
    assert_eq!(check.ledger_balance_minor, 5100);
}

#[tokio::test]
async fn ledger_operations_require_existing_member() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .record_adjustment(
            AdjustmentCmd::new(Uuid::new_v4(), "admin", Utc::now()).point_delta(1),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn cash_summary_and_dashboard_aggregate_totals() {
    let (engine, _db) = engine_with_db().await;
    let member = funded_member(&engine).await;

    engine
        .record_cash_transaction(CashTransactionCmd::new(
            CashDirection::In,
            CashCategory::CollectorSale,
            150_000,
            "admin",
            Utc::now(),
        ))
        .await
        .unwrap();
    engine
        .record_cash_transaction(CashTransactionCmd::new(
            CashDirection::Out,
            CashCategory::OperationalExpense,
            20_000,
            "admin",
            Utc::now(),
        ))
        .await
        .unwrap();
    engine
        .record_cash_transaction(
            CashTransactionCmd::new(
                CashDirection::Out,
                CashCategory::MemberWithdrawal,
                2000,
                "admin",
                Utc::now(),
            )
            .member_id(member.id),
        )
        .await
        .unwrap();

    let summary = engine.cash_summary().await.unwrap();
    assert_eq!(summary.total_in_minor, 150_000);
    assert_eq!(summary.total_out_minor, 22_000);
    assert_eq!(summary.collector_sales_minor, 150_000);
    assert_eq!(summary.operational_expenses_minor, 20_000);
    assert_eq!(summary.member_withdrawals_minor, 2000);
    assert_eq!(summary.net_minor(), 128_000);

    let stats = engine.dashboard().await.unwrap();
    assert_eq!(stats.member_count, 1);
    assert_eq!(stats.active_member_count, 1);
    assert_eq!(stats.total_balance_minor, 3000);
    assert_eq!(stats.total_weight_grams, 2500);
    assert_eq!(stats.deposit_count, 1);
    assert_eq!(stats.cash, summary);
}
