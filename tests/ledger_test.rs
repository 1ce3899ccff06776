use std::collections::HashSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use fraud_ledger::adapters::SqliteTransactionRepository;
use fraud_ledger::db;
use fraud_ledger::domain::{NewTransaction, RiskScore};
use fraud_ledger::ports::TransactionRepository;
use fraud_ledger::services::velocity::RECENT_SCAN_LIMIT;
use fraud_ledger::services::VelocityTracker;
use fraud_ledger::use_cases::{RecordError, RecordTransaction};
use fraud_ledger::{create_app, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

async fn open_file_pool(dir: &TempDir) -> SqlitePool {
    let url = format!("sqlite://{}", dir.path().join("ledger.db").display());
    let pool = db::connect(&url, 5).await.expect("Failed to open database file");
    db::run_migrations(&pool).await.expect("Failed to run migrations");
    pool
}

fn new_tx(user_id: &str, created_at: chrono::DateTime<Utc>) -> NewTransaction {
    NewTransaction {
        user_id: user_id.to_string(),
        amount: 25.0,
        country: "SG".to_string(),
        created_at,
        risk: RiskScore::from_raw(0.0),
    }
}

#[tokio::test]
async fn test_transactions_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let id = {
        let pool = open_file_pool(&dir).await;
        let repo = SqliteTransactionRepository::new(pool.clone());
        let id = repo.insert(&new_tx("alice", Utc::now())).await.unwrap();
        pool.close().await;
        id
    };

    let pool = open_file_pool(&dir).await;
    let repo = SqliteTransactionRepository::new(pool);
    let fetched = repo.get_by_id(id).await.unwrap().expect("row persisted");
    assert_eq!(fetched.user_id, "alice");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_inserts_get_unique_ids() {
    let dir = tempfile::tempdir().unwrap();
    let pool = open_file_pool(&dir).await;
    let repo: Arc<dyn TransactionRepository> = Arc::new(SqliteTransactionRepository::new(pool));

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.insert(&new_tx(&format!("user_{}", i), Utc::now()))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        assert!(ids.insert(handle.await.unwrap()));
    }
    assert_eq!(ids.len(), 20);

    let listed = repo.list_recent(200).await.unwrap();
    assert_eq!(listed.len(), 20);
    assert!(listed.windows(2).all(|w| w[0].id > w[1].id));
}

#[tokio::test]
async fn test_velocity_ignores_rows_outside_window() {
    let pool = db::connect("sqlite::memory:", 1).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    let repo: Arc<dyn TransactionRepository> = Arc::new(SqliteTransactionRepository::new(pool));

    let now = Utc::now();
    for _ in 0..3 {
        repo.insert(&new_tx("alice", now - Duration::minutes(5)))
            .await
            .unwrap();
    }
    repo.insert(&new_tx("alice", now - Duration::seconds(10)))
        .await
        .unwrap();

    let tracker = VelocityTracker::new(repo.clone());
    assert_eq!(tracker.count_recent_at("alice", 60, now).await.unwrap(), 1);
    assert_eq!(tracker.count_recent_at("alice", 600, now).await.unwrap(), 4);

    let recorded = RecordTransaction::new(repo)
        .execute(&json!({"user_id": "alice", "amount": 1, "country": "SG"}))
        .await
        .unwrap();
    assert_eq!(recorded.fraud_score, 0.0);
}

#[tokio::test]
async fn test_malformed_legacy_timestamps_do_not_break_scoring() {
    let pool = db::connect("sqlite::memory:", 1).await.unwrap();
    db::run_migrations(&pool).await.unwrap();

    for _ in 0..3 {
        sqlx::query(
            "INSERT INTO transactions (user_id, amount, country, created_at, fraud_score, flagged)
             VALUES ('legacy', 10.0, 'SG', 'not-a-date', 0.0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
    }

    let repo: Arc<dyn TransactionRepository> = Arc::new(SqliteTransactionRepository::new(pool));
    let recorded = RecordTransaction::new(repo.clone())
        .execute(&json!({"user_id": "legacy", "amount": 10, "country": "SG"}))
        .await
        .unwrap();
    assert_eq!(recorded.fraud_score, 0.0);

    let legacy = repo.get_by_id(1).await.unwrap().expect("legacy row readable");
    assert_eq!(legacy.created_at, "not-a-date");
    assert!(legacy.created_at_utc().is_none());
}

// Velocity only scans the newest RECENT_SCAN_LIMIT rows of the whole ledger,
// so a busy ledger can hide a user's earlier in-window activity.
#[tokio::test]
async fn test_velocity_scan_is_bounded_to_recent_rows() {
    let pool = db::connect("sqlite::memory:", 1).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    let repo: Arc<dyn TransactionRepository> = Arc::new(SqliteTransactionRepository::new(pool));

    let now = Utc::now();
    for _ in 0..3 {
        repo.insert(&new_tx("alice", now)).await.unwrap();
    }
    let tracker = VelocityTracker::new(repo.clone());
    assert_eq!(tracker.count_recent_at("alice", 60, now).await.unwrap(), 3);

    for i in 0..RECENT_SCAN_LIMIT {
        repo.insert(&new_tx(&format!("other_{}", i), now)).await.unwrap();
    }
    assert_eq!(tracker.count_recent_at("alice", 60, now).await.unwrap(), 0);
}

#[tokio::test]
async fn test_failed_insert_surfaces_storage_error_and_writes_nothing() {
    let pool = db::connect("sqlite::memory:", 1).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    sqlx::query(
        "CREATE TRIGGER reject_inserts BEFORE INSERT ON transactions
         BEGIN SELECT RAISE(ABORT, 'disk gone'); END",
    )
    .execute(&pool)
    .await
    .unwrap();

    let repo: Arc<dyn TransactionRepository> =
        Arc::new(SqliteTransactionRepository::new(pool.clone()));
    let err = RecordTransaction::new(repo.clone())
        .execute(&json!({"user_id": "alice", "amount": 10, "country": "SG"}))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordError::Repository(_)));
    assert!(repo.list_recent(50).await.unwrap().is_empty());

    let app = create_app(AppState::new(pool));
    let request = Request::builder()
        .method("POST")
        .uri("/transactions")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"user_id": "alice", "amount": 10, "country": "SG"}).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], 500);
    assert!(body["error"].as_str().unwrap().contains("disk gone"));
    assert!(body.get("id").is_none());
    assert!(repo.list_recent(50).await.unwrap().is_empty());
}
