//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Datelike;
use http_body_util::BodyExt;
use spendlens_core::test_utils::{MockInsightServer, MockMode};
use spendlens_core::{HttpInsightBackend, Month, NewBudget, NewExpense, RetryPolicy};
use std::time::Duration;
use tower::ServiceExt;

const ALICE: &str = "alice@example.com";
const BOB: &str = "bob@example.com";

fn open_config() -> ServerConfig {
    ServerConfig {
        require_auth: false,
        ..Default::default()
    }
}

fn setup_app_with(db: Database, insights: Option<InsightClient>) -> Router {
    create_router_with_options(db, open_config(), AppConfig::default(), insights)
}

fn setup_test_app() -> Router {
    setup_app_with(Database::in_memory().unwrap(), Some(InsightClient::mock()))
}

fn get(uri: &str, user: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("cf-access-authenticated-user-email", user)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, user: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("cf-access-authenticated-user-email", user)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn delete_req(uri: &str, user: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("cf-access-authenticated-user-email", user)
        .body(Body::empty())
        .unwrap()
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get_body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

fn seed_expense(db: &Database, owner: &str, category: &str, amount: f64, date: chrono::NaiveDate) {
    db.insert_expense(
        owner,
        &NewExpense {
            category: category.to_string(),
            amount,
            date,
            description: None,
        },
    )
    .unwrap();
}

fn day(month: Month, d: u32) -> chrono::NaiveDate {
    month.first_day().with_day(d).unwrap()
}

// ========== Auth Tests ==========

#[tokio::test]
async fn test_auth_required_by_default() {
    let app = create_router_with_options(
        Database::in_memory().unwrap(),
        ServerConfig::default(),
        AppConfig::default(),
        None,
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/expense/all")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Authentication required");
}

#[tokio::test]
async fn test_health_skips_auth() {
    let app = create_router_with_options(
        Database::in_memory().unwrap(),
        ServerConfig::default(),
        AppConfig::default(),
        None,
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], true);
    assert_eq!(json["insights"]["configured"], false);
}

#[tokio::test]
async fn test_api_key_auth() {
    let config = ServerConfig {
        api_keys: vec!["secret-key".to_string()],
        ..Default::default()
    };
    let app = create_router_with_options(
        Database::in_memory().unwrap(),
        config,
        AppConfig::default(),
        None,
    );

    let ok = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header("authorization", "Bearer secret-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let json = get_body_json(ok).await;
    assert_eq!(json["user"], "api-key");
    assert_eq!(json["auth_method"], "api_key");

    let wrong = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header("authorization", "Bearer secret-kez")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cf_header_identity() {
    let app = create_router_with_options(
        Database::in_memory().unwrap(),
        ServerConfig::default(),
        AppConfig::default(),
        None,
    );

    let response = app.oneshot(get("/api/me", ALICE)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["user"], ALICE);
    assert_eq!(json["auth_method"], "cloudflare_header");
}

#[test]
fn test_validate_api_key() {
    let keys = vec!["abc".to_string(), "longer-key".to_string()];
    assert!(validate_api_key("abc", &keys));
    assert!(validate_api_key("longer-key", &keys));
    assert!(!validate_api_key("ab", &keys));
    assert!(!validate_api_key("abd", &keys));
    assert!(!validate_api_key("abc", &[]));
}

#[test]
fn test_parse_api_keys() {
    assert_eq!(parse_api_keys(" a , ,b,"), vec!["a", "b"]);
    assert!(parse_api_keys("").is_empty());
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();
    let response = app.oneshot(get("/api/health", ALICE)).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_health_reuses_reachability_check() {
    let server = MockInsightServer::start(MockMode::Normal).await;
    let app = setup_app_with(
        Database::in_memory().unwrap(),
        Some(InsightClient::http(&server.url())),
    );

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = get_body_json(response).await;
        assert_eq!(json["insights"]["configured"], true);
        assert_eq!(json["insights"]["reachable"], true);
    }

    assert_eq!(server.health_check_count(), 1);
}

#[tokio::test]
async fn test_reachability_cache_expires() {
    let cache = ReachabilityCache::default();

    assert!(!cache.get_or_check(Duration::ZERO, || async { false }).await);
    assert!(cache.get_or_check(Duration::ZERO, || async { true }).await);
    // Fresh result is reused while within the ttl
    assert!(
        cache
            .get_or_check(Duration::from_secs(60), || async { false })
            .await
    );
}

// ========== Expense API Tests ==========

#[tokio::test]
async fn test_add_and_list_expenses() {
    let app = setup_test_app();

    for (category, amount, date) in [
        ("Food", 120.5, "2024-03-02"),
        ("Travel", 80.0, "2024-03-10"),
    ] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/expense/add",
                ALICE,
                serde_json::json!({
                    "category": category,
                    "amount": amount,
                    "date": date,
                    "description": "lunch"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = get_body_json(response).await;
        assert_eq!(json["category"], category);
        assert_eq!(json["owner"], ALICE);
    }

    let response = app.oneshot(get("/api/expense/all", ALICE)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let expenses = json.as_array().unwrap();
    assert_eq!(expenses.len(), 2);
    // Newest first
    assert_eq!(expenses[0]["date"], "2024-03-10");
    assert_eq!(expenses[1]["date"], "2024-03-02");
}

#[tokio::test]
async fn test_add_expense_defaults_date_to_today() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/expense/add",
            ALICE,
            serde_json::json!({"category": "Food", "amount": 10}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = get_body_json(response).await;
    let today = chrono::Utc::now().date_naive().to_string();
    assert_eq!(json["date"], today);
}

#[tokio::test]
async fn test_add_expense_rejects_bad_input() {
    let app = setup_test_app();

    let negative = app
        .clone()
        .oneshot(post_json(
            "/api/expense/add",
            ALICE,
            serde_json::json!({"category": "Food", "amount": -5, "date": "2024-03-01"}),
        ))
        .await
        .unwrap();
    assert_eq!(negative.status(), StatusCode::BAD_REQUEST);

    let blank_category = app
        .clone()
        .oneshot(post_json(
            "/api/expense/add",
            ALICE,
            serde_json::json!({"category": "  ", "amount": 5, "date": "2024-03-01"}),
        ))
        .await
        .unwrap();
    assert_eq!(blank_category.status(), StatusCode::BAD_REQUEST);

    let missing_amount = app
        .oneshot(post_json(
            "/api/expense/add",
            ALICE,
            serde_json::json!({"category": "Food"}),
        ))
        .await
        .unwrap();
    assert_eq!(missing_amount.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(missing_amount).await;
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_expenses_scoped_to_owner() {
    let db = Database::in_memory().unwrap();
    let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    seed_expense(&db, ALICE, "Food", 10.0, date);
    let bob_id = db
        .insert_expense(
            BOB,
            &NewExpense {
                category: "Food".to_string(),
                amount: 20.0,
                date,
                description: None,
            },
        )
        .unwrap();
    let app = setup_app_with(db, None);

    let response = app
        .clone()
        .oneshot(get("/api/expense/all", ALICE))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    // Alice cannot delete Bob's expense
    let response = app
        .clone()
        .oneshot(delete_req(&format!("/api/expense/{}", bob_id), ALICE))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(delete_req(&format!("/api/expense/{}", bob_id), BOB))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Expense deleted");
}

// ========== Budget API Tests ==========

#[tokio::test]
async fn test_set_budget_upserts() {
    let app = setup_test_app();

    let first = app
        .clone()
        .oneshot(post_json(
            "/api/budget/set",
            ALICE,
            serde_json::json!({"category": "Food", "limit": 400, "month": "2024-03"}),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first = get_body_json(first).await;
    assert_eq!(first["month"], "2024-03");
    assert_eq!(first["limit"], 400.0);

    let second = app
        .clone()
        .oneshot(post_json(
            "/api/budget/set",
            ALICE,
            serde_json::json!({"category": "Food", "limit": 650, "month": "2024-03"}),
        ))
        .await
        .unwrap();
    let second = get_body_json(second).await;
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["limit"], 650.0);

    let response = app.oneshot(get("/api/budget/all", ALICE)).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_set_budget_rejects_bad_input() {
    let app = setup_test_app();

    let cases = [
        serde_json::json!({"category": "Food", "limit": 0, "month": "2024-03"}),
        serde_json::json!({"category": "Food", "limit": 100, "month": "2024-13"}),
        serde_json::json!({"category": "Food", "limit": 100, "month": "March"}),
        serde_json::json!({"category": "", "limit": 100, "month": "2024-03"}),
    ];
    for body in cases {
        let response = app
            .clone()
            .oneshot(post_json("/api/budget/set", ALICE, body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
    }

    let response = app
        .oneshot(post_json(
            "/api/budget/set",
            ALICE,
            serde_json::json!({"category": "Food", "limit": 100, "month": ""}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Month is required");
}

#[tokio::test]
async fn test_list_budgets_by_month() {
    let db = Database::in_memory().unwrap();
    for (category, month) in [("Food", "2024-03"), ("Travel", "2024-03"), ("Food", "2024-04")] {
        db.upsert_budget(
            ALICE,
            &NewBudget {
                category: category.to_string(),
                limit: 100.0,
                month: month.parse().unwrap(),
            },
        )
        .unwrap();
    }
    let app = setup_app_with(db, None);

    let response = app
        .clone()
        .oneshot(get("/api/budget/all?month=2024-03", ALICE))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(get("/api/budget/all", ALICE))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 3);

    let response = app
        .oneshot(get("/api/budget/all?month=2024-3", ALICE))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_budget() {
    let db = Database::in_memory().unwrap();
    let budget = db
        .upsert_budget(
            ALICE,
            &NewBudget {
                category: "Food".to_string(),
                limit: 100.0,
                month: "2024-03".parse().unwrap(),
            },
        )
        .unwrap();
    let app = setup_app_with(db, None);
    let uri = format!("/api/budget/{}", budget.id);

    let response = app.clone().oneshot(delete_req(&uri, BOB)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.clone().oneshot(delete_req(&uri, ALICE)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Budget deleted");

    let response = app.oneshot(delete_req(&uri, ALICE)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_budget_progress() {
    let db = Database::in_memory().unwrap();
    let month: Month = "2024-03".parse().unwrap();
    seed_expense(&db, ALICE, "Food", 340.0, day(month, 5));
    seed_expense(&db, ALICE, "Food", 500.0, day(month.previous(), 5));
    db.upsert_budget(
        ALICE,
        &NewBudget {
            category: "Food".to_string(),
            limit: 400.0,
            month,
        },
    )
    .unwrap();
    let app = setup_app_with(db, None);

    let response = app
        .oneshot(get("/api/budget/progress?month=2024-03", ALICE))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let progress = json.as_array().unwrap();
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0]["spent"], 340.0);
    assert_eq!(progress[0]["usage"], 85);
    assert_eq!(progress[0]["severity"], "warning");
}

// ========== Insight API Tests ==========

#[tokio::test]
async fn test_insights_without_expenses() {
    let app = setup_app_with(Database::in_memory().unwrap(), None);

    let response = app.oneshot(get("/api/ai/insights", ALICE)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["title"], "No insights yet");
    assert_eq!(json["severity"], "info");
    assert!(json.get("budgetUsage").is_none());
}

#[tokio::test]
async fn test_insights_exceeded_budget() {
    let db = Database::in_memory().unwrap();
    let month = Month::current();
    seed_expense(&db, ALICE, "Food", 300.0, day(month, 1));
    seed_expense(&db, ALICE, "Food", 200.0, day(month, 1));
    seed_expense(&db, ALICE, "Travel", 100.0, day(month, 1));
    db.upsert_budget(
        ALICE,
        &NewBudget {
            category: "Food".to_string(),
            limit: 400.0,
            month,
        },
    )
    .unwrap();
    let app = setup_app_with(db, Some(InsightClient::mock()));

    let response = app.oneshot(get("/api/ai/insights", ALICE)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["topCategory"], "Food");
    assert_eq!(json["budgetUsage"], 125);
    assert_eq!(json["severity"], "danger");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .ends_with("🚨 You have exceeded your Food budget."));
    // Pass-through fields survive
    assert!(json.get("savingTip").is_some());
    assert!(json.get("autoBudget").is_some());
}

#[tokio::test]
async fn test_insights_close_to_budget() {
    let db = Database::in_memory().unwrap();
    let month = Month::current();
    seed_expense(&db, ALICE, "Food", 500.0, day(month, 1));
    seed_expense(&db, ALICE, "Travel", 100.0, day(month, 1));
    db.upsert_budget(
        ALICE,
        &NewBudget {
            category: "Food".to_string(),
            limit: 600.0,
            month,
        },
    )
    .unwrap();
    let app = setup_app_with(db, Some(InsightClient::mock()));

    let response = app.oneshot(get("/api/ai/insights", ALICE)).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["budgetUsage"], 83);
    assert_eq!(json["severity"], "warning");
    assert!(json["message"].as_str().unwrap().contains("83%"));
}

#[tokio::test]
async fn test_insights_without_service_configured() {
    let db = Database::in_memory().unwrap();
    seed_expense(&db, ALICE, "Food", 10.0, day(Month::current(), 1));
    let app = setup_app_with(db, None);

    let response = app.oneshot(get("/api/ai/insights", ALICE)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = get_body_json(response).await;
    assert_eq!(json["message"], INSIGHT_UNAVAILABLE_MESSAGE);
}

#[tokio::test]
async fn test_insights_upstream_failure() {
    let server = MockInsightServer::start(MockMode::Failing).await;
    let policy = RetryPolicy {
        timeout: Duration::from_secs(2),
        max_retries: 1,
        backoff: Duration::from_millis(10),
    };
    let client = InsightClient::Http(HttpInsightBackend::with_policy(&server.url(), policy));

    let db = Database::in_memory().unwrap();
    seed_expense(&db, ALICE, "Food", 10.0, day(Month::current(), 1));
    let app = setup_app_with(db, Some(client));

    let response = app.oneshot(get("/api/ai/insights", ALICE)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = get_body_json(response).await;
    assert_eq!(json["message"], "AI service failed");
    assert_eq!(server.request_count(), 2);
}

#[tokio::test]
async fn test_insights_via_http_service() {
    let server = MockInsightServer::start(MockMode::NoTopCategory).await;
    let client = InsightClient::http(&server.url());

    let db = Database::in_memory().unwrap();
    let month = Month::current();
    seed_expense(&db, ALICE, "Food", 500.0, day(month, 1));
    db.upsert_budget(
        ALICE,
        &NewBudget {
            category: "Food".to_string(),
            limit: 400.0,
            month,
        },
    )
    .unwrap();
    let app = setup_app_with(db, Some(client));

    let response = app.oneshot(get("/api/ai/insights", ALICE)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    // Budget found through autoBudget.category
    assert_eq!(json["budgetUsage"], 125);
    assert_eq!(json["severity"], "danger");
}

#[tokio::test]
async fn test_insights_survive_audit_failure() {
    let db = Database::in_memory().unwrap();
    let month = Month::current();
    seed_expense(&db, ALICE, "Food", 500.0, day(month, 1));
    db.upsert_budget(
        ALICE,
        &NewBudget {
            category: "Food".to_string(),
            limit: 400.0,
            month,
        },
    )
    .unwrap();
    db.conn()
        .unwrap()
        .execute_batch("DROP TABLE audit_log;")
        .unwrap();
    let app = setup_app_with(db, Some(InsightClient::mock()));

    let response = app.oneshot(get("/api/ai/insights", ALICE)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["budgetUsage"], 125);
    assert_eq!(json["severity"], "danger");
}

// ========== Report API Tests ==========

fn report_db() -> Database {
    let db = Database::in_memory().unwrap();
    let month: Month = "2024-02".parse().unwrap();
    seed_expense(&db, ALICE, "Food", 300.0, day(month, 3));
    seed_expense(&db, ALICE, "Food", 200.0, day(month, 29));
    seed_expense(&db, ALICE, "Travel", 100.0, day(month, 14));
    seed_expense(&db, ALICE, "Food", 999.0, day(month.previous(), 31));
    db
}

#[tokio::test]
async fn test_report_summary() {
    let app = setup_app_with(report_db(), None);

    let response = app
        .oneshot(get("/api/report/summary?month=2024-02", ALICE))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["month"], "2024-02");
    assert_eq!(json["totalSpent"], 600.0);
    assert_eq!(json["topCategory"], "Food");
    assert_eq!(json["percentage"], 83);
    assert_eq!(json["suggestedSaving"], 75);
    assert_eq!(json["categoryTotals"]["Food"], 500.0);
    assert_eq!(json["lineItems"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_report_requires_month() {
    let app = setup_test_app();

    for uri in ["/api/report/summary", "/api/report/export?format=csv"] {
        let response = app.clone().oneshot(get(uri, ALICE)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = get_body_json(response).await;
        assert_eq!(json["message"], "Month is required");
    }

    let response = app
        .oneshot(get("/api/report/summary?month=2024-00", ALICE))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_export_pdf_by_default() {
    let app = setup_app_with(report_db(), None);

    let response = app
        .oneshot(get("/api/report/export?month=2024-02", ALICE))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/pdf");
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"Expense_Report_2024-02.pdf\""
    );
    let bytes = get_body_bytes(response).await;
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_export_csv() {
    let app = setup_app_with(report_db(), None);

    let response = app
        .oneshot(get("/api/report/export?month=2024-02&format=csv", ALICE))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"Expense_Report_2024-02.csv\""
    );
    let text = String::from_utf8(get_body_bytes(response).await).unwrap();
    assert!(text.contains("Food"));
    assert!(text.contains("Travel"));
    assert!(!text.contains("999"));
}

#[tokio::test]
async fn test_export_rejects_unknown_format() {
    let app = setup_app_with(report_db(), None);

    let response = app
        .oneshot(get("/api/report/export?month=2024-02&format=docx", ALICE))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_month_report() {
    let app = setup_test_app();

    let response = app
        .oneshot(get("/api/report/summary?month=2030-01", ALICE))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["totalSpent"], 0.0);
    assert!(json["topCategory"].is_null());
    assert_eq!(
        json["summaryText"],
        spendlens_core::report::BALANCED_SUMMARY
    );
}

// ========== Audit Log Tests ==========

#[tokio::test]
async fn test_api_access_is_audited() {
    let app = setup_test_app();

    app.clone()
        .oneshot(post_json(
            "/api/expense/add",
            ALICE,
            serde_json::json!({"category": "Food", "amount": 5, "date": "2024-03-01"}),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(get("/api/expense/all", ALICE))
        .await
        .unwrap();

    let response = app.oneshot(get("/api/audit?limit=10", ALICE)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let actions: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert!(actions.contains(&"create"));
    assert!(actions.contains(&"list"));
    assert!(json
        .as_array()
        .unwrap()
        .iter()
        .all(|e| e["user_email"] == ALICE));
}
