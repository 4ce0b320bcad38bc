use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use upstream::{
    ExpenseMirror, IdentityProvider, MirrorExpense, SplitwiseClient, SupabaseAuth, UpstreamError,
};

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn auth_user(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some("anon") {
        return (StatusCode::BAD_REQUEST, Json(json!({"msg": "no apikey"})));
    }
    match bearer(&headers) {
        Some("good") => (
            StatusCode::OK,
            Json(json!({"id": "uid-1", "email": "alice@example.com", "aud": "authenticated"})),
        ),
        Some("phone") => (StatusCode::OK, Json(json!({"id": "uid-2", "email": ""}))),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"msg": "invalid JWT"})),
        ),
    }
}

fn identity_stub() -> Router {
    Router::new().route("/auth/v1/user", get(auth_user))
}

#[tokio::test]
async fn identity_resolves_valid_token() {
    let base = serve(identity_stub()).await;
    let auth = SupabaseAuth::new(&base, "anon").unwrap();

    let identity = auth.resolve("good").await.unwrap();
    assert_eq!(identity.subject, "uid-1");
    assert_eq!(identity.email.as_deref(), Some("alice@example.com"));
}

#[tokio::test]
async fn identity_rejects_bad_token() {
    let base = serve(identity_stub()).await;
    let auth = SupabaseAuth::new(&base, "anon").unwrap();

    let err = auth.resolve("bad").await.unwrap_err();
    assert!(matches!(err, UpstreamError::Rejected));
}

#[tokio::test]
async fn identity_blank_email_is_none() {
    let base = serve(identity_stub()).await;
    let auth = SupabaseAuth::new(&base, "anon").unwrap();

    let identity = auth.resolve("phone").await.unwrap();
    assert_eq!(identity.email, None);
}

#[tokio::test]
async fn identity_other_failures_carry_status() {
    let base = serve(identity_stub()).await;
    let auth = SupabaseAuth::new(&base, "wrong").unwrap();

    let err = auth.resolve("good").await.unwrap_err();
    assert!(matches!(err, UpstreamError::Status { status: 400, .. }));
}

async fn create_expense(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if bearer(&headers) != Some("key") {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
    }
    if body["group_id"] != json!(42) {
        return (
            StatusCode::OK,
            Json(json!({"expenses": [], "errors": {"base": ["invalid group"]}})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"expenses": [{"id": 1, "echo": body}], "errors": {}})),
    )
}

async fn get_friends() -> Json<Value> {
    Json(json!({
        "friends": [
            {"id": 11, "first_name": "Grace", "last_name": "Hopper", "email": "grace@example.com",
             "picture": {"medium": "https://img/11"}},
            {"id": 12, "first_name": "Linus", "last_name": null}
        ]
    }))
}

fn mirror_stub() -> Router {
    Router::new()
        .route("/api/v3.0/create_expense", post(create_expense))
        .route("/api/v3.0/get_friends", get(get_friends))
}

fn expense() -> MirrorExpense {
    MirrorExpense {
        cost: "300.00".to_string(),
        description: "Dinner".to_string(),
        date: Utc.with_ymd_and_hms(2025, 3, 1, 19, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn mirror_creates_equal_split_expense() {
    let base = serve(mirror_stub()).await;
    let client = SplitwiseClient::new(&format!("{base}/api/v3.0"), "key", 42, "USD").unwrap();

    let body = client.create_expense(&expense()).await.unwrap();
    let sent = &body["expenses"][0]["echo"];
    assert_eq!(sent["cost"], "300.00");
    assert_eq!(sent["description"], "Dinner");
    assert_eq!(sent["date"], "2025-03-01T19:00:00Z");
    assert_eq!(sent["split_equally"], true);
    assert_eq!(sent["currency_code"], "USD");
}

#[tokio::test]
async fn mirror_errors_in_ok_body_fail() {
    let base = serve(mirror_stub()).await;
    let client = SplitwiseClient::new(&format!("{base}/api/v3.0"), "key", 7, "USD").unwrap();

    let err = client.create_expense(&expense()).await.unwrap_err();
    match err {
        UpstreamError::Status { status, message } => {
            assert_eq!(status, 200);
            assert!(message.contains("invalid group"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn mirror_http_failure_is_status_error() {
    let base = serve(mirror_stub()).await;
    let client = SplitwiseClient::new(&format!("{base}/api/v3.0"), "nope", 42, "USD").unwrap();

    let err = client.create_expense(&expense()).await.unwrap_err();
    assert!(matches!(err, UpstreamError::Status { status: 401, .. }));
}

#[tokio::test]
async fn mirror_lists_friends() {
    let base = serve(mirror_stub()).await;
    let client = SplitwiseClient::new(&format!("{base}/api/v3.0/"), "key", 42, "USD").unwrap();

    let friends = client.friends().await.unwrap();
    assert_eq!(friends.len(), 2);
    assert_eq!(friends[0].id, 11);
    assert_eq!(friends[0].name, "Grace Hopper");
    assert_eq!(friends[0].email.as_deref(), Some("grace@example.com"));
    assert_eq!(friends[0].avatar_url.as_deref(), Some("https://img/11"));
    assert_eq!(friends[1].name, "Linus");
    assert_eq!(friends[1].avatar_url, None);
}
