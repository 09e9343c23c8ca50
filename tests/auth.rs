//! Integration tests for auth: login stub, logout teardown, bearer token checks.

use celeb_exchange::api::auth;
use celeb_exchange::api::routes::{AppState, app_router};
use celeb_exchange::catalog::InstrumentCatalog;
use celeb_exchange::ledger::SellPolicy;
use celeb_exchange::session::SessionStore;
use std::sync::Arc;
use uuid::Uuid;

const SECRET: &[u8] = b"test-jwt-secret";

fn test_app_state() -> AppState {
    AppState {
        catalog: Arc::new(InstrumentCatalog::seeded()),
        sessions: SessionStore::new(SellPolicy::Permissive),
        jwt_secret: SECRET.to_vec(),
        session_ttl_hours: 1,
    }
}

/// Spawn app on a random port and return (base_url, guard that keeps server running).
async fn spawn_app(state: AppState) -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);
    let app = app_router(state);
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (base_url, handle)
}

async fn login(client: &reqwest::Client, base_url: &str, email: &str) -> String {
    let res = client
        .post(format!("{}/auth/login", base_url))
        .json(&serde_json::json!({ "email": email }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let json: serde_json::Value = res.json().await.unwrap();
    json.get("token").unwrap().as_str().unwrap().to_string()
}

#[tokio::test]
async fn login_returns_token_and_normalized_email() {
    let state = test_app_state();
    let sessions = state.sessions.clone();
    let (base_url, _handle) = spawn_app(state).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/login", base_url))
        .json(&serde_json::json!({ "email": "  Alice@Example.com ", "name": "Alice" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let json: serde_json::Value = res.json().await.unwrap();
    assert!(json.get("token").and_then(|v| v.as_str()).is_some());
    assert_eq!(json.get("email").and_then(|v| v.as_str()), Some("alice@example.com"));
    let session_id: Uuid = json.get("session_id").unwrap().as_str().unwrap().parse().unwrap();
    assert!(sessions.contains(session_id).await);
}

#[tokio::test]
async fn login_empty_email_returns_400() {
    let (base_url, _handle) = spawn_app(test_app_state()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/login", base_url))
        .json(&serde_json::json!({ "email": "   " }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
    let json: serde_json::Value = res.json().await.unwrap();
    assert!(json.get("error").unwrap().as_str().unwrap().contains("required"));
}

#[tokio::test]
async fn me_returns_logged_in_user() {
    let (base_url, _handle) = spawn_app(test_app_state()).await;
    let client = reqwest::Client::new();
    let token = login(&client, &base_url, "carol@example.com").await;

    let res = client
        .get(format!("{}/auth/me", base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let json: serde_json::Value = res.json().await.unwrap();
    assert_eq!(json.get("email").and_then(|v| v.as_str()), Some("carol@example.com"));
}

#[tokio::test]
async fn missing_or_bad_token_returns_401() {
    let (base_url, _handle) = spawn_app(test_app_state()).await;
    let client = reqwest::Client::new();

    let no_token = client.get(format!("{}/portfolio", base_url)).send().await.unwrap();
    assert_eq!(no_token.status().as_u16(), 401);
    let json: serde_json::Value = no_token.json().await.unwrap();
    assert!(json.get("error").unwrap().as_str().unwrap().contains("login required"));

    let garbage = client
        .get(format!("{}/portfolio", base_url))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(garbage.status().as_u16(), 401);

    let wrong_secret = auth::create_token(b"other-secret", Uuid::new_v4(), 1).unwrap();
    let res = client
        .get(format!("{}/portfolio", base_url))
        .bearer_auth(&wrong_secret)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 401);
}

#[tokio::test]
async fn valid_token_for_unknown_session_returns_401() {
    let (base_url, _handle) = spawn_app(test_app_state()).await;
    let client = reqwest::Client::new();
    let token = auth::create_token(SECRET, Uuid::new_v4(), 1).unwrap();

    let res = client
        .get(format!("{}/auth/me", base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 401);
}

#[tokio::test]
async fn logout_destroys_session_and_ledger() {
    let state = test_app_state();
    let sessions = state.sessions.clone();
    let (base_url, _handle) = spawn_app(state).await;
    let client = reqwest::Client::new();
    let token = login(&client, &base_url, "dave@example.com").await;

    let buy = client
        .post(format!("{}/trade", base_url))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "side": "buy", "instrument_id": 1, "notional": 100.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(buy.status().as_u16(), 200);

    let res = client
        .post(format!("{}/auth/logout", base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 204);
    assert!(sessions.is_empty().await);

    let after = client
        .get(format!("{}/portfolio", base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(after.status().as_u16(), 401);

    // A fresh login starts from an empty ledger.
    let token = login(&client, &base_url, "dave@example.com").await;
    let portfolio: serde_json::Value = client
        .get(format!("{}/portfolio", base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(portfolio.get("holding_count").and_then(|v| v.as_u64()), Some(0));
}

#[test]
fn token_round_trip_carries_session_id() {
    let session_id = Uuid::new_v4();
    let token = auth::create_token(SECRET, session_id, 2).unwrap();

    let claims = auth::decode_token(SECRET, &token).unwrap();

    assert_eq!(claims.sub, session_id.to_string());
    assert_eq!(claims.exp - claims.iat, 2 * 3600);
    assert!(auth::decode_token(b"wrong", &token).is_err());
}
