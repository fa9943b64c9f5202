mod common;

use common::{cookie, spawn, token_from_set_cookie};
use reqwest::StatusCode;

#[tokio::test]
async fn register_login_profile_flow() {
    let server = spawn().await;
    let (id, _token) = server.register("alice").await;

    // Wrong password
    let resp = server
        .http
        .post(server.url("/api/login"))
        .json(&serde_json::json!({"username": "alice", "password": "wrong-password"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Unknown user
    let resp = server
        .http
        .post(server.url("/api/login"))
        .json(&serde_json::json!({"username": "nobody", "password": "password123"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Correct credentials set a fresh cookie
    let resp = server
        .http
        .post(server.url("/api/login"))
        .json(&serde_json::json!({"username": "alice", "password": "password123"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let token = token_from_set_cookie(&resp);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["id"].as_str().unwrap(), id.to_string());

    // The cookie identifies us
    let resp = server
        .http
        .get(server.url("/api/profile"))
        .header(reqwest::header::COOKIE, cookie(&token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let profile: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(profile["username"].as_str().unwrap(), "alice");
    assert_eq!(profile["userId"].as_str().unwrap(), id.to_string());
}

#[tokio::test]
async fn register_validates_input() {
    let server = spawn().await;

    let resp = server
        .http
        .post(server.url("/api/register"))
        .json(&serde_json::json!({"username": "ab", "password": "password123"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = server
        .http
        .post(server.url("/api/register"))
        .json(&serde_json::json!({"username": "alice", "password": "short"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    server.register("alice").await;
    let resp = server
        .http
        .post(server.url("/api/register"))
        .json(&serde_json::json!({"username": "alice", "password": "password123"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn profile_without_cookie_is_unauthorized() {
    let server = spawn().await;

    let resp = server
        .http
        .get(server.url("/api/profile"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = server
        .http
        .get(server.url("/api/profile"))
        .header(reqwest::header::COOKIE, cookie("garbage"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn people_lists_every_registered_user() {
    let server = spawn().await;
    let (_alice_id, alice_token) = server.register("alice").await;
    server.register("bob").await;

    // Protected: no cookie, no list
    let resp = server
        .http
        .get(server.url("/api/people"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = server
        .http
        .get(server.url("/api/people"))
        .header(reqwest::header::COOKIE, cookie(&alice_token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let people: Vec<serde_json::Value> = resp.json().await.unwrap();
    let mut names: Vec<&str> = people
        .iter()
        .map(|p| p["username"].as_str().unwrap())
        .collect();
    names.sort_unstable();
    assert_eq!(names, ["alice", "bob"]);
}

#[tokio::test]
async fn message_history_requires_auth() {
    let server = spawn().await;
    let (bob_id, _) = server.register("bob").await;

    let resp = server
        .http
        .get(server.url(&format!("/api/messages/{bob_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let server = spawn().await;
    server.register("alice").await;

    let resp = server
        .http
        .post(server.url("/api/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let header = resp
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(header.starts_with("token="));
    assert!(header.to_ascii_lowercase().contains("max-age=0") || header.contains("Expires"));
}
