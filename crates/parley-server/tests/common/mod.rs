#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use uuid::Uuid;

use parley_db::Database;
use parley_gateway::blobs::AttachmentStore;
use parley_gateway::registry::Registry;
use parley_server::app::build_router;

pub const SECRET: &str = "test-secret";

pub struct TestServer {
    pub addr: SocketAddr,
    pub db: Arc<Database>,
    pub registry: Registry,
    pub http: reqwest::Client,
    _blob_dir: tempfile::TempDir,
}

/// Boot a full server on an ephemeral port with an in-memory database.
pub async fn spawn() -> TestServer {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let registry = Registry::new();
    let blob_dir = tempfile::tempdir().unwrap();
    let blobs = Arc::new(
        AttachmentStore::new(blob_dir.path().to_path_buf())
            .await
            .unwrap(),
    );

    let router = build_router(db.clone(), registry.clone(), blobs, SECRET.to_string());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestServer {
        addr,
        db,
        registry,
        http: reqwest::Client::new(),
        _blob_dir: blob_dir,
    }
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Register a user and hand back their id plus the token from the
    /// `Set-Cookie` header.
    pub async fn register(&self, username: &str) -> (Uuid, String) {
        let resp = self
            .http
            .post(self.url("/api/register"))
            .json(&serde_json::json!({
                "username": username,
                "password": "password123",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::CREATED);

        let token = token_from_set_cookie(&resp);
        let body: serde_json::Value = resp.json().await.unwrap();
        let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();
        (id, token)
    }
}

pub fn token_from_set_cookie(resp: &reqwest::Response) -> String {
    let header = resp
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .expect("no Set-Cookie header")
        .to_str()
        .unwrap();
    header
        .split(';')
        .next()
        .and_then(|pair| pair.trim().strip_prefix("token="))
        .expect("no token cookie")
        .to_string()
}

pub fn cookie(token: &str) -> String {
    format!("token={token}")
}
