use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use parley_db::Database;
use parley_gateway::blobs::AttachmentStore;
use parley_gateway::registry::Registry;
use parley_server::app::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("PARLEY_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("PARLEY_DB_PATH").unwrap_or_else(|_| "parley.db".into());
    let blob_dir = std::env::var("PARLEY_BLOB_DIR").unwrap_or_else(|_| "uploads".into());
    let host = std::env::var("PARLEY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("PARLEY_PORT")
        .unwrap_or_else(|_| "3001".into())
        .parse()?;

    // Init database and attachment storage
    let db = Arc::new(Database::open(&PathBuf::from(&db_path))?);
    let blobs = Arc::new(AttachmentStore::new(PathBuf::from(blob_dir)).await?);

    // Shared state
    let registry = Registry::new();

    let app = build_router(db, registry, blobs, jwt_secret);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Parley server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
