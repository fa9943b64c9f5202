use std::sync::Arc;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    http::{HeaderMap, StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use parley_api::auth::{self, AppState, AppStateInner};
use parley_api::middleware::require_auth;
use parley_api::{messages, people};
use parley_db::Database;
use parley_gateway::blobs::AttachmentStore;
use parley_gateway::registry::Registry;
use parley_gateway::{connection, identity};

#[derive(Clone)]
pub struct ServerState {
    pub app: AppState,
    pub registry: Registry,
    pub blobs: Arc<AttachmentStore>,
}

pub fn build_router(
    db: Arc<Database>,
    registry: Registry,
    blobs: Arc<AttachmentStore>,
    jwt_secret: String,
) -> Router {
    let app_state: AppState = Arc::new(AppStateInner { db, jwt_secret });
    let state = ServerState {
        app: app_state.clone(),
        registry,
        blobs,
    };

    let public_routes = Router::new()
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .route("/api/profile", get(auth::profile))
        .with_state(app_state.clone());

    let protected_routes = Router::new()
        .route("/api/people", get(people::list_people))
        .route("/api/messages/{user_id}", get(messages::get_messages))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ))
        .with_state(app_state);

    let ws_route = Router::new().route("/ws", get(ws_upgrade)).with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(ws_route)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// The identity is bound before the upgrade completes: a missing or bad
/// token cookie is a plain 401 and the socket never reaches the registry.
async fn ws_upgrade(
    State(state): State<ServerState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let cookie_header = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok());

    let identity = match identity::bind(&state.app.jwt_secret, cookie_header) {
        Ok(identity) => identity,
        Err(e) => {
            warn!(error = %e, "websocket upgrade refused");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    let db = state.app.db.clone();
    ws.on_upgrade(move |socket| {
        connection::serve(socket, state.registry, db, state.blobs, identity)
    })
    .into_response()
}
