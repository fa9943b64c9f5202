use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;
use uuid::Uuid;

use parley_types::api::{Claims, MessageResponse};

use crate::auth::AppState;

/// Full conversation history between the requester and `{user_id}`, both
/// directions, oldest first. Live delivery happens over the gateway; this
/// endpoint is how an offline recipient catches up.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    // Run the blocking DB query off the async runtime
    let db = state.db.clone();
    let me = claims.sub.to_string();
    let them = user_id.to_string();

    let rows = tokio::task::spawn_blocking(move || db.messages_between(&me, &them))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let messages = rows
        .into_iter()
        .map(|row| {
            Ok(MessageResponse {
                id: row.id,
                sender: row.sender.parse().map_err(anyhow::Error::from)?,
                recipient: row.recipient.parse().map_err(anyhow::Error::from)?,
                text: row.text,
                created_at: row
                    .created_at
                    .parse::<chrono::DateTime<chrono::Utc>>()
                    .map_err(anyhow::Error::from)?,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()
        .map_err(|e| {
            error!("corrupt message row: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(messages))
}
