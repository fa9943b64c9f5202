use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::error;

use parley_types::api::{Claims, PersonResponse};

use crate::auth::AppState;

/// Every registered user. The client subtracts the live roster from this
/// list to show who is offline.
pub async fn list_people(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.db.clone();
    let rows = tokio::task::spawn_blocking(move || db.list_users())
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let people = rows
        .into_iter()
        .filter_map(|row| {
            Some(PersonResponse {
                id: row.id.parse().ok()?,
                username: row.username,
            })
        })
        .collect::<Vec<_>>();

    Ok(Json(people))
}
