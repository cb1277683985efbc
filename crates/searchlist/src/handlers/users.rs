use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::{aggregate, error::AppError, state::AppState};

/// Query parameters for the aggregate read endpoint.
#[derive(Debug, Deserialize)]
pub struct UsersParams {
    pub user_id: String,
    /// Named-list scope; the global aggregate when absent.
    pub name: Option<String>,
    /// Shared secret.
    pub key: Option<String>,
}

/// List a user's aggregated item ids (GET /users).
///
/// Authorization is checked before any store access.
pub async fn get_users(
    State(state): State<AppState>,
    Query(params): Query<UsersParams>,
) -> Result<Response, AppError> {
    if params.key.as_deref() != Some(state.config.auth_key.as_str()) {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    }

    let limit = state.config.max_posts_per_search;
    let ids = match &params.name {
        Some(name) => {
            aggregate::named(
                state.store.as_ref(),
                state.queue.as_ref(),
                &params.user_id,
                name,
                limit,
            )
            .await?
        }
        None => {
            aggregate::global(
                state.store.as_ref(),
                state.queue.as_ref(),
                &params.user_id,
                limit,
            )
            .await?
        }
    };

    Ok(Json(ids).into_response())
}
