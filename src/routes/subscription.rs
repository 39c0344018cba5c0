use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::subscription::{SubscribeRequest, SubscriptionResponse},
    error::AppError,
    services::subscription_service,
    state::SharedState,
};

/// Public subscription routes; no caller identity required.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/v1/games/{id}/subscribe", post(subscribe))
        .route("/api/v1/unsubscribe/{token}", get(unsubscribe))
}

/// Follow a game's release by email.
pub async fn subscribe(
    State(state): State<SharedState>,
    Path(game_id): Path<Uuid>,
    Json(payload): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), AppError> {
    let subscription = subscription_service::subscribe(&state, game_id, payload).await?;
    Ok((StatusCode::CREATED, Json(subscription.into())))
}

/// Unsubscribe link target embedded in every mail.
pub async fn unsubscribe(
    State(state): State<SharedState>,
    Path(token): Path<Uuid>,
) -> Result<&'static str, AppError> {
    subscription_service::unsubscribe(&state, token).await?;
    Ok("You have been unsubscribed.")
}
