use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::game::{GameListQuery, GameRequest, GameResponse, StatusRequest},
    error::AppError,
    routes::owner::OwnerId,
    services::game_service,
    state::SharedState,
};

/// Routes managing the caller's tracked games.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/v1/games", get(list_games).post(create_game))
        .route(
            "/api/v1/games/{id}",
            get(get_game).put(update_game).delete(delete_game),
        )
        .route("/api/v1/games/{id}/status", patch(update_status))
}

/// Track a new game.
pub async fn create_game(
    State(state): State<SharedState>,
    OwnerId(owner_id): OwnerId,
    Json(payload): Json<GameRequest>,
) -> Result<(StatusCode, Json<GameResponse>), AppError> {
    let game = game_service::create_game(&state, owner_id, payload).await?;
    Ok((StatusCode::CREATED, Json(game.into())))
}

/// List the caller's games, optionally filtered.
pub async fn list_games(
    State(state): State<SharedState>,
    OwnerId(owner_id): OwnerId,
    Query(query): Query<GameListQuery>,
) -> Result<Json<Vec<GameResponse>>, AppError> {
    let games = game_service::list_games(&state, query.into_filter(owner_id)).await?;
    Ok(Json(games.into_iter().map(GameResponse::from).collect()))
}

/// Fetch one game.
pub async fn get_game(
    State(state): State<SharedState>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<Uuid>,
) -> Result<Json<GameResponse>, AppError> {
    let game = game_service::get_game(&state, id, owner_id).await?;
    Ok(Json(game.into()))
}

/// Replace the editable fields of a game.
pub async fn update_game(
    State(state): State<SharedState>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<Uuid>,
    Json(payload): Json<GameRequest>,
) -> Result<Json<GameResponse>, AppError> {
    let game = game_service::update_game(&state, id, owner_id, payload).await?;
    Ok(Json(game.into()))
}

/// Move a game through its lifecycle.
pub async fn update_status(
    State(state): State<SharedState>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<GameResponse>, AppError> {
    let game = game_service::update_status(&state, id, owner_id, payload.status).await?;
    Ok(Json(game.into()))
}

/// Stop tracking a game.
pub async fn delete_game(
    State(state): State<SharedState>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    game_service::delete_game(&state, id, owner_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
