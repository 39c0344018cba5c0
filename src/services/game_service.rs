use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{
        game_store::GameFilter,
        models::{GameEntity, GameStatus},
    },
    dto::game::GameRequest,
    error::ServiceError,
    services::cancellation,
    state::{AppState, transitions::ensure_transition},
};

/// Register a new UPCOMING game owned by `owner_id`.
pub async fn create_game(
    state: &AppState,
    owner_id: Uuid,
    request: GameRequest,
) -> Result<GameEntity, ServiceError> {
    request.validate()?;

    let now = Utc::now();
    let mut game = GameEntity {
        id: Uuid::new_v4(),
        owner_id,
        title: String::new(),
        description: None,
        release_date: request.release_date,
        platforms: Default::default(),
        status: GameStatus::Upcoming,
        shop_url: None,
        image_url: None,
        developer: None,
        publisher: None,
        catalog_id: None,
        tba: false,
        created_at: now,
        updated_at: now,
    };
    apply_request(&mut game, request);

    let game = state.games().save_game(game).await?;
    info!(game_id = %game.id, title = %game.title, "game created");
    Ok(game)
}

/// Fetch one game owned by `owner_id`.
pub async fn get_game(
    state: &AppState,
    id: Uuid,
    owner_id: Uuid,
) -> Result<GameEntity, ServiceError> {
    let Some(game) = state.games().find_game(id).await? else {
        return Err(not_found(id));
    };
    if game.owner_id != owner_id {
        return Err(not_found(id));
    }
    Ok(game)
}

/// List games matching `filter`, ordered by release date then title.
pub async fn list_games(
    state: &AppState,
    filter: GameFilter,
) -> Result<Vec<GameEntity>, ServiceError> {
    Ok(state.games().list_games(filter).await?)
}

/// Replace the editable fields of a game. Status is left alone.
pub async fn update_game(
    state: &AppState,
    id: Uuid,
    owner_id: Uuid,
    request: GameRequest,
) -> Result<GameEntity, ServiceError> {
    request.validate()?;
    let mut game = get_game(state, id, owner_id).await?;

    apply_request(&mut game, request);
    game.updated_at = Utc::now();

    Ok(state.games().save_game(game).await?)
}

/// Move a game to `status`, fanning out cancellation notices when it is
/// cancelled.
pub async fn update_status(
    state: &AppState,
    id: Uuid,
    owner_id: Uuid,
    status: GameStatus,
) -> Result<GameEntity, ServiceError> {
    let mut game = get_game(state, id, owner_id).await?;
    ensure_transition(game.status, status)?;

    let previous = game.status;
    game.status = status;
    game.updated_at = Utc::now();
    let game = state.games().save_game(game).await?;
    info!(game_id = %game.id, from = %previous, to = %status, "game status changed");

    // The new status is already saved, so fan-out failures are only logged.
    if status == GameStatus::Cancelled {
        if let Err(err) = cancellation::notify_and_remove_subscribers(state, &game).await {
            error!(
                game_id = %game.id,
                error = %err,
                "game cancelled but subscribers could not be notified"
            );
        }
    }

    Ok(game)
}

/// Delete a game. Its subscriptions are left in place.
pub async fn delete_game(state: &AppState, id: Uuid, owner_id: Uuid) -> Result<(), ServiceError> {
    let game = get_game(state, id, owner_id).await?;
    state.games().delete_game(game.id).await?;
    info!(game_id = %game.id, "game deleted");
    Ok(())
}

fn apply_request(game: &mut GameEntity, request: GameRequest) {
    let GameRequest {
        title,
        description,
        release_date,
        platforms,
        shop_url,
        image_url,
        developer,
        publisher,
        catalog_id,
        tba,
    } = request;

    game.title = title.trim().to_string();
    game.description = non_empty(description);
    game.release_date = release_date;
    game.platforms = platforms.into_iter().collect();
    game.shop_url = non_empty(shop_url);
    game.image_url = non_empty(image_url);
    game.developer = non_empty(developer);
    game.publisher = non_empty(publisher);
    game.catalog_id = catalog_id;
    game.tba = tba;
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("game `{id}` not found"))
}
