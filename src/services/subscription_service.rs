use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::SubscriptionEntity, dto::subscription::SubscribeRequest, error::ServiceError,
    state::AppState,
};

/// Follow `game_id` by email.
///
/// The duplicate check runs before anything is written, so a rejected
/// request leaves the store untouched.
pub async fn subscribe(
    state: &AppState,
    game_id: Uuid,
    request: SubscribeRequest,
) -> Result<SubscriptionEntity, ServiceError> {
    let request = SubscribeRequest {
        email: request.normalized_email(),
    };
    request.validate()?;
    let email = request.email;

    if !state.games().game_exists(game_id).await? {
        return Err(ServiceError::NotFound(format!("game `{game_id}` not found")));
    }

    if state
        .subscriptions()
        .exists_for_game_and_email(game_id, email.clone())
        .await?
    {
        return Err(ServiceError::Conflict(format!(
            "`{email}` is already subscribed to game `{game_id}`"
        )));
    }

    let subscription = state
        .subscriptions()
        .save_subscription(SubscriptionEntity {
            id: Uuid::new_v4(),
            game_id,
            email,
            unsubscribe_token: Uuid::new_v4(),
            created_at: Utc::now(),
        })
        .await?;

    info!(%game_id, subscription_id = %subscription.id, "subscription created");
    Ok(subscription)
}

/// Remove the subscription identified by its unsubscribe token.
pub async fn unsubscribe(state: &AppState, token: Uuid) -> Result<(), ServiceError> {
    let Some(subscription) = state.subscriptions().find_by_token(token).await? else {
        return Err(ServiceError::NotFound("unknown unsubscribe token".into()));
    };

    state
        .subscriptions()
        .delete_subscription(subscription.id)
        .await?;
    info!(
        game_id = %subscription.game_id,
        subscription_id = %subscription.id,
        "subscription removed"
    );
    Ok(())
}
