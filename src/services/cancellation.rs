//! Cancellation fan-out: each subscriber of a cancelled game gets a notice,
//! then their subscription is removed.

use tracing::{error, info};

use crate::{dao::models::GameEntity, error::ServiceError, state::AppState};

/// Outcome of a cancellation fan-out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CancellationSummary {
    /// Cancellation notices handed to the gateway.
    pub notified: usize,
    /// Subscriptions deleted.
    pub removed: usize,
    /// Subscriptions whose deletion failed.
    pub failed: usize,
}

/// Tell every subscriber of a cancelled `game` and drop their subscriptions.
///
/// Subscribers are processed one at a time in store order. Each subscription
/// is deleted once its notice has been attempted, whether or not the mail
/// went out. Only a failure to list the subscribers is returned; a failed
/// deletion is logged and the loop continues.
pub async fn notify_and_remove_subscribers(
    state: &AppState,
    game: &GameEntity,
) -> Result<CancellationSummary, ServiceError> {
    let subscriptions = state.subscriptions().find_all_for_game(game.id).await?;
    let mut summary = CancellationSummary::default();

    for subscription in subscriptions {
        state
            .notifier()
            .send_cancellation(subscription.email.clone(), game.clone())
            .await;
        summary.notified += 1;

        match state
            .subscriptions()
            .delete_subscription(subscription.id)
            .await
        {
            Ok(()) => summary.removed += 1,
            Err(err) => {
                summary.failed += 1;
                error!(
                    game_id = %game.id,
                    subscription_id = %subscription.id,
                    error = %err,
                    "failed to remove subscription of cancelled game"
                );
            }
        }
    }

    info!(
        game_id = %game.id,
        title = %game.title,
        notified = summary.notified,
        removed = summary.removed,
        failed = summary.failed,
        "cancellation fan-out complete"
    );
    Ok(summary)
}
