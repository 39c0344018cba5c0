//! Daily release sync: auto-releases past-due games and refreshes release
//! dates from the external catalog.
//!
//! Only UPCOMING games are considered. A game releasing today stays UPCOMING
//! so the same-day reminder job still picks it up.

use chrono::{NaiveDate, Utc};
use tracing::{error, info, warn};

use crate::{
    catalog::{CatalogEntry, bounded},
    dao::models::{GameEntity, GameStatus},
    error::ServiceError,
    state::{AppState, transitions::ensure_transition},
};

/// What happened to a single game during a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Past due and moved to RELEASED.
    Released,
    /// Catalog reported a new date; `notified` subscribers were told.
    Refreshed {
        /// Date-changed notices sent.
        notified: usize,
    },
    /// Nothing to do.
    Unchanged,
    /// Lookup or storage failed; the game was left as it was.
    Failed,
}

/// Counters reported by a sync run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    /// UPCOMING games examined.
    pub examined: usize,
    /// Games auto-released.
    pub released: usize,
    /// Release dates refreshed from the catalog.
    pub refreshed: usize,
    /// Date-changed notices sent.
    pub notified: usize,
    /// Games skipped because of a failure.
    pub failed: usize,
}

impl SyncSummary {
    fn record(&mut self, outcome: SyncOutcome) {
        self.examined += 1;
        match outcome {
            SyncOutcome::Released => self.released += 1,
            SyncOutcome::Refreshed { notified } => {
                self.refreshed += 1;
                self.notified += notified;
            }
            SyncOutcome::Unchanged => {}
            SyncOutcome::Failed => self.failed += 1,
        }
    }
}

/// Run one sync pass for `today`.
///
/// Games are processed sequentially in store order and independently of
/// each other; only a failure to load the candidates aborts the run.
pub async fn run(state: &AppState, today: NaiveDate) -> Result<SyncSummary, ServiceError> {
    info!(%today, "running release sync");
    let games = state.games().find_upcoming(None).await?;

    let mut summary = SyncSummary::default();
    for game in games {
        summary.record(sync_game(state, game, today).await);
    }

    info!(
        refreshed = summary.refreshed,
        released = summary.released,
        notified = summary.notified,
        failed = summary.failed,
        "release sync complete"
    );
    Ok(summary)
}

async fn sync_game(state: &AppState, game: GameEntity, today: NaiveDate) -> SyncOutcome {
    if game.is_past_due(today) {
        return auto_release(state, game).await;
    }

    match game.catalog_id {
        Some(catalog_id) => refresh_release_date(state, game, catalog_id).await,
        None => SyncOutcome::Unchanged,
    }
}

async fn auto_release(state: &AppState, game: GameEntity) -> SyncOutcome {
    if let Err(err) = ensure_transition(game.status, GameStatus::Released) {
        warn!(game_id = %game.id, error = %err, "skipping auto-release");
        return SyncOutcome::Failed;
    }

    info!(
        game_id = %game.id,
        title = %game.title,
        due = %game.release_date,
        "auto-releasing past-due game"
    );
    let released = GameEntity {
        status: GameStatus::Released,
        updated_at: Utc::now(),
        ..game
    };
    let game_id = released.id;
    match state.games().save_game(released).await {
        Ok(_) => SyncOutcome::Released,
        Err(err) => {
            error!(%game_id, error = %err, "failed to persist auto-release");
            SyncOutcome::Failed
        }
    }
}

async fn refresh_release_date(
    state: &AppState,
    game: GameEntity,
    catalog_id: u64,
) -> SyncOutcome {
    let lookup = bounded(
        state.config().lookup_timeout(),
        catalog_id.to_string(),
        state.catalog().lookup_by_external_id(catalog_id),
    )
    .await;

    let new_date = match lookup {
        Ok(Some(CatalogEntry {
            release_date: Some(date),
            ..
        })) => date,
        Ok(_) => return SyncOutcome::Unchanged,
        Err(err) => {
            error!(
                game_id = %game.id,
                title = %game.title,
                catalog_id,
                error = %err,
                "failed to sync game with catalog"
            );
            return SyncOutcome::Failed;
        }
    };

    if new_date == game.release_date {
        return SyncOutcome::Unchanged;
    }

    let old_date = game.release_date;
    info!(
        game_id = %game.id,
        title = %game.title,
        %old_date,
        %new_date,
        "release date changed"
    );
    let updated = GameEntity {
        release_date: new_date,
        tba: false,
        updated_at: Utc::now(),
        ..game
    };
    let game_id = updated.id;
    let updated = match state.games().save_game(updated).await {
        Ok(saved) => saved,
        Err(err) => {
            error!(%game_id, error = %err, "failed to persist refreshed release date");
            return SyncOutcome::Failed;
        }
    };

    let subscribers = match state.subscriptions().find_all_for_game(updated.id).await {
        Ok(subscribers) => subscribers,
        Err(err) => {
            error!(
                %game_id,
                error = %err,
                "release date refreshed but subscribers could not be loaded"
            );
            return SyncOutcome::Refreshed { notified: 0 };
        }
    };

    for subscription in &subscribers {
        state
            .notifier()
            .send_date_changed(
                subscription.email.clone(),
                updated.clone(),
                old_date,
                subscription.unsubscribe_token,
            )
            .await;
    }

    SyncOutcome::Refreshed {
        notified: subscribers.len(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Days;

    use super::*;
    use crate::test_support::{Harness, Scripted, Sent, sample_game};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test]
    async fn past_due_game_is_released_without_lookup() {
        let harness = Harness::new();
        let mut game = sample_game("Yesterday", today() - Days::new(1));
        game.catalog_id = Some(7);
        let game = harness.insert(game).await;
        harness.catalog.release_date(7, today() + Days::new(30));

        let summary = run(&harness.state, today()).await.unwrap();

        assert_eq!(harness.game(game.id).await.status, GameStatus::Released);
        assert_eq!(harness.catalog.calls(), 0);
        assert_eq!(summary.released, 1);
        assert_eq!(summary.refreshed, 0);
    }

    #[tokio::test]
    async fn game_releasing_today_stays_upcoming() {
        let harness = Harness::new();
        let game = harness.insert(sample_game("Today", today())).await;

        let summary = run(&harness.state, today()).await.unwrap();

        assert_eq!(harness.game(game.id).await.status, GameStatus::Upcoming);
        assert_eq!(summary.released, 0);
        assert_eq!(summary.examined, 1);
    }

    #[tokio::test]
    async fn tba_game_with_past_placeholder_is_not_released() {
        let harness = Harness::new();
        let mut game = sample_game("Placeholder", today() - Days::new(90));
        game.tba = true;
        let game = harness.insert(game).await;

        run(&harness.state, today()).await.unwrap();

        assert_eq!(harness.game(game.id).await.status, GameStatus::Upcoming);
    }

    #[tokio::test]
    async fn changed_catalog_date_is_applied_and_announced() {
        let harness = Harness::new();
        let old_date = today() + Days::new(10);
        let new_date = today() + Days::new(40);
        let mut game = sample_game("Delayed", old_date);
        game.catalog_id = Some(1942);
        game.tba = true;
        let game = harness.insert(game).await;
        let first = harness.subscribe(game.id, "a@example.com").await;
        let second = harness.subscribe(game.id, "b@example.com").await;
        harness.catalog.release_date(1942, new_date);

        let summary = run(&harness.state, today()).await.unwrap();

        let stored = harness.game(game.id).await;
        assert_eq!(stored.release_date, new_date);
        assert!(!stored.tba);
        assert_eq!(stored.status, GameStatus::Upcoming);
        assert_eq!(summary.refreshed, 1);
        assert_eq!(summary.notified, 2);

        let sent = harness.gateway.sent();
        assert_eq!(sent.len(), 2);
        for subscription in [first, second] {
            assert!(sent.contains(&Sent::DateChanged {
                email: subscription.email.clone(),
                game_id: game.id,
                old_date,
                new_date,
                token: subscription.unsubscribe_token,
            }));
        }
    }

    #[tokio::test]
    async fn same_catalog_date_is_a_no_op() {
        let harness = Harness::new();
        let release_date = today() + Days::new(5);
        let mut game = sample_game("On time", release_date);
        game.catalog_id = Some(3);
        let game = harness.insert(game).await;
        harness.subscribe(game.id, "a@example.com").await;
        harness.catalog.release_date(3, release_date);

        let summary = run(&harness.state, today()).await.unwrap();

        assert_eq!(harness.game(game.id).await, game);
        assert_eq!(summary.refreshed, 0);
        assert!(harness.gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn lookup_failures_leave_game_untouched_and_batch_continues() {
        let harness = Harness::new();
        let release_date = today() + Days::new(3);

        let mut broken = sample_game("Broken", release_date);
        broken.catalog_id = Some(1);
        let broken = harness.insert(broken).await;
        let mut missing = sample_game("Missing", release_date);
        missing.catalog_id = Some(2);
        let missing = harness.insert(missing).await;
        let mut slow = sample_game("Slow", release_date);
        slow.catalog_id = Some(3);
        let slow = harness.insert(slow).await;
        let mut moved = sample_game("Moved", release_date);
        moved.catalog_id = Some(4);
        let moved = harness.insert(moved).await;
        for game in [&broken, &missing, &slow] {
            harness.subscribe(game.id, "a@example.com").await;
        }

        harness.catalog.script(1, Scripted::Fail);
        harness.catalog.script(3, Scripted::Hang);
        harness.catalog.release_date(4, release_date + Days::new(1));

        let summary = run(&harness.state, today()).await.unwrap();

        assert_eq!(harness.game(broken.id).await, broken);
        assert_eq!(harness.game(missing.id).await, missing);
        assert_eq!(harness.game(slow.id).await, slow);
        assert_eq!(
            harness.game(moved.id).await.release_date,
            release_date + Days::new(1)
        );
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.refreshed, 1);
        assert!(harness.gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn catalog_entry_without_date_is_ignored() {
        let harness = Harness::new();
        let mut game = sample_game("Undated", today() + Days::new(3));
        game.catalog_id = Some(11);
        let game = harness.insert(game).await;
        harness.catalog.script(
            11,
            Scripted::Found(CatalogEntry {
                title: "Undated".into(),
                ..CatalogEntry::default()
            }),
        );

        let summary = run(&harness.state, today()).await.unwrap();

        assert_eq!(harness.game(game.id).await, game);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.refreshed, 0);
    }

    #[tokio::test]
    async fn terminal_games_are_not_touched() {
        let harness = Harness::new();
        let mut cancelled = sample_game("Cancelled", today() - Days::new(3));
        cancelled.status = GameStatus::Cancelled;
        cancelled.catalog_id = Some(5);
        let cancelled = harness.insert(cancelled).await;
        harness.catalog.release_date(5, today() + Days::new(3));

        let summary = run(&harness.state, today()).await.unwrap();

        assert_eq!(harness.game(cancelled.id).await, cancelled);
        assert_eq!(summary.examined, 0);
        assert_eq!(harness.catalog.calls(), 0);
    }
}
