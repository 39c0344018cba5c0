//! Process-local storage backend built on concurrent maps.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    game_store::{GameFilter, GameStore, SubscriptionStore},
    models::{GameEntity, GameStatus, SubscriptionEntity},
    storage::{StorageError, StorageResult},
};

/// In-memory implementation of both [`GameStore`] and [`SubscriptionStore`].
///
/// Clones share the same maps. Record-level writes are atomic; the
/// (game, email) uniqueness check is not serialized against concurrent
/// inserts of the same pair.
#[derive(Clone, Default)]
pub struct MemoryStore {
    games: Arc<DashMap<Uuid, GameEntity>>,
    subscriptions: Arc<DashMap<Uuid, SubscriptionEntity>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_games(&self, predicate: impl Fn(&GameEntity) -> bool) -> Vec<GameEntity> {
        let mut games = self
            .games
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();
        games.sort_by(|a, b| a.release_date.cmp(&b.release_date).then(a.id.cmp(&b.id)));
        games
    }
}

impl GameStore for MemoryStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let store = self.clone();
        Box::pin(async move {
            store.games.insert(game.id, game.clone());
            Ok(game)
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.games.get(&id).map(|entry| entry.value().clone())) })
    }

    fn game_exists(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.games.contains_key(&id)) })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.games.remove(&id);
            Ok(())
        })
    }

    fn list_games(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut games = store.collect_games(|game| filter.matches(game));
            games.sort_by(|a, b| {
                a.release_date
                    .cmp(&b.release_date)
                    .then_with(|| a.title.cmp(&b.title))
            });
            Ok(games)
        })
    }

    fn find_upcoming(
        &self,
        on_or_before: Option<NaiveDate>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store.collect_games(|game| {
                game.status == GameStatus::Upcoming
                    && on_or_before.is_none_or(|bound| game.release_date <= bound)
            }))
        })
    }

    fn find_by_status_and_release_date(
        &self,
        status: GameStatus,
        release_date: NaiveDate,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store.collect_games(|game| {
                game.status == status && game.release_date == release_date
            }))
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

impl SubscriptionStore for MemoryStore {
    fn save_subscription(
        &self,
        subscription: SubscriptionEntity,
    ) -> BoxFuture<'static, StorageResult<SubscriptionEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let duplicate = store.subscriptions.iter().any(|entry| {
                let existing = entry.value();
                existing.id != subscription.id
                    && existing.game_id == subscription.game_id
                    && existing.email == subscription.email
            });
            if duplicate {
                return Err(StorageError::Duplicate {
                    entity: "subscription",
                    key: format!("{}/{}", subscription.game_id, subscription.email),
                });
            }

            store
                .subscriptions
                .insert(subscription.id, subscription.clone());
            Ok(subscription)
        })
    }

    fn find_all_for_game(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<SubscriptionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut subscriptions = store
                .subscriptions
                .iter()
                .filter(|entry| entry.value().game_id == game_id)
                .map(|entry| entry.value().clone())
                .collect::<Vec<_>>();
            subscriptions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            Ok(subscriptions)
        })
    }

    fn find_by_token(
        &self,
        token: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<SubscriptionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .subscriptions
                .iter()
                .find(|entry| entry.value().unsubscribe_token == token)
                .map(|entry| entry.value().clone()))
        })
    }

    fn exists_for_game_and_email(
        &self,
        game_id: Uuid,
        email: String,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store.subscriptions.iter().any(|entry| {
                let existing = entry.value();
                existing.game_id == game_id && existing.email == email
            }))
        })
    }

    fn delete_subscription(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.subscriptions.remove(&id);
            Ok(())
        })
    }
}
