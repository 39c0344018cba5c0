pub mod memory;

use chrono::NaiveDate;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{GameEntity, GameStatus, Platform, SubscriptionEntity};
use crate::dao::storage::StorageResult;

/// Optional criteria used when listing games.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFilter {
    /// Restrict to games owned by this user.
    pub owner_id: Option<Uuid>,
    /// Restrict to games shipping on this platform.
    pub platform: Option<Platform>,
    /// Restrict to games in this status.
    pub status: Option<GameStatus>,
    /// Inclusive lower bound on the release date.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the release date.
    pub to: Option<NaiveDate>,
}

impl GameFilter {
    /// Whether `game` satisfies every criterion that is set.
    pub fn matches(&self, game: &GameEntity) -> bool {
        self.owner_id.is_none_or(|owner| game.owner_id == owner)
            && self
                .platform
                .is_none_or(|platform| game.platforms.contains(&platform))
            && self.status.is_none_or(|status| game.status == status)
            && self.from.is_none_or(|from| game.release_date >= from)
            && self.to.is_none_or(|to| game.release_date <= to)
    }
}

/// Persistence contract for game records.
///
/// Background jobs process games in the order returned here.
pub trait GameStore: Send + Sync {
    /// Insert or replace a game, returning the stored record.
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<GameEntity>>;
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    fn game_exists(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>>;
    /// Games matching `filter`, ordered by release date then title.
    fn list_games(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Every UPCOMING game, optionally bounded by an inclusive release date.
    fn find_upcoming(
        &self,
        on_or_before: Option<NaiveDate>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    fn find_by_status_and_release_date(
        &self,
        status: GameStatus,
        release_date: NaiveDate,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Persistence contract for subscriptions.
///
/// Subscriptions reference games by id only; deleting a game does not
/// cascade here.
pub trait SubscriptionStore: Send + Sync {
    /// Insert a subscription. Fails with [`StorageError::Duplicate`] when the
    /// (game, email) pair is already present.
    ///
    /// [`StorageError::Duplicate`]: crate::dao::storage::StorageError::Duplicate
    fn save_subscription(
        &self,
        subscription: SubscriptionEntity,
    ) -> BoxFuture<'static, StorageResult<SubscriptionEntity>>;
    fn find_all_for_game(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<SubscriptionEntity>>>;
    fn find_by_token(
        &self,
        token: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<SubscriptionEntity>>>;
    fn exists_for_game_and_email(
        &self,
        game_id: Uuid,
        email: String,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    fn delete_subscription(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>>;
}
