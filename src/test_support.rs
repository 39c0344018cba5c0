//! Test doubles shared by the unit tests.

use std::{
    collections::{BTreeSet, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::{
    catalog::{CatalogEntry, CatalogLookup, CatalogMatch, LookupError, LookupResult},
    config::AppConfig,
    dao::{
        game_store::{GameStore, SubscriptionStore, memory::MemoryStore},
        models::{GameEntity, GameStatus, Platform, SubscriptionEntity},
        storage::{StorageError, StorageResult},
    },
    notifications::{MailError, MailMessage, MailTransport, NotificationGateway},
    state::{AppState, Collaborators, SharedState},
};

pub(crate) fn sample_game(title: &str, release_date: NaiveDate) -> GameEntity {
    let now = Utc::now();
    GameEntity {
        id: Uuid::new_v4(),
        owner_id: Uuid::nil(),
        title: title.into(),
        description: None,
        release_date,
        platforms: BTreeSet::from([Platform::Pc, Platform::Ps5]),
        status: GameStatus::Upcoming,
        shop_url: None,
        image_url: None,
        developer: None,
        publisher: None,
        catalog_id: None,
        tba: false,
        created_at: now,
        updated_at: now,
    }
}

/// Mail transport that records every attempt and fails for chosen recipients.
#[derive(Clone, Default)]
pub(crate) struct RecordingTransport {
    attempts: Arc<AtomicUsize>,
    delivered: Arc<Mutex<Vec<MailMessage>>>,
    failing: Arc<HashSet<String>>,
}

impl RecordingTransport {
    pub fn failing_for<'a>(recipients: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            failing: Arc::new(recipients.into_iter().map(str::to_string).collect()),
            ..Self::default()
        }
    }

    pub fn attempted(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn delivered(&self) -> Vec<MailMessage> {
        self.delivered.lock().unwrap().clone()
    }
}

impl MailTransport for RecordingTransport {
    fn deliver(&self, message: MailMessage) -> BoxFuture<'static, Result<(), MailError>> {
        let transport = self.clone();
        Box::pin(async move {
            transport.attempts.fetch_add(1, Ordering::SeqCst);
            if transport.failing.contains(&message.to) {
                return Err(MailError {
                    recipient: message.to,
                    message: "mailbox unavailable".into(),
                    source: None,
                });
            }
            transport.delivered.lock().unwrap().push(message);
            Ok(())
        })
    }
}

/// Notification as seen by [`RecordingGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Sent {
    ReleaseToday {
        email: String,
        game_id: Uuid,
        token: Uuid,
    },
    ReleaseSoon {
        email: String,
        game_id: Uuid,
        token: Uuid,
    },
    DateChanged {
        email: String,
        game_id: Uuid,
        old_date: NaiveDate,
        new_date: NaiveDate,
        token: Uuid,
    },
    Cancellation {
        email: String,
        game_id: Uuid,
    },
}

#[derive(Clone, Default)]
pub(crate) struct RecordingGateway {
    sent: Arc<Mutex<Vec<Sent>>>,
}

impl RecordingGateway {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, sent: Sent) -> BoxFuture<'static, ()> {
        self.sent.lock().unwrap().push(sent);
        Box::pin(async {})
    }
}

impl NotificationGateway for RecordingGateway {
    fn send_release_today(
        &self,
        email: String,
        game: GameEntity,
        unsubscribe_token: Uuid,
    ) -> BoxFuture<'static, ()> {
        self.record(Sent::ReleaseToday {
            email,
            game_id: game.id,
            token: unsubscribe_token,
        })
    }

    fn send_release_soon(
        &self,
        email: String,
        game: GameEntity,
        unsubscribe_token: Uuid,
    ) -> BoxFuture<'static, ()> {
        self.record(Sent::ReleaseSoon {
            email,
            game_id: game.id,
            token: unsubscribe_token,
        })
    }

    fn send_date_changed(
        &self,
        email: String,
        game: GameEntity,
        old_date: NaiveDate,
        unsubscribe_token: Uuid,
    ) -> BoxFuture<'static, ()> {
        self.record(Sent::DateChanged {
            email,
            game_id: game.id,
            old_date,
            new_date: game.release_date,
            token: unsubscribe_token,
        })
    }

    fn send_cancellation(&self, email: String, game: GameEntity) -> BoxFuture<'static, ()> {
        self.record(Sent::Cancellation {
            email,
            game_id: game.id,
        })
    }
}

/// Canned catalog answer.
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Found(CatalogEntry),
    Fail,
    Hang,
}

/// Catalog returning scripted answers; unknown ids are "not found".
#[derive(Clone, Default)]
pub(crate) struct ScriptedCatalog {
    responses: Arc<DashMap<u64, Scripted>>,
    hits: Arc<Mutex<Vec<CatalogMatch>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedCatalog {
    pub fn script(&self, external_id: u64, response: Scripted) {
        self.responses.insert(external_id, response);
    }

    pub fn release_date(&self, external_id: u64, release_date: NaiveDate) {
        self.script(
            external_id,
            Scripted::Found(CatalogEntry {
                title: format!("catalog #{external_id}"),
                release_date: Some(release_date),
                ..CatalogEntry::default()
            }),
        );
    }

    /// Make `hit` findable by any part of its title.
    pub fn add_hit(&self, hit: CatalogMatch) {
        self.hits.lock().unwrap().push(hit);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CatalogLookup for ScriptedCatalog {
    fn lookup_by_external_id(
        &self,
        external_id: u64,
    ) -> BoxFuture<'static, LookupResult<Option<CatalogEntry>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self
            .responses
            .get(&external_id)
            .map(|entry| entry.value().clone());
        Box::pin(async move {
            match response {
                None => Ok(None),
                Some(Scripted::Found(entry)) => Ok(Some(entry)),
                Some(Scripted::Fail) => Err(LookupError::failed(
                    "connection reset".into(),
                    std::io::Error::from(std::io::ErrorKind::ConnectionReset),
                )),
                Some(Scripted::Hang) => futures::future::pending().await,
            }
        })
    }

    fn search(&self, query: String) -> BoxFuture<'static, LookupResult<Vec<CatalogMatch>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let needle = query.to_lowercase();
        let hits = self
            .hits
            .lock()
            .unwrap()
            .iter()
            .filter(|hit| hit.title.to_lowercase().contains(&needle))
            .cloned()
            .collect::<Vec<_>>();
        Box::pin(async move { Ok(hits) })
    }
}

/// Subscription store whose backend is down.
pub(crate) struct OfflineSubscriptions;

impl OfflineSubscriptions {
    fn fail<T: Send + 'static>() -> BoxFuture<'static, StorageResult<T>> {
        Box::pin(async {
            Err(StorageError::unavailable(
                "subscription backend offline".into(),
                std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
            ))
        })
    }
}

impl SubscriptionStore for OfflineSubscriptions {
    fn save_subscription(
        &self,
        _subscription: SubscriptionEntity,
    ) -> BoxFuture<'static, StorageResult<SubscriptionEntity>> {
        Self::fail()
    }

    fn find_all_for_game(
        &self,
        _game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<SubscriptionEntity>>> {
        Self::fail()
    }

    fn find_by_token(
        &self,
        _token: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<SubscriptionEntity>>> {
        Self::fail()
    }

    fn exists_for_game_and_email(
        &self,
        _game_id: Uuid,
        _email: String,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        Self::fail()
    }

    fn delete_subscription(&self, _id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        Self::fail()
    }
}

/// Application state wired to in-memory collaborators.
pub(crate) struct Harness {
    pub state: SharedState,
    pub store: MemoryStore,
    pub gateway: RecordingGateway,
    pub catalog: ScriptedCatalog,
}

impl Harness {
    pub fn new() -> Self {
        let gateway = RecordingGateway::default();
        Self::build(Arc::new(gateway.clone()), gateway, None)
    }

    /// Use `notifier` for deliveries; the recording gateway stays empty.
    pub fn with_notifier(notifier: Arc<dyn NotificationGateway>) -> Self {
        Self::build(notifier, RecordingGateway::default(), None)
    }

    /// Serve subscriptions from `subscriptions` instead of the memory store.
    pub fn with_subscriptions(subscriptions: Arc<dyn SubscriptionStore>) -> Self {
        let gateway = RecordingGateway::default();
        Self::build(Arc::new(gateway.clone()), gateway, Some(subscriptions))
    }

    fn build(
        notifier: Arc<dyn NotificationGateway>,
        gateway: RecordingGateway,
        subscriptions: Option<Arc<dyn SubscriptionStore>>,
    ) -> Self {
        let store = MemoryStore::new();
        let catalog = ScriptedCatalog::default();
        let config = AppConfig::default().with_lookup_timeout(Duration::from_millis(50));
        let subscriptions = subscriptions.unwrap_or_else(|| Arc::new(store.clone()));
        let state = AppState::new(
            Collaborators {
                games: Arc::new(store.clone()),
                subscriptions,
                catalog: Arc::new(catalog.clone()),
                notifier,
            },
            config,
        );
        Self {
            state,
            store,
            gateway,
            catalog,
        }
    }

    pub async fn insert(&self, game: GameEntity) -> GameEntity {
        self.store.save_game(game).await.unwrap()
    }

    pub async fn subscribe(&self, game_id: Uuid, email: &str) -> SubscriptionEntity {
        self.store
            .save_subscription(SubscriptionEntity {
                id: Uuid::new_v4(),
                game_id,
                email: email.into(),
                unsubscribe_token: Uuid::new_v4(),
                created_at: Utc::now(),
            })
            .await
            .unwrap()
    }

    pub async fn game(&self, id: Uuid) -> GameEntity {
        self.store.find_game(id).await.unwrap().unwrap()
    }
}
