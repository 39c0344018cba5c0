pub mod transitions;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::{
    catalog::CatalogLookup,
    config::AppConfig,
    dao::game_store::{GameStore, SubscriptionStore},
    notifications::NotificationGateway,
};

pub type SharedState = Arc<AppState>;

/// External collaborators the application talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Game persistence.
    pub games: Arc<dyn GameStore>,
    /// Subscription persistence.
    pub subscriptions: Arc<dyn SubscriptionStore>,
    /// External catalog used to refresh release dates.
    pub catalog: Arc<dyn CatalogLookup>,
    /// Outbound subscriber notifications.
    pub notifier: Arc<dyn NotificationGateway>,
}

/// Central application state shared by request handlers and scheduled jobs.
pub struct AppState {
    collaborators: Collaborators,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(collaborators: Collaborators, config: AppConfig) -> SharedState {
        Arc::new(Self {
            collaborators,
            config,
        })
    }

    /// Game store handle.
    pub fn games(&self) -> &Arc<dyn GameStore> {
        &self.collaborators.games
    }

    /// Subscription store handle.
    pub fn subscriptions(&self) -> &Arc<dyn SubscriptionStore> {
        &self.collaborators.subscriptions
    }

    /// Catalog lookup handle.
    pub fn catalog(&self) -> &Arc<dyn CatalogLookup> {
        &self.collaborators.catalog
    }

    /// Notification gateway handle.
    pub fn notifier(&self) -> &Arc<dyn NotificationGateway> {
        &self.collaborators.notifier
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Current calendar date in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.config.timezone()).date_naive()
    }
}
