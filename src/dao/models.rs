use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a tracked game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameStatus {
    /// Announced but not yet out.
    Upcoming,
    /// Released; terminal.
    Released,
    /// Cancelled by the publisher; terminal.
    Cancelled,
}

impl GameStatus {
    /// Terminal statuses accept no further transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Released | GameStatus::Cancelled)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GameStatus::Upcoming => "UPCOMING",
            GameStatus::Released => "RELEASED",
            GameStatus::Cancelled => "CANCELLED",
        };
        f.write_str(label)
    }
}

/// Platform tag attached to a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Platform {
    /// Windows, macOS and Linux.
    Pc,
    /// PlayStation 5.
    Ps5,
    /// Xbox Series X|S.
    Xbox,
    /// Nintendo Switch.
    Switch,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Platform::Pc => "PC",
            Platform::Ps5 => "PS5",
            Platform::Xbox => "XBOX",
            Platform::Switch => "SWITCH",
        };
        f.write_str(label)
    }
}

/// Game record persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// User who created the entry.
    pub owner_id: Uuid,
    /// Display title.
    pub title: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Calendar release date. Only advisory while `tba` is set.
    pub release_date: NaiveDate,
    /// Platforms the game ships on.
    pub platforms: BTreeSet<Platform>,
    /// Current lifecycle status.
    pub status: GameStatus,
    /// Store page.
    pub shop_url: Option<String>,
    /// Cover art.
    pub image_url: Option<String>,
    /// Developer studio.
    pub developer: Option<String>,
    /// Publisher.
    pub publisher: Option<String>,
    /// Identifier in the external catalog, present for games imported from it.
    pub catalog_id: Option<u64>,
    /// Release date is a placeholder ("to be announced").
    pub tba: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last time the record was updated.
    pub updated_at: DateTime<Utc>,
}

impl GameEntity {
    /// Whether the auto-release rule applies on `today`.
    ///
    /// A placeholder date never counts, and a game releasing on `today` is
    /// not past due yet.
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        !self.tba && self.release_date < today
    }

    /// Comma separated platform labels, used by mail templates.
    pub fn platform_labels(&self) -> String {
        self.platforms
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Release-date subscription of one email address to one game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscriptionEntity {
    /// Primary key of the subscription.
    pub id: Uuid,
    /// Game being followed.
    pub game_id: Uuid,
    /// Subscriber address.
    pub email: String,
    /// Secret token embedded in unsubscribe links.
    pub unsubscribe_token: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(release_date: NaiveDate, tba: bool) -> GameEntity {
        let now = Utc::now();
        GameEntity {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Hollow Knight: Silksong".into(),
            description: None,
            release_date,
            platforms: BTreeSet::from([Platform::Switch, Platform::Pc]),
            status: GameStatus::Upcoming,
            shop_url: None,
            image_url: None,
            developer: None,
            publisher: None,
            catalog_id: None,
            tba,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn past_due_is_strictly_before_today() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(game(today.pred_opt().unwrap(), false).is_past_due(today));
        assert!(!game(today, false).is_past_due(today));
        assert!(!game(today.succ_opt().unwrap(), false).is_past_due(today));
    }

    #[test]
    fn tba_games_are_never_past_due() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(!game(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), true).is_past_due(today));
    }

    #[test]
    fn platform_labels_are_sorted() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(game(today, false).platform_labels(), "PC, SWITCH");
    }

    #[test]
    fn status_serializes_upper_case() {
        assert_eq!(
            serde_json::to_string(&GameStatus::Cancelled).unwrap(),
            "\"CANCELLED\""
        );
        assert_eq!(
            serde_json::from_str::<Platform>("\"PS5\"").unwrap(),
            Platform::Ps5
        );
        assert!(GameStatus::Released.is_terminal());
        assert!(!GameStatus::Upcoming.is_terminal());
    }
}
