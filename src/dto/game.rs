use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{
        game_store::GameFilter,
        models::{GameEntity, GameStatus, Platform},
    },
    dto::validation::{validate_http_url, validate_not_blank},
};

/// Payload used to create or fully update a game.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GameRequest {
    #[validate(custom(function = "validate_not_blank", message = "title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub release_date: NaiveDate,
    #[validate(length(min = 1, message = "at least one platform is required"))]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    #[validate(custom(function = "validate_http_url"))]
    pub shop_url: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_http_url"))]
    pub image_url: Option<String>,
    #[serde(default)]
    pub developer: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    /// Catalog identifier when the game was imported from the external catalog.
    #[serde(default)]
    pub catalog_id: Option<u64>,
    #[serde(default)]
    pub tba: bool,
}

/// Requested lifecycle status change.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StatusRequest {
    pub status: GameStatus,
}

/// Query string accepted by the game listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameListQuery {
    pub platform: Option<Platform>,
    pub status: Option<GameStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl GameListQuery {
    /// Scope the query to the games owned by `owner_id`.
    pub fn into_filter(self, owner_id: Uuid) -> GameFilter {
        GameFilter {
            owner_id: Some(owner_id),
            platform: self.platform,
            status: self.status,
            from: self.from,
            to: self.to,
        }
    }
}

/// Game as returned by the API.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GameResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub release_date: NaiveDate,
    pub platforms: BTreeSet<Platform>,
    pub status: GameStatus,
    pub shop_url: Option<String>,
    pub image_url: Option<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub catalog_id: Option<u64>,
    pub tba: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GameEntity> for GameResponse {
    fn from(entity: GameEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            release_date: entity.release_date,
            platforms: entity.platforms,
            status: entity.status,
            shop_url: entity.shop_url,
            image_url: entity.image_url,
            developer: entity.developer,
            publisher: entity.publisher,
            catalog_id: entity.catalog_id,
            tba: entity.tba,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> GameRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn minimal_request_is_valid() {
        let request = request(
            r#"{ "title": "Silksong", "release_date": "2026-12-01", "platforms": ["PC"] }"#,
        );
        assert!(request.validate().is_ok());
        assert!(!request.tba);
        assert_eq!(request.catalog_id, None);
    }

    #[test]
    fn rejects_blank_title_and_missing_platforms() {
        let request =
            request(r#"{ "title": "  ", "release_date": "2026-12-01", "platforms": [] }"#);
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("platforms"));
    }

    #[test]
    fn rejects_non_http_shop_url() {
        let request = request(
            r#"{ "title": "Silksong", "release_date": "2026-12-01", "platforms": ["SWITCH"],
                 "shop_url": "ftp://example.com", "image_url": "" }"#,
        );
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("shop_url"));
        assert!(!errors.field_errors().contains_key("image_url"));
    }
}
