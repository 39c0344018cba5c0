use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{CatalogEntry, CatalogMatch},
    dao::models::Platform,
};

/// Query string of the catalog search.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupQuery {
    #[serde(default)]
    pub q: String,
}

/// One catalog search hit.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LookupResultResponse {
    /// Pass back as `catalog_id` when creating the game.
    pub catalog_id: u64,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub platforms: BTreeSet<Platform>,
}

impl From<CatalogMatch> for LookupResultResponse {
    fn from(hit: CatalogMatch) -> Self {
        Self {
            catalog_id: hit.external_id,
            title: hit.title,
            release_date: hit.release_date,
            image_url: hit.image_url,
            platforms: hit.platforms,
        }
    }
}

/// Full catalog entry, shaped to pre-fill a game form.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LookupDetailResponse {
    pub catalog_id: u64,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub platforms: BTreeSet<Platform>,
    pub description: Option<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
}

impl LookupDetailResponse {
    pub fn new(catalog_id: u64, entry: CatalogEntry) -> Self {
        Self {
            catalog_id,
            title: entry.title,
            release_date: entry.release_date,
            image_url: entry.image_url,
            platforms: entry.platforms,
            description: entry.description,
            developer: entry.developer,
            publisher: entry.publisher,
        }
    }
}
