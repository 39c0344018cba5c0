use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::{
    catalog::{CatalogEntry, CatalogMatch},
    dao::models::Platform,
};

/// Upper bound on search hits returned to the caller.
const SEARCH_LIMIT: usize = 10;

/// Apicalypse query fetching a single game with the fields we map.
pub(super) fn detail_query(igdb_id: u64) -> String {
    format!(
        "fields name,first_release_date,cover.url,platforms.id,\
         involved_companies.company.name,involved_companies.developer,\
         involved_companies.publisher,summary; where id = {igdb_id}; limit 1;"
    )
}

/// Apicalypse title search. Cancelled, rumored, delisted and offline
/// entries (IGDB status 5 to 8) are filtered out.
pub(super) fn search_query(query: &str) -> String {
    let escaped = query.trim().replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        "search \"{escaped}\"; fields name,first_release_date,cover.url,platforms.id,status; \
         where status = null | status != (5,6,7,8); limit {SEARCH_LIMIT};"
    )
}

/// Token payload returned by the Twitch client-credentials flow.
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct IgdbGame {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub first_release_date: Option<i64>,
    pub cover: Option<IgdbCover>,
    #[serde(default)]
    pub platforms: Vec<IgdbPlatform>,
    #[serde(default)]
    pub involved_companies: Vec<IgdbInvolvedCompany>,
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct IgdbCover {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct IgdbPlatform {
    pub id: u32,
}

#[derive(Debug, Deserialize)]
pub(super) struct IgdbInvolvedCompany {
    pub company: Option<IgdbCompany>,
    #[serde(default)]
    pub developer: bool,
    #[serde(default)]
    pub publisher: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct IgdbCompany {
    pub name: Option<String>,
}

impl IgdbGame {
    pub fn into_match(self) -> CatalogMatch {
        CatalogMatch {
            external_id: self.id,
            release_date: self.release_date(),
            image_url: self.cover_url(),
            platforms: self.tracked_platforms(),
            title: self.name,
        }
    }

    pub fn into_entry(self) -> CatalogEntry {
        let release_date = self.release_date();
        let image_url = self.cover_url();
        let platforms = self.tracked_platforms();
        let developer = first_company(&self.involved_companies, |c| c.developer);
        let publisher = first_company(&self.involved_companies, |c| c.publisher);

        CatalogEntry {
            title: self.name,
            release_date,
            platforms,
            image_url,
            description: self.summary,
            developer,
            publisher,
        }
    }
}

impl IgdbGame {
    fn release_date(&self) -> Option<NaiveDate> {
        self.first_release_date.and_then(epoch_seconds_to_date)
    }

    /// IGDB serves protocol-relative thumbnails; ask for the large cover.
    fn cover_url(&self) -> Option<String> {
        self.cover
            .as_ref()
            .and_then(|cover| cover.url.as_deref())
            .map(|url| format!("https:{}", url.replace("t_thumb", "t_cover_big")))
    }

    fn tracked_platforms(&self) -> BTreeSet<Platform> {
        self.platforms
            .iter()
            .filter_map(|platform| map_platform(platform.id))
            .collect()
    }
}

fn epoch_seconds_to_date(seconds: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(seconds, 0).map(|instant| instant.date_naive())
}

fn first_company(
    companies: &[IgdbInvolvedCompany],
    role: impl Fn(&IgdbInvolvedCompany) -> bool,
) -> Option<String> {
    companies
        .iter()
        .filter(|company| role(company))
        .find_map(|company| company.company.as_ref().and_then(|c| c.name.clone()))
}

/// IGDB platform ids we track. Unknown ids are dropped.
fn map_platform(igdb_platform_id: u32) -> Option<Platform> {
    match igdb_platform_id {
        3 | 6 | 14 => Some(Platform::Pc),
        167 => Some(Platform::Ps5),
        169 => Some(Platform::Xbox),
        130 => Some(Platform::Switch),
        _ => None,
    }
}
