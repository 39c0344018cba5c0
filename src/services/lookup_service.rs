//! Catalog search and detail lookups used to pre-fill a new game.

use tracing::{info, warn};

use crate::{
    catalog::{CatalogEntry, CatalogMatch, bounded},
    error::ServiceError,
    state::AppState,
};

/// Search the catalog by title.
pub async fn search(state: &AppState, query: &str) -> Result<Vec<CatalogMatch>, ServiceError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ServiceError::InvalidInput(
            "search query must not be blank".into(),
        ));
    }

    let hits = bounded(
        state.config().lookup_timeout(),
        query,
        state.catalog().search(query.to_string()),
    )
    .await
    .inspect_err(|err| warn!(query, error = %err, "catalog search failed"))?;

    info!(query, hits = hits.len(), "catalog search");
    Ok(hits)
}

/// Fetch the catalog's full entry for `external_id`.
pub async fn detail(state: &AppState, external_id: u64) -> Result<CatalogEntry, ServiceError> {
    bounded(
        state.config().lookup_timeout(),
        external_id.to_string(),
        state.catalog().lookup_by_external_id(external_id),
    )
    .await
    .inspect_err(|err| warn!(external_id, error = %err, "catalog detail lookup failed"))?
    .ok_or_else(|| ServiceError::NotFound(format!("catalog game {external_id}")))
}
