//! External game catalog lookups used to keep release dates fresh.

#[cfg(feature = "igdb-lookup")]
pub mod igdb;

use std::{collections::BTreeSet, error::Error, time::Duration};

use chrono::NaiveDate;
use futures::future::BoxFuture;
use thiserror::Error;

use crate::dao::models::Platform;

/// Result alias for catalog lookups.
pub type LookupResult<T> = Result<T, LookupError>;

/// Metadata the catalog currently holds for a game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Title as listed by the catalog.
    pub title: String,
    /// First release date, if the catalog knows one.
    pub release_date: Option<NaiveDate>,
    /// Platforms we track that the catalog lists.
    pub platforms: BTreeSet<Platform>,
    /// Cover art URL.
    pub image_url: Option<String>,
    /// Summary text.
    pub description: Option<String>,
    /// First developer credited.
    pub developer: Option<String>,
    /// First publisher credited.
    pub publisher: Option<String>,
}

/// One hit of a catalog title search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogMatch {
    /// Catalog identifier, stored as the game's `catalog_id` on import.
    pub external_id: u64,
    /// Title as listed by the catalog.
    pub title: String,
    /// First release date, if known.
    pub release_date: Option<NaiveDate>,
    /// Cover art URL.
    pub image_url: Option<String>,
    /// Platforms we track that the catalog lists.
    pub platforms: BTreeSet<Platform>,
}

/// Transport or protocol failure while talking to the catalog.
///
/// "Not found" is not an error: lookups return `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The call did not complete within its time budget.
    #[error("catalog lookup for `{target}` timed out after {timeout:?}")]
    Timeout {
        /// Catalog identifier or search text being looked up.
        target: String,
        /// Budget that was exceeded.
        timeout: Duration,
    },
    /// Any other transport, status or decoding failure.
    #[error("catalog lookup failed: {message}")]
    Failed {
        /// Human readable context.
        message: String,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl LookupError {
    /// Construct a failure from any adapter error.
    pub fn failed(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        LookupError::Failed {
            message,
            source: Box::new(source),
        }
    }
}

/// Await `lookup` for at most `budget`, reporting an overrun as
/// [`LookupError::Timeout`] on `target`.
pub async fn bounded<T>(
    budget: Duration,
    target: impl Into<String>,
    lookup: BoxFuture<'static, LookupResult<T>>,
) -> LookupResult<T> {
    tokio::time::timeout(budget, lookup)
        .await
        .unwrap_or_else(|_| {
            Err(LookupError::Timeout {
                target: target.into(),
                timeout: budget,
            })
        })
}

/// Port to the external catalog service.
pub trait CatalogLookup: Send + Sync {
    /// Fetch the current metadata for `external_id`, or `None` when the
    /// catalog does not know it.
    fn lookup_by_external_id(
        &self,
        external_id: u64,
    ) -> BoxFuture<'static, LookupResult<Option<CatalogEntry>>>;

    /// Search the catalog by title. Cancelled and otherwise dead entries are
    /// left out by the implementation.
    fn search(&self, query: String) -> BoxFuture<'static, LookupResult<Vec<CatalogMatch>>>;
}

/// Catalog used when no external service is configured: knows no game.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCatalog;

impl CatalogLookup for DisabledCatalog {
    fn lookup_by_external_id(
        &self,
        _external_id: u64,
    ) -> BoxFuture<'static, LookupResult<Option<CatalogEntry>>> {
        Box::pin(async { Ok(None) })
    }

    fn search(&self, _query: String) -> BoxFuture<'static, LookupResult<Vec<CatalogMatch>>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}
