use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::catalog::{CatalogEntry, CatalogLookup, CatalogMatch, LookupError, LookupResult};

use super::{
    config::IgdbConfig,
    error::{IgdbError, IgdbResult},
    models::{IgdbGame, detail_query, search_query},
    token::TokenCache,
};

const GAMES_PATH: &str = "games";

/// [`CatalogLookup`] backed by the IGDB v4 API.
#[derive(Clone)]
pub struct IgdbCatalog {
    client: Client,
    api_url: Arc<str>,
    client_id: Arc<str>,
    tokens: TokenCache,
    timeout: std::time::Duration,
}

impl IgdbCatalog {
    /// Build the HTTP client. No request is sent until the first lookup.
    pub fn new(config: IgdbConfig) -> IgdbResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| IgdbError::ClientBuilder { source })?;

        let tokens = TokenCache::new(
            client.clone(),
            &config.token_url,
            &config.client_id,
            &config.client_secret,
        );

        Ok(Self {
            client,
            api_url: Arc::<str>::from(config.api_url.trim_end_matches('/')),
            client_id: Arc::<str>::from(config.client_id),
            tokens,
            timeout: config.timeout,
        })
    }

    /// Fetch the detail record for `igdb_id`.
    pub async fn detail(&self, igdb_id: u64) -> IgdbResult<Option<CatalogEntry>> {
        let games = self.query_games(detail_query(igdb_id)).await?;
        Ok(games.into_iter().next().map(IgdbGame::into_entry))
    }

    /// Search IGDB by title.
    pub async fn search_games(&self, query: &str) -> IgdbResult<Vec<CatalogMatch>> {
        let games = self.query_games(search_query(query)).await?;
        Ok(games.into_iter().map(IgdbGame::into_match).collect())
    }

    fn lookup_error(&self, target: String, err: IgdbError) -> LookupError {
        if err.is_timeout() {
            LookupError::Timeout {
                target,
                timeout: self.timeout,
            }
        } else {
            err.into()
        }
    }

    async fn query_games(&self, body: String) -> IgdbResult<Vec<IgdbGame>> {
        let url = format!("{}/{}", self.api_url, GAMES_PATH);
        let token = self.tokens.token().await?;
        debug!(query = %body, "IGDB query");

        let response = self
            .client
            .post(&url)
            .header("Client-ID", self.client_id.as_ref())
            .bearer_auth(token.as_ref())
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await
            .map_err(|source| IgdbError::RequestSend {
                path: GAMES_PATH.to_string(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => {
                response
                    .json::<Vec<IgdbGame>>()
                    .await
                    .map_err(|source| IgdbError::DecodeResponse {
                        path: GAMES_PATH.to_string(),
                        source,
                    })
            }
            StatusCode::UNAUTHORIZED => {
                self.tokens.invalidate().await;
                Err(IgdbError::RequestStatus {
                    path: GAMES_PATH.to_string(),
                    status: StatusCode::UNAUTHORIZED,
                })
            }
            other => Err(IgdbError::RequestStatus {
                path: GAMES_PATH.to_string(),
                status: other,
            }),
        }
    }
}

impl CatalogLookup for IgdbCatalog {
    fn lookup_by_external_id(
        &self,
        external_id: u64,
    ) -> BoxFuture<'static, LookupResult<Option<CatalogEntry>>> {
        let catalog = self.clone();
        Box::pin(async move {
            catalog
                .detail(external_id)
                .await
                .map_err(|err| catalog.lookup_error(external_id.to_string(), err))
        })
    }

    fn search(&self, query: String) -> BoxFuture<'static, LookupResult<Vec<CatalogMatch>>> {
        let catalog = self.clone();
        Box::pin(async move {
            catalog
                .search_games(&query)
                .await
                .map_err(|err| catalog.lookup_error(query, err))
        })
    }
}
