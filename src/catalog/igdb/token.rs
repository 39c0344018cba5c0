use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::info;

use super::{
    error::{IgdbError, IgdbResult},
    models::TokenResponse,
};

/// Tokens are refreshed this long before they actually expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(300);

#[derive(Debug)]
struct CachedToken {
    value: Arc<str>,
    expires_at: Instant,
}

/// Twitch client-credentials token, fetched lazily and cached until close to expiry.
#[derive(Clone)]
pub(super) struct TokenCache {
    client: Client,
    token_url: Arc<str>,
    client_id: Arc<str>,
    client_secret: Arc<str>,
    cached: Arc<Mutex<Option<CachedToken>>>,
}

impl TokenCache {
    pub fn new(client: Client, token_url: &str, client_id: &str, client_secret: &str) -> Self {
        Self {
            client,
            token_url: Arc::from(token_url),
            client_id: Arc::from(client_id),
            client_secret: Arc::from(client_secret),
            cached: Arc::new(Mutex::new(None)),
        }
    }

    /// Return a valid access token, fetching a new one when needed.
    pub async fn token(&self) -> IgdbResult<Arc<str>> {
        let mut guard = self.cached.lock().await;
        if let Some(cached) = guard.as_ref() {
            if Instant::now() + REFRESH_MARGIN < cached.expires_at {
                return Ok(cached.value.clone());
            }
        }

        info!("fetching new IGDB access token");
        let query = [
            ("client_id", self.client_id.as_ref()),
            ("client_secret", self.client_secret.as_ref()),
            ("grant_type", "client_credentials"),
        ];
        let response = self
            .client
            .post(self.token_url.as_ref())
            .query(&query)
            .send()
            .await
            .map_err(|source| IgdbError::TokenRequest { source })?;

        if !response.status().is_success() {
            return Err(IgdbError::TokenStatus {
                status: response.status(),
            });
        }

        let payload = response
            .json::<TokenResponse>()
            .await
            .map_err(|source| IgdbError::TokenRequest { source })?;
        info!(expires_in = payload.expires_in, "IGDB token fetched");

        let value = Arc::<str>::from(payload.access_token);
        *guard = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + Duration::from_secs(payload.expires_in),
        });
        Ok(value)
    }

    /// Drop the cached token, e.g. after IGDB rejected it.
    pub async fn invalidate(&self) {
        self.cached.lock().await.take();
    }
}
