use std::time::Duration;

use super::error::{IgdbError, IgdbResult};

const DEFAULT_API_URL: &str = "https://api.igdb.com/v4";
const DEFAULT_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime configuration describing how to reach IGDB.
#[derive(Debug, Clone)]
pub struct IgdbConfig {
    pub api_url: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout: Duration,
}

impl IgdbConfig {
    /// Construct a configuration for the public IGDB endpoints.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            token_url: DEFAULT_TOKEN_URL.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound every HTTP call made by the client.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Point the client at different endpoints (staging, local mocks).
    pub fn with_endpoints(
        mut self,
        api_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        self.api_url = api_url.into();
        self.token_url = token_url.into();
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> IgdbResult<Self> {
        let client_id = required_env("IGDB_CLIENT_ID")?;
        let client_secret = required_env("IGDB_CLIENT_SECRET")?;

        let mut config = Self::new(client_id, client_secret);
        if let Ok(api_url) = std::env::var("IGDB_API_URL") {
            config.api_url = api_url;
        }
        Ok(config)
    }
}

fn required_env(var: &'static str) -> IgdbResult<String> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(IgdbError::MissingEnvVar { var })
}
