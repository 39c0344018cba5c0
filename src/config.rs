//! Application-level configuration loading, including the daily job schedule.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "GAME_RELEASE_TRACKER_CONFIG_PATH";
const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Warsaw;
const DEFAULT_MAIL_FROM: &str = "noreply@game-release-tracker.local";
const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Reasons a configuration file is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Timezone is not a known IANA name.
    #[error("unknown timezone `{0}`")]
    InvalidTimezone(String),
    /// A schedule entry is not `HH:MM`.
    #[error("invalid time of day `{value}` for `{field}`")]
    InvalidTime {
        /// Offending field.
        field: &'static str,
        /// Raw value.
        value: String,
    },
    /// The release sync has to run before the notification jobs.
    #[error("sync_at ({sync_at}) must be earlier than notify_at ({notify_at})")]
    ScheduleOrder {
        /// Parsed sync time.
        sync_at: NaiveTime,
        /// Parsed notification time.
        notify_at: NaiveTime,
    },
    /// Lookups need a non-zero timeout.
    #[error("lookup_timeout_secs must be greater than zero")]
    ZeroLookupTimeout,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    timezone: Tz,
    sync_at: NaiveTime,
    notify_at: NaiveTime,
    mail_from: String,
    base_url: String,
    lookup_timeout: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => match Self::try_from(raw) {
                    Ok(app_config) => {
                        info!(
                            path = %path.display(),
                            timezone = %app_config.timezone,
                            sync_at = %app_config.sync_at,
                            notify_at = %app_config.notify_at,
                            "loaded configuration"
                        );
                        app_config
                    }
                    Err(err) => {
                        warn!(
                            path = %path.display(),
                            error = %err,
                            "invalid config; falling back to defaults"
                        );
                        Self::default()
                    }
                },
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Zone in which "today" is computed and the daily triggers fire.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Local time of the release sync trigger.
    pub fn sync_at(&self) -> NaiveTime {
        self.sync_at
    }

    /// Local time of the notification triggers.
    pub fn notify_at(&self) -> NaiveTime {
        self.notify_at
    }

    /// Sender address used for outgoing mail.
    pub fn mail_from(&self) -> &str {
        &self.mail_from
    }

    /// Public base URL, used to build unsubscribe links.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upper bound for a single catalog lookup.
    pub fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    /// Override the catalog lookup budget.
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
            sync_at: default_sync_at(),
            notify_at: default_notify_at(),
            mail_from: DEFAULT_MAIL_FROM.into(),
            base_url: DEFAULT_BASE_URL.into(),
            lookup_timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    timezone: Option<String>,
    sync_at: Option<String>,
    notify_at: Option<String>,
    mail_from: Option<String>,
    base_url: Option<String>,
    lookup_timeout_secs: Option<u64>,
}

impl TryFrom<RawConfig> for AppConfig {
    type Error = ConfigError;

    fn try_from(value: RawConfig) -> Result<Self, Self::Error> {
        let timezone = match value.timezone {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| ConfigError::InvalidTimezone(name))?,
            None => DEFAULT_TIMEZONE,
        };
        let sync_at = parse_time_of_day("sync_at", value.sync_at)?.unwrap_or_else(default_sync_at);
        let notify_at =
            parse_time_of_day("notify_at", value.notify_at)?.unwrap_or_else(default_notify_at);
        if sync_at >= notify_at {
            return Err(ConfigError::ScheduleOrder { sync_at, notify_at });
        }

        let lookup_timeout_secs = value
            .lookup_timeout_secs
            .unwrap_or(DEFAULT_LOOKUP_TIMEOUT_SECS);
        if lookup_timeout_secs == 0 {
            return Err(ConfigError::ZeroLookupTimeout);
        }

        Ok(Self {
            timezone,
            sync_at,
            notify_at,
            mail_from: value.mail_from.unwrap_or_else(|| DEFAULT_MAIL_FROM.into()),
            base_url: value
                .base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            lookup_timeout: Duration::from_secs(lookup_timeout_secs),
        })
    }
}

fn parse_time_of_day(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<NaiveTime>, ConfigError> {
    value
        .map(|raw| {
            NaiveTime::parse_from_str(raw.trim(), "%H:%M")
                .map_err(|_| ConfigError::InvalidTime { field, value: raw })
        })
        .transpose()
}

fn default_sync_at() -> NaiveTime {
    NaiveTime::from_hms_opt(3, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_notify_at() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<AppConfig, ConfigError> {
        AppConfig::try_from(serde_json::from_str::<RawConfig>(json).unwrap())
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse("{}").unwrap();
        assert_eq!(config.timezone(), chrono_tz::Europe::Warsaw);
        assert_eq!(config.sync_at(), NaiveTime::from_hms_opt(3, 0, 0).unwrap());
        assert_eq!(config.notify_at(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(config.lookup_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn explicit_values_are_applied() {
        let config = parse(
            r#"{
                "timezone": "America/New_York",
                "sync_at": "01:30",
                "notify_at": "08:15",
                "base_url": "https://releases.example.com/",
                "lookup_timeout_secs": 3
            }"#,
        )
        .unwrap();
        assert_eq!(config.timezone(), chrono_tz::America::New_York);
        assert_eq!(config.sync_at(), NaiveTime::from_hms_opt(1, 30, 0).unwrap());
        assert_eq!(config.notify_at(), NaiveTime::from_hms_opt(8, 15, 0).unwrap());
        assert_eq!(config.base_url(), "https://releases.example.com");
        assert_eq!(config.lookup_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn sync_must_precede_notifications() {
        let err = parse(r#"{ "sync_at": "09:00", "notify_at": "09:00" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ScheduleOrder { .. }));
    }

    #[test]
    fn rejects_unknown_timezone_and_bad_times() {
        assert_eq!(
            parse(r#"{ "timezone": "Mars/Olympus" }"#).unwrap_err(),
            ConfigError::InvalidTimezone("Mars/Olympus".into())
        );
        assert!(matches!(
            parse(r#"{ "sync_at": "3am" }"#).unwrap_err(),
            ConfigError::InvalidTime {
                field: "sync_at",
                ..
            }
        ));
        assert_eq!(
            parse(r#"{ "lookup_timeout_secs": 0 }"#).unwrap_err(),
            ConfigError::ZeroLookupTimeout
        );
    }
}
