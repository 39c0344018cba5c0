//! SMTP delivery through `lettre`.

use std::time::Duration;

use futures::future::BoxFuture;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::{self, authentication::Credentials},
};
use thiserror::Error;
use tracing::debug;

use crate::notifications::{MailError, MailMessage, MailTransport};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How the connection to the relay is secured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// Plain connection upgraded with STARTTLS (port 587).
    #[default]
    StartTls,
    /// TLS from the first byte (port 465).
    Tls,
    /// No encryption. Local relays and tests only.
    Plain,
}

impl SmtpSecurity {
    fn default_port(self) -> u16 {
        match self {
            SmtpSecurity::StartTls => 587,
            SmtpSecurity::Tls => 465,
            SmtpSecurity::Plain => 25,
        }
    }
}

/// Invalid SMTP settings.
#[derive(Debug, Error)]
pub enum SmtpConfigError {
    /// `SMTP_PORT` is not a port number.
    #[error("invalid SMTP port `{value}`")]
    InvalidPort {
        /// Raw value.
        value: String,
    },
    /// `SMTP_SECURITY` is not one of `starttls`, `tls`, `plain`.
    #[error("invalid SMTP security mode `{value}` (expected starttls, tls or plain)")]
    InvalidSecurity {
        /// Raw value.
        value: String,
    },
    /// Only one of `SMTP_USERNAME` / `SMTP_PASSWORD` is set.
    #[error("SMTP_USERNAME and SMTP_PASSWORD must be set together")]
    PartialCredentials,
    /// The relay could not be set up (e.g. TLS parameters for the host).
    #[error("failed to configure SMTP relay")]
    Relay(#[from] smtp::Error),
}

/// Where and how to reach the SMTP relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    /// Relay host name.
    pub host: String,
    /// Relay port.
    pub port: u16,
    /// Connection security.
    pub security: SmtpSecurity,
    /// Username and password, when the relay requires auth.
    pub credentials: Option<(String, String)>,
    /// Bound on each SMTP command.
    pub timeout: Duration,
}

impl SmtpConfig {
    /// Relay at `host` on the default port for `security`.
    pub fn new(host: impl Into<String>, security: SmtpSecurity) -> Self {
        Self {
            host: host.into(),
            port: security.default_port(),
            security,
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read `SMTP_*` from the environment. `None` when `SMTP_HOST` is unset.
    pub fn from_env() -> Result<Option<Self>, SmtpConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Same as [`SmtpConfig::from_env`] over an arbitrary variable source.
    pub fn from_vars(
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, SmtpConfigError> {
        let var = |name: &str| var(name).filter(|value| !value.trim().is_empty());

        let Some(host) = var("SMTP_HOST") else {
            return Ok(None);
        };

        let security = match var("SMTP_SECURITY") {
            None => SmtpSecurity::default(),
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "starttls" => SmtpSecurity::StartTls,
                "tls" => SmtpSecurity::Tls,
                "plain" => SmtpSecurity::Plain,
                _ => return Err(SmtpConfigError::InvalidSecurity { value }),
            },
        };

        let mut config = Self::new(host.trim(), security);
        if let Some(value) = var("SMTP_PORT") {
            config.port = value
                .trim()
                .parse()
                .map_err(|_| SmtpConfigError::InvalidPort { value })?;
        }
        config.credentials = match (var("SMTP_USERNAME"), var("SMTP_PASSWORD")) {
            (Some(username), Some(password)) => Some((username, password)),
            (None, None) => None,
            _ => return Err(SmtpConfigError::PartialCredentials),
        };
        Ok(Some(config))
    }

    /// Bound each SMTP command by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// [`MailTransport`] handing messages to an SMTP relay.
#[derive(Clone)]
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Build the relay client. No connection is opened until the first send.
    pub fn new(config: SmtpConfig) -> Result<Self, SmtpConfigError> {
        let builder = match config.security {
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            }
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
            SmtpSecurity::Plain => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            }
        };

        let mut builder = builder.port(config.port).timeout(Some(config.timeout));
        if let Some((username, password)) = config.credentials {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            mailer: builder.build(),
        })
    }
}

fn build_message(message: &MailMessage) -> Result<Message, MailError> {
    let failure = |context: &str, source: Box<dyn std::error::Error + Send + Sync>| MailError {
        recipient: message.to.clone(),
        message: context.to_string(),
        source: Some(source),
    };

    let from: Mailbox = message
        .from
        .parse()
        .map_err(|err| failure("invalid sender address", Box::new(err)))?;
    let to: Mailbox = message
        .to
        .parse()
        .map_err(|err| failure("invalid recipient address", Box::new(err)))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(message.body.clone())
        .map_err(|err| failure("failed to build message", Box::new(err)))
}

impl MailTransport for SmtpTransport {
    fn deliver(&self, message: MailMessage) -> BoxFuture<'static, Result<(), MailError>> {
        let mailer = self.mailer.clone();
        Box::pin(async move {
            let email = build_message(&message)?;
            let response = mailer.send(email).await.map_err(|err| MailError {
                recipient: message.to.clone(),
                message: "SMTP delivery failed".into(),
                source: Some(Box::new(err)),
            })?;
            debug!(to = %message.to, code = %response.code(), "mail accepted by relay");
            Ok(())
        })
    }
}
