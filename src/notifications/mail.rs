//! Plain-text mail rendering and delivery.

use std::{error::Error, sync::Arc};

use chrono::NaiveDate;
use futures::future::BoxFuture;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::{dao::models::GameEntity, notifications::NotificationGateway};

/// Outgoing plain-text mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Failure reported by a [`MailTransport`].
#[derive(Debug, Error)]
#[error("mail delivery to `{recipient}` failed: {message}")]
pub struct MailError {
    /// Address the message was meant for.
    pub recipient: String,
    /// Human readable context.
    pub message: String,
    /// Underlying transport failure, when there is one.
    #[source]
    pub source: Option<Box<dyn Error + Send + Sync>>,
}

/// Something able to hand a message over for delivery.
///
/// Unlike [`NotificationGateway`], transports report failures.
pub trait MailTransport: Send + Sync {
    /// Deliver `message`.
    fn deliver(&self, message: MailMessage) -> BoxFuture<'static, Result<(), MailError>>;
}

/// Transport writing messages to the log instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

impl MailTransport for LogTransport {
    fn deliver(&self, message: MailMessage) -> BoxFuture<'static, Result<(), MailError>> {
        Box::pin(async move {
            info!(
                from = %message.from,
                to = %message.to,
                subject = %message.subject,
                body = %message.body,
                "outgoing mail"
            );
            Ok(())
        })
    }
}

/// [`NotificationGateway`] rendering plain-text mails and delivering them
/// through a [`MailTransport`]. Transport failures are logged and dropped.
#[derive(Clone)]
pub struct MailNotificationGateway {
    transport: Arc<dyn MailTransport>,
    from: Arc<str>,
    base_url: Arc<str>,
}

impl MailNotificationGateway {
    /// Create a gateway sending as `from` with unsubscribe links under `base_url`.
    pub fn new(transport: Arc<dyn MailTransport>, from: &str, base_url: &str) -> Self {
        Self {
            transport,
            from: Arc::from(from),
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    fn message(&self, to: String, subject: String, body: String) -> MailMessage {
        MailMessage {
            from: self.from.to_string(),
            to,
            subject,
            body,
        }
    }

    fn unsubscribe_link(&self, token: Uuid) -> String {
        format!("{}/api/v1/unsubscribe/{}", self.base_url, token)
    }

    fn send(&self, message: MailMessage) -> BoxFuture<'static, ()> {
        let transport = self.transport.clone();
        Box::pin(async move {
            let to = message.to.clone();
            let subject = message.subject.clone();
            match transport.deliver(message).await {
                Ok(()) => info!(%to, %subject, "email sent"),
                Err(err) => error!(%to, %subject, error = %err, "failed to send email"),
            }
        })
    }

    fn release_today_message(&self, to: String, game: &GameEntity, token: Uuid) -> MailMessage {
        let subject = format!("{} is out today!", game.title);
        let body = format!(
            "Great news! {} is available now.\n\n{}\n---\nUnsubscribe: {}\n",
            game.title,
            release_details(game),
            self.unsubscribe_link(token)
        );
        self.message(to, subject, body)
    }

    fn release_soon_message(&self, to: String, game: &GameEntity, token: Uuid) -> MailMessage {
        let subject = format!("{} releases in 7 days!", game.title);
        let body = format!(
            "Heads up! {} releases in one week.\n\n{}\n---\nUnsubscribe: {}\n",
            game.title,
            release_details(game),
            self.unsubscribe_link(token)
        );
        self.message(to, subject, body)
    }

    fn date_changed_message(
        &self,
        to: String,
        game: &GameEntity,
        old_date: NaiveDate,
        token: Uuid,
    ) -> MailMessage {
        let subject = format!("{} has a new release date", game.title);
        let body = format!(
            "The release date of {} has changed.\n\n\
             Previous date: {}\nNew date: {}\nPlatforms: {}\n\n\
             ---\nUnsubscribe: {}\n",
            game.title,
            old_date,
            game.release_date,
            game.platform_labels(),
            self.unsubscribe_link(token)
        );
        self.message(to, subject, body)
    }

    fn cancellation_message(&self, to: String, game: &GameEntity) -> MailMessage {
        let subject = format!("{} has been cancelled", game.title);
        let body = format!(
            "We're sorry to let you know that {} has been cancelled \
             and will no longer be released.\n\n\
             Your subscription has been removed automatically.\n",
            game.title
        );
        self.message(to, subject, body)
    }
}

fn release_details(game: &GameEntity) -> String {
    let mut details = format!(
        "Release date: {}\nPlatforms: {}\n",
        game.release_date,
        game.platform_labels()
    );
    if let Some(shop_url) = game.shop_url.as_deref() {
        details.push_str(&format!("Shop: {shop_url}\n"));
    }
    details
}

impl NotificationGateway for MailNotificationGateway {
    fn send_release_today(
        &self,
        email: String,
        game: GameEntity,
        unsubscribe_token: Uuid,
    ) -> BoxFuture<'static, ()> {
        self.send(self.release_today_message(email, &game, unsubscribe_token))
    }

    fn send_release_soon(
        &self,
        email: String,
        game: GameEntity,
        unsubscribe_token: Uuid,
    ) -> BoxFuture<'static, ()> {
        self.send(self.release_soon_message(email, &game, unsubscribe_token))
    }

    fn send_date_changed(
        &self,
        email: String,
        game: GameEntity,
        old_date: NaiveDate,
        unsubscribe_token: Uuid,
    ) -> BoxFuture<'static, ()> {
        self.send(self.date_changed_message(email, &game, old_date, unsubscribe_token))
    }

    fn send_cancellation(&self, email: String, game: GameEntity) -> BoxFuture<'static, ()> {
        self.send(self.cancellation_message(email, &game))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingTransport, sample_game};

    fn gateway(transport: &RecordingTransport) -> MailNotificationGateway {
        MailNotificationGateway::new(
            Arc::new(transport.clone()),
            "noreply@example.com",
            "https://releases.example.com/",
        )
    }

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
    }

    #[tokio::test]
    async fn release_today_links_unsubscribe_token() {
        let transport = RecordingTransport::default();
        let mut game = sample_game("Hades II", date(10, 19));
        game.shop_url = Some("https://store.example.com/hades-2".into());
        let token = Uuid::new_v4();

        gateway(&transport)
            .send_release_today("fan@example.com".into(), game, token)
            .await;

        let sent = transport.delivered();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "fan@example.com");
        assert_eq!(sent[0].from, "noreply@example.com");
        assert_eq!(sent[0].subject, "Hades II is out today!");
        assert!(sent[0].body.contains("Shop: https://store.example.com/hades-2"));
        assert!(sent[0].body.contains(&format!(
            "https://releases.example.com/api/v1/unsubscribe/{token}"
        )));
    }

    #[tokio::test]
    async fn date_changed_mentions_both_dates() {
        let transport = RecordingTransport::default();
        let game = sample_game("Hades II", date(11, 2));

        gateway(&transport)
            .send_date_changed("fan@example.com".into(), game, date(10, 30), Uuid::new_v4())
            .await;

        let body = &transport.delivered()[0].body;
        assert!(body.contains("Previous date: 2026-10-30"));
        assert!(body.contains("New date: 2026-11-02"));
    }

    #[tokio::test]
    async fn cancellation_has_no_unsubscribe_link() {
        let transport = RecordingTransport::default();
        gateway(&transport)
            .send_cancellation("fan@example.com".into(), sample_game("Scalebound", date(12, 1)))
            .await;

        let sent = transport.delivered();
        assert_eq!(sent[0].subject, "Scalebound has been cancelled");
        assert!(!sent[0].body.contains("unsubscribe/"));
    }

    #[tokio::test]
    async fn transport_failures_are_swallowed() {
        let transport = RecordingTransport::failing_for(["bounce@example.com"]);
        let gateway = gateway(&transport);

        gateway
            .send_release_soon(
                "bounce@example.com".into(),
                sample_game("Hades II", date(10, 26)),
                Uuid::new_v4(),
            )
            .await;
        gateway
            .send_release_soon(
                "fan@example.com".into(),
                sample_game("Hades II", date(10, 26)),
                Uuid::new_v4(),
            )
            .await;

        assert_eq!(transport.attempted(), 2);
        assert_eq!(transport.delivered().len(), 1);
    }
}
