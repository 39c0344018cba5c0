//! Subscriber notifications.
//!
//! # Delivery contract
//!
//! Every [`NotificationGateway`] operation is total: the returned future
//! always completes with `()`. Delivery failures are logged inside the
//! implementation and never reach the caller, so fan-out loops can rely on
//! each send returning before they continue (for example, deleting the
//! subscription after a cancellation notice).

pub mod mail;
#[cfg(feature = "smtp-mail")]
pub mod smtp;

use chrono::NaiveDate;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::GameEntity;

pub use mail::{LogTransport, MailError, MailMessage, MailNotificationGateway, MailTransport};
#[cfg(feature = "smtp-mail")]
pub use smtp::{SmtpConfig, SmtpSecurity, SmtpTransport};

/// Outbound notifications sent to subscribers. See the module docs for the
/// delivery contract.
pub trait NotificationGateway: Send + Sync {
    /// The game is out today.
    fn send_release_today(
        &self,
        email: String,
        game: GameEntity,
        unsubscribe_token: Uuid,
    ) -> BoxFuture<'static, ()>;

    /// The game releases in seven days.
    fn send_release_soon(
        &self,
        email: String,
        game: GameEntity,
        unsubscribe_token: Uuid,
    ) -> BoxFuture<'static, ()>;

    /// The release date moved from `old_date` to `game.release_date`.
    fn send_date_changed(
        &self,
        email: String,
        game: GameEntity,
        old_date: NaiveDate,
        unsubscribe_token: Uuid,
    ) -> BoxFuture<'static, ()>;

    /// The game was cancelled; the subscription is being removed.
    fn send_cancellation(&self, email: String, game: GameEntity) -> BoxFuture<'static, ()>;
}
