//! Daily subscriber reminders for games releasing today or in seven days.
//!
//! Both jobs are read-only with respect to games and subscriptions.

use chrono::{Days, NaiveDate};
use tracing::{error, info, warn};

use crate::{
    dao::models::{GameEntity, GameStatus},
    error::ServiceError,
    state::AppState,
};

/// Kind of reminder sent by the notification job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reminder {
    /// The game is out today.
    ReleaseToday,
    /// The game is out in seven days.
    ReleaseSoon,
}

impl Reminder {
    /// Days between `today` and the release date this reminder targets.
    pub fn days_ahead(self) -> u64 {
        match self {
            Reminder::ReleaseToday => 0,
            Reminder::ReleaseSoon => 7,
        }
    }

    /// Release date targeted on `today`, `None` past the calendar's end.
    pub fn target_date(self, today: NaiveDate) -> Option<NaiveDate> {
        today.checked_add_days(Days::new(self.days_ahead()))
    }

    fn label(self) -> &'static str {
        match self {
            Reminder::ReleaseToday => "release-today",
            Reminder::ReleaseSoon => "release-soon",
        }
    }
}

/// Counters reported by a reminder run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NotificationSummary {
    /// Games releasing on the target date.
    pub games: usize,
    /// Reminders handed to the gateway.
    pub sent: usize,
    /// Games whose subscribers could not be loaded.
    pub failed_games: usize,
}

/// Remind subscribers of UPCOMING games releasing on `today`.
pub async fn send_release_today(
    state: &AppState,
    today: NaiveDate,
) -> Result<NotificationSummary, ServiceError> {
    send_reminders(state, Reminder::ReleaseToday, today).await
}

/// Remind subscribers of UPCOMING games releasing seven days after `today`.
pub async fn send_release_soon(
    state: &AppState,
    today: NaiveDate,
) -> Result<NotificationSummary, ServiceError> {
    send_reminders(state, Reminder::ReleaseSoon, today).await
}

async fn send_reminders(
    state: &AppState,
    reminder: Reminder,
    today: NaiveDate,
) -> Result<NotificationSummary, ServiceError> {
    let Some(target) = reminder.target_date(today) else {
        warn!(%today, kind = reminder.label(), "target date out of range; skipping reminders");
        return Ok(NotificationSummary::default());
    };

    let games = state
        .games()
        .find_by_status_and_release_date(GameStatus::Upcoming, target)
        .await?;

    let mut summary = NotificationSummary {
        games: games.len(),
        ..NotificationSummary::default()
    };
    for game in games {
        match notify_subscribers(state, reminder, &game).await {
            Ok(sent) => summary.sent += sent,
            Err(err) => {
                summary.failed_games += 1;
                error!(
                    game_id = %game.id,
                    kind = reminder.label(),
                    error = %err,
                    "failed to load subscribers for reminder"
                );
            }
        }
    }

    info!(
        kind = reminder.label(),
        %target,
        games = summary.games,
        sent = summary.sent,
        failed_games = summary.failed_games,
        "reminders sent"
    );
    Ok(summary)
}

async fn notify_subscribers(
    state: &AppState,
    reminder: Reminder,
    game: &GameEntity,
) -> Result<usize, ServiceError> {
    let subscriptions = state.subscriptions().find_all_for_game(game.id).await?;
    for subscription in &subscriptions {
        let email = subscription.email.clone();
        let token = subscription.unsubscribe_token;
        match reminder {
            Reminder::ReleaseToday => {
                state
                    .notifier()
                    .send_release_today(email, game.clone(), token)
                    .await
            }
            Reminder::ReleaseSoon => {
                state
                    .notifier()
                    .send_release_soon(email, game.clone(), token)
                    .await
            }
        }
    }
    Ok(subscriptions.len())
}
