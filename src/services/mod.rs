/// Subscriber notification and clean-up when a game is cancelled.
pub mod cancellation;
/// Request-facing game use cases.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Catalog search and detail for the game form.
pub mod lookup_service;
/// Release-today and release-in-seven-days reminders.
pub mod notification_job;
/// Auto-release and catalog date refresh.
pub mod release_sync;
/// Daily cron triggers for the background jobs.
pub mod scheduler;
/// Follow and unfollow games by email.
pub mod subscription_service;
