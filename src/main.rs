//! Game release tracker binary entrypoint wiring the REST API, storage, mail
//! and daily jobs.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use game_release_tracker::{
    catalog::CatalogLookup,
    config::AppConfig,
    dao::game_store::memory::MemoryStore,
    notifications::{MailNotificationGateway, MailTransport},
    routes,
    services::scheduler,
    state::{AppState, Collaborators, SharedState},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = MemoryStore::new();
    let notifier = MailNotificationGateway::new(
        build_mail_transport(),
        config.mail_from(),
        config.base_url(),
    );

    let app_state = AppState::new(
        Collaborators {
            games: Arc::new(store.clone()),
            subscriptions: Arc::new(store),
            catalog: build_catalog(&config),
            notifier: Arc::new(notifier),
        },
        config,
    );

    let mut jobs = scheduler::start(app_state.clone())
        .await
        .context("starting job scheduler")?;

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    if let Err(err) = jobs.shutdown().await {
        error!(error = %err, "job scheduler did not shut down cleanly");
    }

    Ok(())
}

#[cfg(feature = "igdb-lookup")]
fn build_catalog(config: &AppConfig) -> Arc<dyn CatalogLookup> {
    use game_release_tracker::catalog::{
        DisabledCatalog,
        igdb::{IgdbCatalog, IgdbConfig},
    };

    let catalog = IgdbConfig::from_env()
        .and_then(|igdb| IgdbCatalog::new(igdb.with_timeout(config.lookup_timeout())));
    match catalog {
        Ok(catalog) => {
            info!("IGDB catalog lookups enabled");
            Arc::new(catalog)
        }
        Err(err) => {
            warn!(
                error = %err,
                "IGDB catalog unavailable; release dates will not be refreshed"
            );
            Arc::new(DisabledCatalog)
        }
    }
}

#[cfg(not(feature = "igdb-lookup"))]
fn build_catalog(_config: &AppConfig) -> Arc<dyn CatalogLookup> {
    info!("built without catalog support; release dates will not be refreshed");
    Arc::new(game_release_tracker::catalog::DisabledCatalog)
}

#[cfg(feature = "smtp-mail")]
fn build_mail_transport() -> Arc<dyn MailTransport> {
    use game_release_tracker::notifications::{LogTransport, SmtpConfig, SmtpTransport};

    let smtp = match SmtpConfig::from_env() {
        Ok(Some(smtp)) => smtp,
        Ok(None) => {
            info!("SMTP_HOST not set; outgoing mail is only logged");
            return Arc::new(LogTransport);
        }
        Err(err) => {
            warn!(error = %err, "SMTP settings invalid; outgoing mail is only logged");
            return Arc::new(LogTransport);
        }
    };

    let (host, port) = (smtp.host.clone(), smtp.port);
    match SmtpTransport::new(smtp) {
        Ok(transport) => {
            info!(%host, port, "sending mail through SMTP relay");
            Arc::new(transport)
        }
        Err(err) => {
            warn!(%host, error = %err, "SMTP relay unusable; outgoing mail is only logged");
            Arc::new(LogTransport)
        }
    }
}

#[cfg(not(feature = "smtp-mail"))]
fn build_mail_transport() -> Arc<dyn MailTransport> {
    info!("built without SMTP support; outgoing mail is only logged");
    Arc::new(game_release_tracker::notifications::LogTransport)
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug,tokio_cron_scheduler=warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
