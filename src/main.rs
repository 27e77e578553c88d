use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pushpost::completion::GeminiClient;
use pushpost::compose::Composer;
use pushpost::config::AppConfig;
use pushpost::github::{GitHubApp, install_url};
use pushpost::publish::TwitterPublisher;
use pushpost::server::{AppState, Backends, ServerSettings, build_router};
use pushpost::store::{PgUserStore, UserStore};

struct LiveBackends;

impl Backends for LiveBackends {
    type Store = PgUserStore;
    type Completion = GeminiClient;
    type Publisher = TwitterPublisher;
    type Commits = GitHubApp;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pushpost=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    info!(?config, "Configuration loaded");

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    let store = PgUserStore::new(pool);
    store
        .ping()
        .await
        .context("database connectivity test failed")?;
    store
        .ensure_schema()
        .await
        .context("failed to apply database schema")?;
    info!("Database connected");

    let github = GitHubApp::new(config.github_app_id, &config.github_private_key)
        .context("failed to set up GitHub App client")?;
    match config.github_app_name.as_deref() {
        Some(name) => info!(app_id = config.github_app_id, install_url = %install_url(name), "GitHub App ready"),
        None => info!(app_id = config.github_app_id, "GitHub App ready"),
    }

    let composer = Composer::new(GeminiClient::new(
        config.gemini_api_key.as_str(),
        config.gemini_model.as_str(),
    ));
    let publisher = TwitterPublisher::new(
        config.twitter_api_key.as_str(),
        config.twitter_api_secret.as_str(),
    );

    let app_state = AppState::<LiveBackends>::new(
        store.clone(),
        composer,
        publisher,
        github,
        ServerSettings {
            webhook_secret: config.webhook_secret.clone().into_bytes(),
            mode: config.delivery_mode,
            app_id: config.github_app_id,
        },
    );
    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, mode = %config.delivery_mode, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
