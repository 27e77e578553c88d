//! HTTP surface.
//!
//! # Endpoints
//!
//! - `POST /webhook` - GitHub deliveries (signature checked before parsing)
//! - `POST /cron_post` - runs a sweep, returns the report
//! - `POST /set_tone` - replaces a user's tone profile
//! - `GET /health` - store connectivity and user count
//! - `GET /all_user` - stored users, without secrets

use std::sync::Arc;

use tower_http::trace::TraceLayer;

use crate::completion::CompletionService;
use crate::compose::Composer;
use crate::github::CommitSource;
use crate::ingest::{DeliveryMode, Ingestor};
use crate::publish::PostPublisher;
use crate::store::UserStore;

mod error;
pub mod health;
pub mod sweep;
pub mod tone;
pub mod users;
pub mod webhook;

pub use error::ServerError;
pub use health::health_handler;
pub use sweep::cron_post_handler;
pub use tone::set_tone_handler;
pub use users::all_users_handler;
pub use webhook::webhook_handler;

/// The concrete backend types a server runs with.
///
/// Production wires Postgres, Gemini, X and GitHub; tests wire in-memory mocks.
pub trait Backends: Send + Sync + 'static {
    type Store: UserStore + 'static;
    type Completion: CompletionService + 'static;
    type Publisher: PostPublisher + 'static;
    type Commits: CommitSource + 'static;
}

/// Settings the handlers need besides the backends.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub webhook_secret: Vec<u8>,
    pub mode: DeliveryMode,
    /// Reported by `/health`.
    pub app_id: u64,
}

/// Shared application state, passed to handlers via `State`.
pub struct AppState<B: Backends> {
    inner: Arc<AppStateInner<B>>,
}

struct AppStateInner<B: Backends> {
    store: B::Store,
    composer: Composer<B::Completion>,
    publisher: B::Publisher,
    commits: B::Commits,
    settings: ServerSettings,
}

impl<B: Backends> Clone for AppState<B> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: Backends> AppState<B> {
    pub fn new(
        store: B::Store,
        composer: Composer<B::Completion>,
        publisher: B::Publisher,
        commits: B::Commits,
        settings: ServerSettings,
    ) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                store,
                composer,
                publisher,
                commits,
                settings,
            }),
        }
    }

    pub fn store(&self) -> &B::Store {
        &self.inner.store
    }

    pub fn composer(&self) -> &Composer<B::Completion> {
        &self.inner.composer
    }

    pub fn publisher(&self) -> &B::Publisher {
        &self.inner.publisher
    }

    pub fn commits(&self) -> &B::Commits {
        &self.inner.commits
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.inner.settings
    }

    pub fn ingestor(&self) -> Ingestor<'_, B::Store, B::Completion, B::Publisher, B::Commits> {
        Ingestor {
            store: &self.inner.store,
            composer: &self.inner.composer,
            publisher: &self.inner.publisher,
            commits: &self.inner.commits,
            mode: self.inner.settings.mode,
        }
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<B: Backends>(app_state: AppState<B>) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler::<B>))
        .route("/cron_post", post(cron_post_handler::<B>))
        .route("/set_tone", post(set_tone_handler::<B>))
        .route("/health", get(health_handler::<B>))
        .route("/all_user", get(all_users_handler::<B>))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
