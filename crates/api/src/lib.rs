//! HTTP transport for the auction command and query sides.
//!
//! Commands go through `POST /commands` to the command service gateway.
//! Queries read the users and categories read models, which a background
//! listener keeps up to date. Structured logging (tracing) and Prometheus
//! metrics are wired in.

pub mod config;
pub mod error;
pub mod routes;
pub mod storage;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use command_server::{
    AuctionCommandHandler, CommandRouter, CommandService, MessageProducer, VerificationMailer,
};
use common::MessageEnvelope;
use domain::FanOutPublisher;
use event_store::EventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use projections::{CategoriesView, MessageListener, UsersView};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::AppState;
use storage::Storage;

/// Sender address of verification mails.
pub const MAIL_SENDER: &str = "noreply@auction.local";

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::scrape))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/commands", post(routes::commands::execute::<S>))
        .route("/users", get(routes::users::list::<S>))
        .route("/users/{id}", get(routes::users::get::<S>))
        .route("/categories", get(routes::categories::list::<S>))
        .route("/categories/{id}", get(routes::categories::get::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// The query side's consumer, ready to be started.
pub struct ReadSide {
    pub listener: MessageListener,
    pub messages: mpsc::UnboundedReceiver<MessageEnvelope>,
}

impl ReadSide {
    /// Runs the listener loop on its own task. The task ends once the
    /// command side is dropped.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.listener.run(self.messages))
    }
}

/// Wires the command side, the read models and the channel between them.
pub fn create_default_state<S: EventStore + Clone + 'static>(
    event_store: S,
    config: &Config,
    storage: Storage,
) -> (Arc<AppState<S>>, ReadSide) {
    let (producer, messages) = MessageProducer::channel();
    let publisher = FanOutPublisher::new()
        .with(Arc::new(producer))
        .with(Arc::new(VerificationMailer::new(MAIL_SENDER)));

    let handler = AuctionCommandHandler::builder(event_store)
        .publisher(Arc::new(publisher))
        .user_constraints(storage.user_constraints)
        .category_constraints(storage.category_constraints)
        .category_ids(storage.category_ids)
        .max_retries(config.concurrency_retries)
        .build();
    let commands = CommandService::new(CommandRouter::auction(Arc::new(handler)))
        .with_timeout(config.command_timeout);

    let users = UsersView::new();
    let categories = CategoriesView::new();
    let listener = MessageListener::new()
        .with(Arc::new(users.clone()))
        .with(Arc::new(categories.clone()));

    let state = Arc::new(AppState {
        commands,
        users,
        categories,
    });

    (state, ReadSide { listener, messages })
}
