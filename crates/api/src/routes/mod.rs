//! HTTP route handlers.

pub mod categories;
pub mod commands;
pub mod health;
pub mod metrics;
pub mod users;

use command_server::CommandService;
use event_store::EventStore;
use projections::{CategoriesView, UsersView};

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore + Clone> {
    pub commands: CommandService<S>,
    pub users: UsersView,
    pub categories: CategoriesView,
}
