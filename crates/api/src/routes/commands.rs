//! Command endpoint.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use command_api::{CommandEnvelope, CommandResult};
use event_store::EventStore;

use super::AppState;

/// POST /commands: runs one command and returns its result.
///
/// Always answers `200 OK`; failures are expressed by the result code,
/// including bodies that are not a command envelope at all.
pub async fn execute<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Json<CommandResult> {
    let envelope: CommandEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(error) => {
            tracing::info!(%error, "unreadable command envelope");
            let result = CommandResult::invalid_command(error.to_string());
            metrics::counter!(
                "commands_total",
                "type" => "invalid",
                "code" => result.code.to_string()
            )
            .increment(1);
            return Json(result);
        }
    };

    Json(state.commands.execute(envelope).await)
}
