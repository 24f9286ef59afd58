//! Entry point for clients: validates, dispatches and checks every command.

use std::sync::Arc;
use std::time::{Duration, Instant};

use command_api::{AuctionCommand, CommandEnvelope, CommandResult};
use event_store::EventStore;

use crate::router::{CommandRouter, PreparedCommand};

/// Default time a command may take before the caller gets `INTERNAL_ERROR`.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(5000);

/// Metric label for commands rejected before their type was resolved.
const INVALID_TYPE_LABEL: &str = "invalid";

/// Command service gateway.
///
/// [`CommandService::execute`] never fails: every problem is folded into a
/// [`CommandResult`], with the details left in the logs.
pub struct CommandService<S>
where
    S: EventStore + Clone,
{
    router: Arc<CommandRouter<S>>,
    timeout: Duration,
}

impl<S> Clone for CommandService<S>
where
    S: EventStore + Clone,
{
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
            timeout: self.timeout,
        }
    }
}

impl<S> CommandService<S>
where
    S: EventStore + Clone + 'static,
{
    pub fn new(router: CommandRouter<S>) -> Self {
        Self {
            router: Arc::new(router),
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn router(&self) -> &CommandRouter<S> {
        &self.router
    }

    /// Runs a typed command.
    pub async fn send<C: AuctionCommand>(&self, command: &C) -> CommandResult {
        match CommandEnvelope::wrap(command) {
            Ok(envelope) => self.execute(envelope).await,
            Err(error) => {
                tracing::error!(%error, command_type = C::TYPE, "failed to encode command");
                CommandResult::internal_error()
            }
        }
    }

    /// Runs a command received on the wire.
    #[tracing::instrument(
        skip(self, envelope),
        fields(command_type = %envelope.command_type, code = tracing::field::Empty)
    )]
    pub async fn execute(&self, envelope: CommandEnvelope) -> CommandResult {
        let started = Instant::now();

        let prepared = match self.router.prepare(&envelope) {
            Ok(prepared) => prepared,
            Err(error) => {
                tracing::info!(%error, "rejected invalid command");
                let label = if self.router.handles(&envelope.command_type) {
                    envelope.command_type.as_str()
                } else {
                    INVALID_TYPE_LABEL
                };
                let label = label.to_string();
                return record(label, CommandResult::invalid_command(error.to_string()), started);
            }
        };

        let PreparedCommand {
            command_type,
            result_codes,
            creates_aggregate,
            trace,
            future,
        } = prepared;

        tracing::debug!(command = %trace, "dispatching command");
        let task = tokio::spawn(future);

        let result = match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(result))) => result,
            Ok(Ok(Err(error))) => {
                tracing::error!(%error, command = %trace, "command failed");
                CommandResult::internal_error()
            }
            Ok(Err(error)) => {
                tracing::error!(%error, command = %trace, "command task panicked");
                CommandResult::internal_error()
            }
            Err(_) => {
                // The task keeps running; its outcome is no longer reported.
                tracing::error!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    command = %trace,
                    "command timed out"
                );
                CommandResult::internal_error()
            }
        };

        let result = match result.validate(command_type, result_codes, creates_aggregate) {
            Ok(()) => result,
            Err(error) => {
                tracing::error!(%error, command = %trace, "command produced an invalid result");
                CommandResult::internal_error()
            }
        };

        record(command_type.to_string(), result, started)
    }
}

fn record(command_type: String, result: CommandResult, started: Instant) -> CommandResult {
    tracing::Span::current().record("code", result.code);
    metrics::counter!(
        "commands_total",
        "type" => command_type.clone(),
        "code" => result.code.to_string()
    )
    .increment(1);
    metrics::histogram!("command_duration_seconds", "type" => command_type)
        .record(started.elapsed().as_secs_f64());
    result
}
