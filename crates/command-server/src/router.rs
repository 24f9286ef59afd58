//! Routing table from command type tags to handler functions.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use command_api::{
    AuctionCommand, ChangeUserPassword, CommandEnvelope, CommandResult, CreateCategory,
    DeleteCategory, GetServerInfo, MarkCategoryForDeletion, RegisterUser, ResultCode,
    ValidationError, VerifyUserEmail,
};
use domain::DomainError;
use event_store::EventStore;

use crate::handler::AuctionCommandHandler;

pub type CommandFuture = Pin<Box<dyn Future<Output = Result<CommandResult, DomainError>> + Send>>;

type Route<S> = Arc<
    dyn Fn(Arc<AuctionCommandHandler<S>>, &CommandEnvelope) -> Result<PreparedCommand, ValidationError>
        + Send
        + Sync,
>;

/// A validated command bound to its handler, ready to run.
pub struct PreparedCommand {
    pub command_type: &'static str,
    pub result_codes: &'static [ResultCode],
    pub creates_aggregate: bool,

    /// `Debug` rendering of the command. Secrets are omitted.
    pub trace: String,
    pub future: CommandFuture,
}

pub struct CommandRouter<S>
where
    S: EventStore + Clone,
{
    handler: Arc<AuctionCommandHandler<S>>,
    routes: HashMap<&'static str, Route<S>>,
}

impl<S> CommandRouter<S>
where
    S: EventStore + Clone + 'static,
{
    /// Creates a router with no routes.
    pub fn new(handler: Arc<AuctionCommandHandler<S>>) -> Self {
        Self {
            handler,
            routes: HashMap::new(),
        }
    }

    /// Creates a router with every auction command registered.
    pub fn auction(handler: Arc<AuctionCommandHandler<S>>) -> Self {
        Self::new(handler)
            .route::<RegisterUser, _, _>(|h, c| async move { h.register_user(c).await })
            .route::<ChangeUserPassword, _, _>(|h, c| async move {
                h.change_user_password(c).await
            })
            .route::<VerifyUserEmail, _, _>(|h, c| async move { h.verify_user_email(c).await })
            .route::<CreateCategory, _, _>(|h, c| async move { h.create_category(c).await })
            .route::<MarkCategoryForDeletion, _, _>(|h, c| async move {
                h.mark_category_for_deletion(c).await
            })
            .route::<DeleteCategory, _, _>(|h, c| async move { h.delete_category(c).await })
            .route::<GetServerInfo, _, _>(|h, c| async move { h.get_server_info(c).await })
    }

    /// Registers the handler function for `C`, replacing any earlier one.
    pub fn route<C, F, Fut>(mut self, f: F) -> Self
    where
        C: AuctionCommand,
        F: Fn(Arc<AuctionCommandHandler<S>>, C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<CommandResult, DomainError>> + Send + 'static,
    {
        let f = Arc::new(f);
        let route: Route<S> = Arc::new(move |handler, envelope| {
            let command: C = envelope.parse()?;
            if envelope.version != C::VERSION {
                tracing::debug!(
                    command_type = C::TYPE,
                    received = envelope.version,
                    current = C::VERSION,
                    "command version differs from current"
                );
            }

            let trace = format!("{command:?}");
            let f = Arc::clone(&f);
            Ok(PreparedCommand {
                command_type: C::TYPE,
                result_codes: C::RESULT_CODES,
                creates_aggregate: C::CREATES_AGGREGATE,
                trace,
                future: Box::pin(async move { f(handler, command).await }),
            })
        });
        self.routes.insert(C::TYPE, route);
        self
    }

    /// Validates an envelope and binds it to its handler.
    pub fn prepare(&self, envelope: &CommandEnvelope) -> Result<PreparedCommand, ValidationError> {
        let route = self
            .routes
            .get(envelope.command_type.as_str())
            .ok_or_else(|| ValidationError::UnknownType(envelope.command_type.clone()))?;
        route(Arc::clone(&self.handler), envelope)
    }

    pub fn handles(&self, command_type: &str) -> bool {
        self.routes.contains_key(command_type)
    }

    pub fn handler(&self) -> &Arc<AuctionCommandHandler<S>> {
        &self.handler
    }
}

#[cfg(test)]
mod tests {
    use event_store::InMemoryEventStore;
    use serde_json::json;

    use super::*;

    fn router() -> CommandRouter<InMemoryEventStore> {
        let handler = AuctionCommandHandler::builder(InMemoryEventStore::new()).build();
        CommandRouter::auction(Arc::new(handler))
    }

    #[test]
    fn every_command_type_is_routed() {
        let router = router();
        for command_type in [
            RegisterUser::TYPE,
            ChangeUserPassword::TYPE,
            VerifyUserEmail::TYPE,
            CreateCategory::TYPE,
            MarkCategoryForDeletion::TYPE,
            DeleteCategory::TYPE,
            GetServerInfo::TYPE,
        ] {
            assert!(router.handles(command_type), "{command_type} is not routed");
        }
        assert!(!router.handles("PlaceBid"));
    }

    #[tokio::test]
    async fn prepared_command_runs_its_handler() {
        let router = router();
        let envelope = CommandEnvelope::wrap(&CreateCategory::new("Books")).unwrap();

        let prepared = router.prepare(&envelope).unwrap();
        assert_eq!(prepared.command_type, "CreateCategory");
        assert!(prepared.creates_aggregate);

        let result = prepared.future.await.unwrap();
        assert_eq!(result.result_code(), Some(ResultCode::CategorySuccessfullyCreated));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let envelope: CommandEnvelope =
            serde_json::from_value(json!({"type": "PlaceBid", "version": 1, "fields": {}}))
                .unwrap();
        assert_eq!(
            router().prepare(&envelope).err(),
            Some(ValidationError::UnknownType("PlaceBid".to_string()))
        );
    }

    #[test]
    fn trace_omits_password() {
        let envelope =
            CommandEnvelope::wrap(&RegisterUser::new("peter", "s3cret!", "peter@x.com")).unwrap();
        let prepared = router().prepare(&envelope).unwrap();
        assert!(prepared.trace.contains("peter"));
        assert!(!prepared.trace.contains("s3cret!"));
    }
}
