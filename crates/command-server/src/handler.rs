//! Executes typed commands against the aggregates.

use std::sync::Arc;

use chrono::Utc;
use command_api::{
    ChangeUserPassword, CommandResult, CreateCategory, DeleteCategory, GetServerInfo,
    MarkCategoryForDeletion, RegisterUser, ResultCode, ServerInfo, VerifyUserEmail,
};
use common::AggregateId;
use domain::{
    Category, CategoryError, CategoryName, Committed, ConstraintError, ConstraintSet,
    DEFAULT_MAX_RETRIES, DomainError, EmailAddress, EventPublisher, IdSequence,
    InMemoryConstraintSet, InMemoryIdSequence, NoopPublisher, Password, Repository,
    SecurityToken, User, UserError, UserName,
};
use event_store::EventStore;
use uuid::Uuid;

/// Name reported by `GetServerInfo`.
pub const SERVER_NAME: &str = "auction-command-server";

/// Handles every auction command.
///
/// Business failures come back as `Ok` results with the matching code.
/// `Err` means the command could not be completed for reasons the caller
/// cannot act on.
pub struct AuctionCommandHandler<S>
where
    S: EventStore + Clone,
{
    users: Repository<S, User>,
    categories: Repository<S, Category>,
    user_constraints: Arc<dyn ConstraintSet>,
    category_constraints: Arc<dyn ConstraintSet>,
    category_ids: Arc<dyn IdSequence>,
    server_info: ServerInfo,
}

/// Assembles an [`AuctionCommandHandler`]. Unset parts default to their
/// in-memory variants.
pub struct HandlerBuilder<S> {
    store: S,
    publisher: Arc<dyn EventPublisher>,
    user_constraints: Option<Arc<dyn ConstraintSet>>,
    category_constraints: Option<Arc<dyn ConstraintSet>>,
    category_ids: Option<Arc<dyn IdSequence>>,
    max_retries: usize,
    server_info: Option<ServerInfo>,
}

impl<S> HandlerBuilder<S>
where
    S: EventStore + Clone,
{
    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn user_constraints(mut self, constraints: Arc<dyn ConstraintSet>) -> Self {
        self.user_constraints = Some(constraints);
        self
    }

    pub fn category_constraints(mut self, constraints: Arc<dyn ConstraintSet>) -> Self {
        self.category_constraints = Some(constraints);
        self
    }

    pub fn category_ids(mut self, ids: Arc<dyn IdSequence>) -> Self {
        self.category_ids = Some(ids);
        self
    }

    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn server_info(mut self, info: ServerInfo) -> Self {
        self.server_info = Some(info);
        self
    }

    pub fn build(self) -> AuctionCommandHandler<S> {
        AuctionCommandHandler {
            users: Repository::new(self.store.clone(), self.publisher.clone())
                .with_max_retries(self.max_retries),
            categories: Repository::new(self.store, self.publisher)
                .with_max_retries(self.max_retries),
            user_constraints: self
                .user_constraints
                .unwrap_or_else(|| Arc::new(InMemoryConstraintSet::new())),
            category_constraints: self
                .category_constraints
                .unwrap_or_else(|| Arc::new(InMemoryConstraintSet::new())),
            category_ids: self
                .category_ids
                .unwrap_or_else(|| Arc::new(InMemoryIdSequence::new())),
            server_info: self.server_info.unwrap_or_else(|| ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                started_at: Utc::now(),
            }),
        }
    }
}

impl<S> AuctionCommandHandler<S>
where
    S: EventStore + Clone,
{
    pub fn builder(store: S) -> HandlerBuilder<S> {
        HandlerBuilder {
            store,
            publisher: Arc::new(NoopPublisher),
            user_constraints: None,
            category_constraints: None,
            category_ids: None,
            max_retries: DEFAULT_MAX_RETRIES,
            server_info: None,
        }
    }

    pub fn users(&self) -> &Repository<S, User> {
        &self.users
    }

    pub fn categories(&self) -> &Repository<S, Category> {
        &self.categories
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    #[tracing::instrument(skip(self), fields(command_type = "RegisterUser"))]
    pub async fn register_user(&self, command: RegisterUser) -> Result<CommandResult, DomainError> {
        let duplicate = match self
            .user_constraints
            .add(&command.user_name, Some(&command.email))
            .await
        {
            Ok(()) => None,
            Err(ConstraintError::CombinationAlreadyExists { .. }) => {
                Some(ResultCode::DuplicateUsernameEmailCombination)
            }
            Err(ConstraintError::IdentityAlreadyExists(_)) => Some(ResultCode::DuplicateUsername),
            Err(ConstraintError::SecondaryAlreadyExists(_)) => Some(ResultCode::DuplicateEmail),
            Err(e @ ConstraintError::Storage(_)) => return Err(e.into()),
        };
        if let Some(code) = duplicate {
            return Ok(CommandResult::of(code));
        }

        let user_id = Uuid::new_v4();
        let user_name = UserName::new(command.user_name.as_str());
        let email = EmailAddress::new(command.email);
        let password = Password::new(command.password);

        let created = self
            .users
            .create(AggregateId::from_uuid(user_id), |user| {
                user.create(user_id, user_name, &password, email)
            })
            .await;
        if let Err(e) = created {
            release(self.user_constraints.as_ref(), &command.user_name).await;
            return Err(e);
        }

        tracing::info!(%user_id, "user registered");
        Ok(CommandResult::of(ResultCode::UserSuccessfullyRegistered).with_aggregate_id(user_id))
    }

    #[tracing::instrument(skip(self), fields(command_type = "ChangeUserPassword"))]
    pub async fn change_user_password(
        &self,
        command: ChangeUserPassword,
    ) -> Result<CommandResult, DomainError> {
        let old_password = Password::new(command.old_password);
        let new_password = Password::new(command.new_password);

        let outcome = self
            .users
            .execute(AggregateId::from_uuid(command.user_id), |user| {
                user.change_password(&old_password, &new_password)
            })
            .await;
        user_outcome(outcome, ResultCode::PasswordSuccessfullyChanged)
    }

    #[tracing::instrument(skip(self), fields(command_type = "VerifyUserEmail"))]
    pub async fn verify_user_email(
        &self,
        command: VerifyUserEmail,
    ) -> Result<CommandResult, DomainError> {
        let token = SecurityToken::new(command.token);

        let outcome = self
            .users
            .execute(AggregateId::from_uuid(command.user_id), |user| {
                user.verify_email(&token)
            })
            .await;
        user_outcome(outcome, ResultCode::UserEmailVerified)
    }

    #[tracing::instrument(skip(self), fields(command_type = "CreateCategory"))]
    pub async fn create_category(
        &self,
        command: CreateCategory,
    ) -> Result<CommandResult, DomainError> {
        let name = CategoryName::new(&command.name);

        match self.category_constraints.add(name.as_str(), None).await {
            Ok(()) => {}
            Err(
                ConstraintError::CombinationAlreadyExists { .. }
                | ConstraintError::IdentityAlreadyExists(_),
            ) => return Ok(CommandResult::of(ResultCode::CategoryAlreadyExists)),
            Err(e @ (ConstraintError::SecondaryAlreadyExists(_) | ConstraintError::Storage(_))) => {
                return Err(e.into());
            }
        }

        let created = match self.category_ids.next_id().await {
            Ok(category_id) => self
                .categories
                .create(AggregateId::from_long(category_id), |category| {
                    category.create(category_id, name.clone())
                })
                .await
                .map(|_| category_id),
            Err(e) => Err(e.into()),
        };

        match created {
            Ok(category_id) => {
                tracing::info!(category_id, "category created");
                Ok(CommandResult::of(ResultCode::CategorySuccessfullyCreated)
                    .with_aggregate_id(category_id))
            }
            Err(e) => {
                release(self.category_constraints.as_ref(), name.as_str()).await;
                Err(e)
            }
        }
    }

    #[tracing::instrument(skip(self), fields(command_type = "MarkCategoryForDeletion"))]
    pub async fn mark_category_for_deletion(
        &self,
        command: MarkCategoryForDeletion,
    ) -> Result<CommandResult, DomainError> {
        let outcome = self
            .categories
            .execute(AggregateId::from_long(command.category_id), |category| {
                category.mark_for_deletion()
            })
            .await;

        match outcome {
            Ok(_) => Ok(CommandResult::of(
                ResultCode::CategorySuccessfullyMarkedForDeletion,
            )),
            Err(e) => category_failure(e, ResultCode::CategoryToMarkNotActive),
        }
    }

    #[tracing::instrument(skip(self), fields(command_type = "DeleteCategory"))]
    pub async fn delete_category(
        &self,
        command: DeleteCategory,
    ) -> Result<CommandResult, DomainError> {
        let outcome = self
            .categories
            .execute(AggregateId::from_long(command.category_id), |category| {
                category.delete()
            })
            .await;

        match outcome {
            Ok(committed) => {
                // The deletion is stored; a failed release only keeps the name blocked.
                if let Some(name) = committed.aggregate.name() {
                    release(self.category_constraints.as_ref(), name.as_str()).await;
                }
                Ok(CommandResult::of(ResultCode::CategorySuccessfullyDeleted))
            }
            Err(e) => category_failure(e, ResultCode::CategoryToDeleteNotMarked),
        }
    }

    #[tracing::instrument(skip(self), fields(command_type = "GetServerInfo"))]
    pub async fn get_server_info(
        &self,
        _command: GetServerInfo,
    ) -> Result<CommandResult, DomainError> {
        Ok(CommandResult::of(ResultCode::ServerInfo).with_server_info(self.server_info.clone()))
    }
}

/// Removes a constraint entry, logging rather than failing.
async fn release(constraints: &dyn ConstraintSet, identity: &str) {
    if let Err(error) = constraints.remove(identity).await {
        tracing::error!(%error, identity, "failed to release uniqueness constraint");
    }
}

fn user_outcome(
    outcome: Result<Committed<User>, DomainError>,
    success: ResultCode,
) -> Result<CommandResult, DomainError> {
    let code = match outcome {
        Ok(_) => success,
        Err(DomainError::AggregateNotFound { .. }) => ResultCode::IdNotFound,
        Err(DomainError::User(error)) => match error {
            UserError::PasswordMismatch => ResultCode::PasswordWrong,
            UserError::SecurityTokenMismatch => ResultCode::UserEmailVerificationFailed,
            UserError::IllegalUserState { .. } => ResultCode::IllegalUserState,
            UserError::AlreadyCreated => return Err(DomainError::User(error)),
        },
        Err(e) => return Err(e),
    };
    Ok(CommandResult::of(code))
}

fn category_failure(
    error: DomainError,
    illegal_state: ResultCode,
) -> Result<CommandResult, DomainError> {
    match error {
        DomainError::AggregateNotFound { .. } => Ok(CommandResult::of(ResultCode::IdNotFound)),
        DomainError::Category(CategoryError::IllegalCategoryState { .. }) => {
            Ok(CommandResult::of(illegal_state))
        }
        other => Err(other),
    }
}
