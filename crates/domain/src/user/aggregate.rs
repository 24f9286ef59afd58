//! User aggregate implementation.

use common::AggregateId;
use event_store::Version;
use uuid::Uuid;

use crate::aggregate::Aggregate;

use super::{
    EmailAddress, Password, PasswordSha512, SecurityToken, UserError, UserEvent, UserName,
    UserState,
};

/// User aggregate root.
///
/// A registered auction participant. Created in `New`, becomes `Active`
/// once the email address has been verified with the issued token.
#[derive(Debug, Clone, Default)]
pub struct User {
    id: Option<Uuid>,
    version: Version,
    user_name: Option<UserName>,
    email: Option<EmailAddress>,
    password_hash: Option<PasswordSha512>,
    verification_token: Option<SecurityToken>,
    state: UserState,
}

impl Aggregate for User {
    type Event = UserEvent;
    type Error = UserError;

    fn aggregate_type() -> &'static str {
        "User"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id.map(AggregateId::from_uuid)
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            UserEvent::UserCreated(data) => {
                self.id = Some(data.user_id);
                self.user_name = Some(data.user_name);
                self.email = Some(data.email);
                self.password_hash = Some(data.password_hash);
                self.verification_token = Some(data.verification_token);
                self.state = UserState::New;
            }
            UserEvent::UserPasswordChanged(data) => {
                self.password_hash = Some(data.new_password_hash);
            }
            UserEvent::UserEmailVerified(_) => {
                self.state = UserState::Active;
            }
        }
    }
}

// Query methods
impl User {
    pub fn user_id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn user_name(&self) -> Option<&UserName> {
        self.user_name.as_ref()
    }

    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    pub fn password_hash(&self) -> Option<&PasswordSha512> {
        self.password_hash.as_ref()
    }

    pub fn verification_token(&self) -> Option<&SecurityToken> {
        self.verification_token.as_ref()
    }

    pub fn state(&self) -> UserState {
        self.state
    }
}

// Command methods (return the event to apply)
impl User {
    /// Registers a new user with a hashed password and a fresh verification token.
    pub fn create(
        &self,
        user_id: Uuid,
        user_name: UserName,
        password: &Password,
        email: EmailAddress,
    ) -> Result<UserEvent, UserError> {
        if self.id.is_some() {
            return Err(UserError::AlreadyCreated);
        }

        Ok(UserEvent::user_created(
            user_id,
            user_name,
            email,
            password.hash(),
            SecurityToken::generate(),
        ))
    }

    /// Replaces the password after checking the old one.
    pub fn change_password(
        &self,
        old_password: &Password,
        new_password: &Password,
    ) -> Result<UserEvent, UserError> {
        let Some(current) = &self.password_hash else {
            return Err(UserError::PasswordMismatch);
        };
        if !current.matches(old_password) {
            return Err(UserError::PasswordMismatch);
        }

        Ok(UserEvent::password_changed(
            current.clone(),
            new_password.hash(),
        ))
    }

    /// Verifies the email address with the token issued at registration.
    pub fn verify_email(&self, token: &SecurityToken) -> Result<UserEvent, UserError> {
        if !self.state.can_verify_email() {
            return Err(UserError::IllegalUserState {
                actual: self.state,
                allowed: UserState::VERIFIABLE,
            });
        }
        if self.verification_token.as_ref() != Some(token) {
            return Err(UserError::SecurityTokenMismatch);
        }

        Ok(UserEvent::email_verified())
    }
}
