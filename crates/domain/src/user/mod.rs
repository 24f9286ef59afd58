//! User aggregate and related types.

mod aggregate;
mod events;
mod state;
mod value_objects;

pub use aggregate::User;
pub use events::{UserCreatedData, UserEmailVerifiedData, UserEvent, UserPasswordChangedData};
pub use state::UserState;
pub use value_objects::{EmailAddress, Password, PasswordSha512, SecurityToken, UserName};

use thiserror::Error;

/// Errors returned by user transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("User already created")]
    AlreadyCreated,

    /// The supplied old password does not match the stored hash.
    #[error("Password mismatch")]
    PasswordMismatch,

    #[error("Illegal user state {actual}, allowed: {allowed:?}")]
    IllegalUserState {
        actual: UserState,
        allowed: &'static [UserState],
    },

    /// The verification token does not match the one issued at registration.
    #[error("Security token mismatch")]
    SecurityTokenMismatch,
}
