//! User state machine.

use serde::{Deserialize, Serialize};

/// The state of a user account.
///
/// State transitions:
/// ```text
/// New ──────────────► Active
///  │                    ▲
///  └──► Reset ──────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserState {
    /// Registered, email not yet verified.
    #[default]
    New,

    /// Email verified.
    Active,

    /// Password reset requested, email must be verified again.
    Reset,
}

impl UserState {
    /// States from which the email address can be verified.
    pub const VERIFIABLE: &'static [UserState] = &[UserState::New, UserState::Reset];

    /// Returns true if the email can be verified in this state.
    pub fn can_verify_email(&self) -> bool {
        Self::VERIFIABLE.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserState::New => "NEW",
            UserState::Active => "ACTIVE",
            UserState::Reset => "RESET",
        }
    }
}

impl std::fmt::Display for UserState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
