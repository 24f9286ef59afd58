//! Registry of command outcome codes.

use serde::{Deserialize, Serialize};

/// Category of an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultKind {
    Success,
    Warning,
    Error,
}

/// Every outcome a command can have.
///
/// Numbers are stable across releases; clients key localised messages on
/// [`ResultCode::code_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    InternalError,
    InvalidCommand,
    IdNotFound,
    ServerInfo,
    DuplicateUsernameEmailCombination,
    DuplicateUsername,
    DuplicateEmail,
    UserSuccessfullyRegistered,
    PasswordWrong,
    PasswordSuccessfullyChanged,
    UserEmailVerificationFailed,
    UserEmailVerified,
    CategoryAlreadyExists,
    CategorySuccessfullyCreated,
    CategorySuccessfullyMarkedForDeletion,
    CategoryToMarkNotActive,
    CategorySuccessfullyDeleted,
    IllegalUserState,
    CategoryToDeleteNotMarked,
}

impl ResultCode {
    pub const ALL: [ResultCode; 19] = [
        ResultCode::InternalError,
        ResultCode::InvalidCommand,
        ResultCode::IdNotFound,
        ResultCode::ServerInfo,
        ResultCode::DuplicateUsernameEmailCombination,
        ResultCode::DuplicateUsername,
        ResultCode::DuplicateEmail,
        ResultCode::UserSuccessfullyRegistered,
        ResultCode::PasswordWrong,
        ResultCode::PasswordSuccessfullyChanged,
        ResultCode::UserEmailVerificationFailed,
        ResultCode::UserEmailVerified,
        ResultCode::CategoryAlreadyExists,
        ResultCode::CategorySuccessfullyCreated,
        ResultCode::CategorySuccessfullyMarkedForDeletion,
        ResultCode::CategoryToMarkNotActive,
        ResultCode::CategorySuccessfullyDeleted,
        ResultCode::IllegalUserState,
        ResultCode::CategoryToDeleteNotMarked,
    ];

    /// Outcomes any command may have regardless of its declared codes.
    pub const ALWAYS_ALLOWED: [ResultCode; 2] =
        [ResultCode::InternalError, ResultCode::InvalidCommand];

    pub fn code(self) -> u32 {
        match self {
            ResultCode::InternalError => 1,
            ResultCode::InvalidCommand => 2,
            ResultCode::IdNotFound => 3,
            ResultCode::ServerInfo => 100,
            ResultCode::DuplicateUsernameEmailCombination => 101,
            ResultCode::DuplicateUsername => 102,
            ResultCode::DuplicateEmail => 103,
            ResultCode::UserSuccessfullyRegistered => 104,
            ResultCode::PasswordWrong => 105,
            ResultCode::PasswordSuccessfullyChanged => 106,
            ResultCode::UserEmailVerificationFailed => 108,
            ResultCode::UserEmailVerified => 109,
            ResultCode::CategoryAlreadyExists => 110,
            ResultCode::CategorySuccessfullyCreated => 113,
            ResultCode::CategorySuccessfullyMarkedForDeletion => 114,
            ResultCode::CategoryToMarkNotActive => 115,
            ResultCode::CategorySuccessfullyDeleted => 116,
            ResultCode::IllegalUserState => 117,
            ResultCode::CategoryToDeleteNotMarked => 118,
        }
    }

    pub fn kind(self) -> ResultKind {
        match self {
            ResultCode::ServerInfo
            | ResultCode::UserSuccessfullyRegistered
            | ResultCode::PasswordSuccessfullyChanged
            | ResultCode::UserEmailVerified
            | ResultCode::CategorySuccessfullyCreated
            | ResultCode::CategorySuccessfullyMarkedForDeletion
            | ResultCode::CategorySuccessfullyDeleted => ResultKind::Success,
            ResultCode::InternalError
            | ResultCode::InvalidCommand
            | ResultCode::IdNotFound
            | ResultCode::DuplicateUsernameEmailCombination
            | ResultCode::DuplicateUsername
            | ResultCode::DuplicateEmail
            | ResultCode::PasswordWrong
            | ResultCode::UserEmailVerificationFailed
            | ResultCode::CategoryAlreadyExists
            | ResultCode::CategoryToMarkNotActive
            | ResultCode::IllegalUserState
            | ResultCode::CategoryToDeleteNotMarked => ResultKind::Error,
        }
    }

    /// Default (English) text.
    pub fn text(self) -> &'static str {
        match self {
            ResultCode::InternalError => "Internal error",
            ResultCode::InvalidCommand => "Invalid command",
            ResultCode::IdNotFound => "Aggregate id not found",
            ResultCode::ServerInfo => "Server information",
            ResultCode::DuplicateUsernameEmailCombination => {
                "The combination of user name and email is already registered"
            }
            ResultCode::DuplicateUsername => "The name is already used by another user",
            ResultCode::DuplicateEmail => {
                "The email address is already registered with another user"
            }
            ResultCode::UserSuccessfullyRegistered => {
                "You registered successfully! A confirmation email has been sent to you"
            }
            ResultCode::PasswordWrong => "The old password is not equal to the stored password.",
            ResultCode::PasswordSuccessfullyChanged => "The password was successfully changed.",
            ResultCode::UserEmailVerificationFailed => {
                "The given token was not equal to the user's verification token."
            }
            ResultCode::UserEmailVerified => "Your email address was confirmed successfully",
            ResultCode::CategoryAlreadyExists => "Category name already exists",
            ResultCode::CategorySuccessfullyCreated => "The new category was created successfully",
            ResultCode::CategorySuccessfullyMarkedForDeletion => {
                "The category was successfully marked for deletion."
            }
            ResultCode::CategoryToMarkNotActive => "The category was not in an active state.",
            ResultCode::CategorySuccessfullyDeleted => "The category was successfully deleted.",
            ResultCode::IllegalUserState => "The state of the user was not NEW or RESET.",
            ResultCode::CategoryToDeleteNotMarked => "The category is not marked for deletion.",
        }
    }

    /// Constant-style name, e.g. `DUPLICATE_EMAIL`.
    pub fn name(self) -> &'static str {
        match self {
            ResultCode::InternalError => "INTERNAL_ERROR",
            ResultCode::InvalidCommand => "INVALID_COMMAND",
            ResultCode::IdNotFound => "ID_NOT_FOUND",
            ResultCode::ServerInfo => "SERVER_INFO",
            ResultCode::DuplicateUsernameEmailCombination => "DUPLICATE_USERNAME_EMAIL_COMBINATION",
            ResultCode::DuplicateUsername => "DUPLICATE_USERNAME",
            ResultCode::DuplicateEmail => "DUPLICATE_EMAIL",
            ResultCode::UserSuccessfullyRegistered => "USER_SUCCESSFULLY_REGISTERED",
            ResultCode::PasswordWrong => "PASSWORD_WRONG",
            ResultCode::PasswordSuccessfullyChanged => "PASSWORD_SUCCESSFULLY_CHANGED",
            ResultCode::UserEmailVerificationFailed => "USER_EMAIL_VERIFICATION_FAILED",
            ResultCode::UserEmailVerified => "USER_EMAIL_VERIFIED",
            ResultCode::CategoryAlreadyExists => "CATEGORY_ALREADY_EXISTS",
            ResultCode::CategorySuccessfullyCreated => "CATEGORY_SUCCESSFULLY_CREATED",
            ResultCode::CategorySuccessfullyMarkedForDeletion => {
                "CATEGORY_SUCCESSFULLY_MARKED_FOR_DELETION"
            }
            ResultCode::CategoryToMarkNotActive => "CATEGORY_TO_MARK_NOT_ACTIVE",
            ResultCode::CategorySuccessfullyDeleted => "CATEGORY_SUCCESSFULLY_DELETED",
            ResultCode::IllegalUserState => "ILLEGAL_USER_STATE",
            ResultCode::CategoryToDeleteNotMarked => "CATEGORY_TO_DELETE_NOT_MARKED",
        }
    }

    /// Zero-padded five digit code used as a message bundle key.
    pub fn code_str(self) -> String {
        format!("{:05}", self.code())
    }

    pub fn is_success(self) -> bool {
        self.kind() == ResultKind::Success
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|rc| rc.code() == code)
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}
