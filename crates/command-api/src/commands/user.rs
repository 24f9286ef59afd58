//! User commands.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::envelope::AuctionCommand;
use crate::result_code::ResultCode;
use crate::validation::{self, ValidationError};

/// Registers a new user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub user_name: String,
    pub password: String,
    pub email: String,
}

impl RegisterUser {
    pub fn new(
        user_name: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            password: password.into(),
            email: email.into(),
        }
    }
}

impl std::fmt::Debug for RegisterUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterUser")
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl AuctionCommand for RegisterUser {
    const TYPE: &'static str = "RegisterUser";
    const RESULT_CODES: &'static [ResultCode] = &[
        ResultCode::UserSuccessfullyRegistered,
        ResultCode::DuplicateUsernameEmailCombination,
        ResultCode::DuplicateUsername,
        ResultCode::DuplicateEmail,
    ];
    const CREATES_AGGREGATE: bool = true;

    fn validate(&self) -> Result<(), ValidationError> {
        validation::user_name("userName", &self.user_name)?;
        validation::password("password", &self.password)?;
        validation::email("email", &self.email)
    }
}

/// Changes the password of an existing user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeUserPassword {
    pub user_id: Uuid,
    pub old_password: String,
    pub new_password: String,
}

impl ChangeUserPassword {
    pub fn new(
        user_id: Uuid,
        old_password: impl Into<String>,
        new_password: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            old_password: old_password.into(),
            new_password: new_password.into(),
        }
    }
}

impl std::fmt::Debug for ChangeUserPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeUserPassword")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl AuctionCommand for ChangeUserPassword {
    const TYPE: &'static str = "ChangeUserPassword";
    const RESULT_CODES: &'static [ResultCode] = &[
        ResultCode::PasswordSuccessfullyChanged,
        ResultCode::PasswordWrong,
        ResultCode::IdNotFound,
    ];

    fn validate(&self) -> Result<(), ValidationError> {
        validation::password("oldPassword", &self.old_password)?;
        validation::password("newPassword", &self.new_password)
    }
}

/// Confirms a user's email address with the token sent at registration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyUserEmail {
    pub user_id: Uuid,
    pub token: String,
}

impl VerifyUserEmail {
    pub fn new(user_id: Uuid, token: impl Into<String>) -> Self {
        Self {
            user_id,
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for VerifyUserEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyUserEmail")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl AuctionCommand for VerifyUserEmail {
    const TYPE: &'static str = "VerifyUserEmail";
    const RESULT_CODES: &'static [ResultCode] = &[
        ResultCode::UserEmailVerified,
        ResultCode::UserEmailVerificationFailed,
        ResultCode::IllegalUserState,
        ResultCode::IdNotFound,
    ];

    fn validate(&self) -> Result<(), ValidationError> {
        validation::token("token", &self.token)
    }
}
