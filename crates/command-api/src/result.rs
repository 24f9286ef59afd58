//! The outcome returned for every command.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::result_code::{ResultCode, ResultKind};

/// A localisation parameter attached to a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageKeyValue {
    pub key: String,
    pub value: String,
}

/// Identification of the running command server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub started_at: DateTime<Utc>,
}

/// Result of a command.
///
/// Built from a [`ResultCode`], so the success flag and text always agree
/// with the registry unless deserialized from an untrusted source; use
/// [`CommandResult::validate`] to check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub success: bool,
    pub code: u32,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_values: Vec<MessageKeyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_info: Option<ServerInfo>,
}

/// Ways a result can break the contract between server and client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidResult {
    #[error("unknown result code {0}")]
    UnknownCode(u32),

    #[error("success flag {success} contradicts {code}")]
    SuccessFlagMismatch { code: ResultCode, success: bool },

    #[error("text of {code} differs from the registered text")]
    TextMismatch { code: ResultCode },

    #[error("{code} is not a declared outcome of {command_type}")]
    UndeclaredCode {
        code: ResultCode,
        command_type: String,
    },

    #[error("successful {command_type} did not return an aggregate id")]
    MissingAggregateId { command_type: String },
}

impl CommandResult {
    pub fn of(code: ResultCode) -> Self {
        Self {
            success: code.is_success(),
            code: code.code(),
            text: code.text().to_string(),
            aggregate_id: None,
            key_values: Vec::new(),
            server_info: None,
        }
    }

    pub fn internal_error() -> Self {
        Self::of(ResultCode::InternalError)
    }

    /// An `INVALID_COMMAND` result carrying the reason as a key/value pair.
    pub fn invalid_command(reason: impl Into<String>) -> Self {
        Self::of(ResultCode::InvalidCommand).with_key_value("reason", reason)
    }

    pub fn with_aggregate_id(mut self, id: impl ToString) -> Self {
        self.aggregate_id = Some(id.to_string());
        self
    }

    pub fn with_key_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.key_values.push(MessageKeyValue {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_server_info(mut self, info: ServerInfo) -> Self {
        self.server_info = Some(info);
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Resolves the numeric code, if it is registered.
    pub fn result_code(&self) -> Option<ResultCode> {
        ResultCode::from_code(self.code)
    }

    pub fn kind(&self) -> Option<ResultKind> {
        self.result_code().map(ResultCode::kind)
    }

    /// Checks the result against the registry and the command's contract.
    ///
    /// `declared` lists the outcomes the command may produce besides
    /// [`ResultCode::ALWAYS_ALLOWED`]; `creates_aggregate` demands an id on
    /// success.
    pub fn validate(
        &self,
        command_type: &str,
        declared: &[ResultCode],
        creates_aggregate: bool,
    ) -> Result<(), InvalidResult> {
        let code = self
            .result_code()
            .ok_or(InvalidResult::UnknownCode(self.code))?;

        if self.success != code.is_success() {
            return Err(InvalidResult::SuccessFlagMismatch {
                code,
                success: self.success,
            });
        }
        if self.text != code.text() {
            return Err(InvalidResult::TextMismatch { code });
        }
        if !declared.contains(&code) && !ResultCode::ALWAYS_ALLOWED.contains(&code) {
            return Err(InvalidResult::UndeclaredCode {
                code,
                command_type: command_type.to_string(),
            });
        }
        if creates_aggregate && self.success && self.aggregate_id.is_none() {
            return Err(InvalidResult::MissingAggregateId {
                command_type: command_type.to_string(),
            });
        }
        Ok(())
    }
}

impl From<ResultCode> for CommandResult {
    fn from(code: ResultCode) -> Self {
        Self::of(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_flag_follows_registry_for_every_code() {
        for code in ResultCode::ALL {
            let result = CommandResult::of(code);
            assert_eq!(result.is_success(), code.kind() == ResultKind::Success);
            assert_eq!(result.result_code(), Some(code));
        }
    }

    #[test]
    fn wire_shape_is_camel_case_and_sparse() {
        let result = CommandResult::of(ResultCode::UserSuccessfullyRegistered)
            .with_aggregate_id("3f2b5c1e-0000-0000-0000-000000000000");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["code"], 104);
        assert_eq!(json["aggregateId"], "3f2b5c1e-0000-0000-0000-000000000000");
        assert!(json.get("keyValues").is_none());
        assert!(json.get("serverInfo").is_none());
    }

    #[test]
    fn invalid_command_carries_reason() {
        let result = CommandResult::invalid_command("field 'email' is too long");
        assert_eq!(result.code, 2);
        assert_eq!(result.key_values[0].key, "reason");
        assert!(result.validate("RegisterUser", &[], false).is_ok());
    }

    #[test]
    fn validate_rejects_broken_results() {
        let declared = [ResultCode::UserSuccessfullyRegistered];

        let mut unknown = CommandResult::of(ResultCode::InternalError);
        unknown.code = 999;
        assert_eq!(
            unknown.validate("RegisterUser", &declared, true),
            Err(InvalidResult::UnknownCode(999))
        );

        let mut flipped = CommandResult::of(ResultCode::PasswordWrong);
        flipped.success = true;
        assert!(matches!(
            flipped.validate("ChangeUserPassword", &[ResultCode::PasswordWrong], false),
            Err(InvalidResult::SuccessFlagMismatch { .. })
        ));

        let mut retexted = CommandResult::of(ResultCode::UserSuccessfullyRegistered);
        retexted.text = "hello".to_string();
        assert!(matches!(
            retexted.validate("RegisterUser", &declared, false),
            Err(InvalidResult::TextMismatch { .. })
        ));

        let undeclared = CommandResult::of(ResultCode::CategoryAlreadyExists);
        assert!(matches!(
            undeclared.validate("RegisterUser", &declared, true),
            Err(InvalidResult::UndeclaredCode { .. })
        ));

        let without_id = CommandResult::of(ResultCode::UserSuccessfullyRegistered);
        assert!(matches!(
            without_id.validate("RegisterUser", &declared, true),
            Err(InvalidResult::MissingAggregateId { .. })
        ));
    }
}
