//! Wire form of a command and the trait typed commands implement.

use std::fmt::Debug;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::result_code::ResultCode;
use crate::validation::ValidationError;

/// A typed command.
pub trait AuctionCommand: Serialize + DeserializeOwned + Debug + Send + Sync + 'static {
    /// Type tag used on the wire and for routing.
    const TYPE: &'static str;

    /// Current version of the command's field layout.
    const VERSION: u32 = 1;

    /// Outcomes this command may produce besides the always-allowed ones.
    const RESULT_CODES: &'static [ResultCode];

    /// Whether success must carry the id of a newly created aggregate.
    const CREATES_AGGREGATE: bool = false;

    /// Checks every field against its rule.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// A command as it travels between client and server.
///
/// ```json
/// { "type": "RegisterUser", "version": 1, "fields": { "userName": "peter", ... } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    #[serde(rename = "type")]
    pub command_type: String,
    pub version: u32,
    #[serde(default)]
    pub fields: serde_json::Value,
}

impl CommandEnvelope {
    /// Wraps a typed command at its current version.
    pub fn wrap<C: AuctionCommand>(command: &C) -> Result<Self, serde_json::Error> {
        Ok(Self {
            command_type: C::TYPE.to_string(),
            version: C::VERSION,
            fields: serde_json::to_value(command)?,
        })
    }

    /// Decodes and validates the fields as `C`.
    ///
    /// Any version from 1 upwards is accepted: unknown fields are ignored
    /// and absent optional fields take their defaults. Version 0 is invalid.
    pub fn parse<C: AuctionCommand>(&self) -> Result<C, ValidationError> {
        if self.command_type != C::TYPE {
            return Err(ValidationError::UnknownType(self.command_type.clone()));
        }
        if self.version == 0 {
            return Err(ValidationError::UnsupportedVersion {
                command_type: self.command_type.clone(),
                version: self.version,
            });
        }

        let fields = match &self.fields {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            other => other.clone(),
        };
        let command: C =
            serde_json::from_value(fields).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        command.validate()?;
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::commands::{CreateCategory, GetServerInfo, RegisterUser};

    #[test]
    fn wrap_then_parse() {
        let command = RegisterUser::new("peter", "12345678", "peter@x.com");
        let envelope = CommandEnvelope::wrap(&command).unwrap();

        assert_eq!(envelope.command_type, "RegisterUser");
        assert_eq!(envelope.version, 1);
        assert_eq!(envelope.fields["userName"], "peter");

        let parsed: RegisterUser = envelope.parse().unwrap();
        assert_eq!(parsed, command);
    }

    #[test]
    fn other_versions_are_accepted() {
        let envelope: CommandEnvelope = serde_json::from_value(json!({
            "type": "CreateCategory",
            "version": 7,
            "fields": { "name": "Books", "addedLater": true }
        }))
        .unwrap();

        let parsed: CreateCategory = envelope.parse().unwrap();
        assert_eq!(parsed.name, "Books");
    }

    #[test]
    fn version_zero_is_rejected() {
        let envelope = CommandEnvelope {
            command_type: "GetServerInfo".to_string(),
            version: 0,
            fields: json!({}),
        };
        assert!(matches!(
            envelope.parse::<GetServerInfo>(),
            Err(ValidationError::UnsupportedVersion { version: 0, .. })
        ));
    }

    #[test]
    fn missing_fields_object_is_empty() {
        let envelope: CommandEnvelope =
            serde_json::from_value(json!({"type": "GetServerInfo", "version": 1})).unwrap();
        assert!(envelope.parse::<GetServerInfo>().is_ok());
    }

    #[test]
    fn malformed_and_invalid_fields() {
        let envelope: CommandEnvelope = serde_json::from_value(json!({
            "type": "RegisterUser",
            "version": 1,
            "fields": { "userName": "peter" }
        }))
        .unwrap();
        assert!(matches!(
            envelope.parse::<RegisterUser>(),
            Err(ValidationError::Malformed(_))
        ));

        let envelope = CommandEnvelope::wrap(&RegisterUser::new("peter", "12345678", "nope")).unwrap();
        assert!(matches!(
            envelope.parse::<RegisterUser>(),
            Err(ValidationError::Field { field: "email", .. })
        ));
    }

    #[test]
    fn type_mismatch() {
        let envelope = CommandEnvelope::wrap(&GetServerInfo::default()).unwrap();
        assert_eq!(
            envelope.parse::<CreateCategory>().unwrap_err(),
            ValidationError::UnknownType("GetServerInfo".to_string())
        );
    }
}
