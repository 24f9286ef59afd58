//! Field rules applied to incoming commands.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

pub const USER_NAME_MIN: usize = 3;
pub const USER_NAME_MAX: usize = 20;
pub const PASSWORD_MIN: usize = 3;
pub const PASSWORD_MAX: usize = 50;
pub const EMAIL_MAX: usize = 320;
pub const TOKEN_MAX: usize = 128;
pub const CATEGORY_NAME_MAX: usize = 40;

/// Why a command was refused before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown command type '{0}'")]
    UnknownType(String),

    #[error("unsupported version {version} of {command_type}")]
    UnsupportedVersion { command_type: String, version: u32 },

    #[error("malformed fields: {0}")]
    Malformed(String),

    #[error("field '{field}' {reason}")]
    Field { field: &'static str, reason: String },
}

impl ValidationError {
    fn field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Field {
            field,
            reason: reason.into(),
        }
    }
}

static USER_NAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn user_name_regex() -> &'static Regex {
    USER_NAME_RE.get_or_init(|| {
        // Lower case only, so names differing in case cannot both register.
        // Length is enforced separately.
        Regex::new("^[a-z][a-z0-9_.-]*$")
            .unwrap_or_else(|error| panic!("user name regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let length = value.chars().count();
    if length < min {
        return Err(ValidationError::field(
            field,
            format!("must have at least {min} characters"),
        ));
    }
    if length > max {
        return Err(ValidationError::field(
            field,
            format!("must have at most {max} characters"),
        ));
    }
    Ok(())
}

pub fn user_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    check_length(field, value, USER_NAME_MIN, USER_NAME_MAX)?;
    if !user_name_regex().is_match(value) {
        return Err(ValidationError::field(
            field,
            "must start with a lower-case letter and contain only lower-case letters, digits, '_', '-' or '.'",
        ));
    }
    Ok(())
}

pub fn password(field: &'static str, value: &str) -> Result<(), ValidationError> {
    check_length(field, value, PASSWORD_MIN, PASSWORD_MAX)?;
    if value.chars().any(char::is_whitespace) {
        return Err(ValidationError::field(field, "must not contain whitespace"));
    }
    Ok(())
}

pub fn email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    check_length(field, value, 1, EMAIL_MAX)?;
    if !email_regex().is_match(value) {
        return Err(ValidationError::field(field, "is not an email address"));
    }
    Ok(())
}

pub fn token(field: &'static str, value: &str) -> Result<(), ValidationError> {
    check_length(field, value, 1, TOKEN_MAX)
}

pub fn category_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    check_length(field, value.trim(), 1, CATEGORY_NAME_MAX)
}

pub fn positive_id(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::field(field, "must be a positive number"));
    }
    Ok(())
}
