//! Command-side contract of the auction system.
//!
//! Defines what clients send (typed commands and their wire envelope) and
//! what they get back (a [`CommandResult`] carrying a registered
//! [`ResultCode`]).

pub mod commands;
pub mod envelope;
pub mod result;
pub mod result_code;
pub mod validation;

pub use commands::{
    ChangeUserPassword, CreateCategory, DeleteCategory, GetServerInfo, MarkCategoryForDeletion,
    RegisterUser, VerifyUserEmail,
};
pub use envelope::{AuctionCommand, CommandEnvelope};
pub use result::{CommandResult, InvalidResult, MessageKeyValue, ServerInfo};
pub use result_code::{ResultCode, ResultKind};
pub use validation::ValidationError;
