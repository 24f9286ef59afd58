//! Types shared between the command side and the query side.

pub mod messages;
pub mod types;

pub use messages::{
    AuctionMessage, CategoryCreatedMessage, CategoryDeletedMessage,
    CategoryMarkedForDeletionMessage, MessageEnvelope, UserCreatedMessage,
    UserEmailVerifiedMessage, UserPasswordChangedMessage,
};
pub use types::{AggregateId, ParseAggregateIdError};
