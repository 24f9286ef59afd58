//! Domain layer of the auction command side.
//!
//! This crate provides:
//! - the `Aggregate` and `DomainEvent` traits and a versioned `Repository`
//! - the `User` and `Category` aggregates with their state machines
//! - constraint sets guarding uniqueness of user names, emails and category names
//! - id sequences for numerically keyed aggregates
//! - the `EventPublisher` hook invoked after every successful append

pub mod aggregate;
pub mod category;
pub mod constraint;
pub mod error;
pub mod id_sequence;
pub mod publisher;
pub mod repository;
pub mod user;

pub use aggregate::{Aggregate, DomainEvent};
pub use category::{Category, CategoryError, CategoryEvent, CategoryName, CategoryState};
pub use constraint::{
    ConstraintError, ConstraintSet, InMemoryConstraintSet, PostgresConstraintSet,
};
pub use error::DomainError;
pub use id_sequence::{IdSequence, IdSequenceError, InMemoryIdSequence, PostgresIdSequence};
pub use publisher::{EventPublisher, FanOutPublisher, NoopPublisher};
pub use repository::{Committed, DEFAULT_MAX_RETRIES, Repository};
pub use user::{
    EmailAddress, Password, PasswordSha512, SecurityToken, User, UserError, UserEvent, UserName,
    UserState,
};
