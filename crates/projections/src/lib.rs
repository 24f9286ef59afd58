//! Read models for the query side.
//!
//! This crate provides the query side of the auction system:
//! - [`Projection`] trait for applying messages to read models
//! - [`ReadModel`] trait for query access to denormalized data
//! - [`MessageListener`] routing messages from the command side to projections
//! - Two read model views: users and categories

pub mod error;
pub mod listener;
pub mod projection;
pub mod read_model;
pub mod views;

pub use error::{ProjectionError, Result};
pub use listener::{Delivery, MessageListener};
pub use projection::{Projection, ProjectionPosition};
pub use read_model::ReadModel;
pub use views::{CategoriesView, CategoryRow, UserRow, UsersView};
