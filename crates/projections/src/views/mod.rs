//! Read model views for the query side.

pub mod categories;
pub mod users;

pub use categories::{CategoriesView, CategoryRow};
pub use users::{UserRow, UsersView};
