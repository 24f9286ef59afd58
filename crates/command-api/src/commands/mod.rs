//! Typed commands accepted by the command server.

mod category;
mod server;
mod user;

pub use category::{CreateCategory, DeleteCategory, MarkCategoryForDeletion};
pub use server::GetServerInfo;
pub use user::{ChangeUserPassword, RegisterUser, VerifyUserEmail};
