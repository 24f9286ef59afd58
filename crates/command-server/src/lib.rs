//! Command side of the auction system.
//!
//! A [`CommandService`] validates incoming envelopes, runs them through the
//! [`CommandRouter`] on the [`AuctionCommandHandler`] and checks each result
//! against the command's declared outcomes. Stored events flow to the read
//! side through the [`MessageProducer`].

pub mod handler;
pub mod mailer;
pub mod producer;
pub mod router;
pub mod service;

pub use handler::{AuctionCommandHandler, HandlerBuilder, SERVER_NAME};
pub use mailer::{VerificationMail, VerificationMailer};
pub use producer::{MessageProducer, TranslateError};
pub use router::{CommandFuture, CommandRouter, PreparedCommand};
pub use service::{CommandService, DEFAULT_COMMAND_TIMEOUT};
