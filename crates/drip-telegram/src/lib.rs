//! `drip-telegram` — the Telegram side of the bot.
//!
//! Two halves, both thin wrappers over teloxide:
//!
//! - [`transport::TelegramTransport`] implements the scheduler's
//!   `Transport` trait and owns all failure classification — the only
//!   place in the workspace that ever looks at a Telegram error payload.
//! - [`handler`] + [`adapter`] drive the inbound long-polling dispatcher
//!   and register recipients on `/start`.

pub mod adapter;
pub mod handler;
pub mod transport;

pub use adapter::run_dispatcher;
pub use handler::RegistrationContext;
pub use transport::TelegramTransport;
