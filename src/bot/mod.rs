//! Telegram side of chatvault: keeps the users feature current and re-keys
//! every feature when a group becomes a supergroup.

mod dispatcher;
mod runtime;
mod webhook;

pub use runtime::run;
