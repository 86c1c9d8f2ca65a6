//! gigpulse Notify - deliver the daily brief over chat
//!
//! - [`split_message_parts`] cuts text to the channel's per-message limit
//! - [`Notifier`] sends the chunks in order with formatting fallback and retries
//! - [`TelegramChannel`] is the production [`ChatChannel`]

#![warn(unreachable_pub)]

pub mod channel;
pub mod chunk;
pub mod error;
pub mod notifier;

pub use channel::{ChatChannel, ParseMode, TelegramChannel, TELEGRAM_API_BASE};
pub use chunk::{rejoin, split_message, split_message_parts, Chunk};
pub use error::{NotifyError, SendError};
pub use notifier::{DeliveryReport, Notifier, NotifierConfig};
