//! Provider connectors (Slack and Twilio).
//!
//! The relay core talks to providers only through the [`ChatPlatform`] and
//! [`SmsGateway`] traits so it can be exercised with in-memory fakes.

mod handle;
mod inbound;
mod slack;
mod twilio;

pub use handle::{ChannelError, ChatPlatform, SmsGateway};
pub use inbound::{HistoryRecord, InboundSmsEvent, ThreadReply, BOT_MESSAGE_SUBTYPE};
pub use slack::SlackClient;
pub use twilio::TwilioClient;
