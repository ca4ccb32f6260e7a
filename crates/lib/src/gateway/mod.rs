//! Gateway: webhook endpoints for the SMS provider and the chat platform.
//!
//! Both endpoints always answer 200. Relay failures are logged here and never
//! surfaced, since either provider would retry and duplicate the message.

mod server;
mod signature;

pub use server::{router, run_gateway, GatewayState, EMPTY_TWIML};
pub use signature::{verify_slack_signature, SIGNATURE_HEADER, TIMESTAMP_HEADER};
