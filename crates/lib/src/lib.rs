//! SMS ⇄ chat relay: inbound SMS are announced in a chat channel, and threaded
//! replies to those announcements are texted back to the original sender.

pub mod channels;
pub mod config;
pub mod gateway;
pub mod relay;
