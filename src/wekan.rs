//! Receive outgoing webhooks from Wekan and relay them to subscribed channels.

pub mod error;
pub mod router;
mod webhook;
