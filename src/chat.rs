//! The chat side of the relay: channels, outbound messages, and the networks
//! that carry them.
//!
//! The relay never owns a real chat connection. Anything that can report its
//! joined channels and accept queued messages can be a [network::Network],
//! which is how the in-process transport and the tests plug in.
//!
//! See [message::send_message].

pub mod channel;
pub mod message;
pub mod network;
