//! Send plain text notifications to a channel.

use super::{channel::ChannelName, network::Network};
use std::fmt;

/// How a message is delivered to a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Less intrusive; clients usually don't highlight or auto-reply to these.
    Notice,
    /// A normal visible message.
    Public,
}

impl DeliveryMode {
    /// Pick the mode from a channel's `use-notices` flag.
    pub fn from_use_notices(use_notices: bool) -> Self {
        if use_notices {
            DeliveryMode::Notice
        } else {
            DeliveryMode::Public
        }
    }

    /// The protocol command for this mode.
    pub fn command(&self) -> &'static str {
        match self {
            DeliveryMode::Notice => "NOTICE",
            DeliveryMode::Public => "PRIVMSG",
        }
    }
}

/// A message waiting on a network's outbound queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub target: ChannelName,
    pub text: String,
    pub mode: DeliveryMode,
}

/// Render in wire format, for example `PRIVMSG #ops :Card moved`.
impl fmt::Display for OutboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} :{}", self.mode.command(), self.target, self.text)
    }
}

/// Queue `text` for `channel`, as a notice if `use_notices` is set. Nothing is
/// awaited and failures are the transport's concern.
pub fn send_message(network: &dyn Network, channel: &ChannelName, text: &str, use_notices: bool) {
    network.queue_msg(OutboundMessage {
        target: channel.clone(),
        text: text.to_owned(),
        mode: DeliveryMode::from_use_notices(use_notices),
    });
}
