//! Match a webhook's board against every channel's subscriptions and forward
//! its message to those that match.
//!
//! Wekan's outgoing webhooks carry a lot of structured data, but the only
//! field we rely on is `text`, which holds the human readable description
//! followed by a link to the card or board on a second line:
//!
//! ```json
//! {
//!     "text": "alice moved \"Fix login\" from Doing to Done\nhttps://wekan.example.com/b/abc123/proj/xyz",
//!     "cardId": "xyz",
//!     "boardId": "abc123",
//!     "user": "alice",
//!     "description": "act-moveCard"
//! }
//! ```
//!
//! <https://github.com/wekan/wekan/wiki/Webhook-data>

use crate::{
    chat::{channel::ChannelName, message::send_message, network::Network},
    registry::{self, Boards, ConfigStore},
};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// The part of a Wekan webhook payload we care about. Anything else is
/// ignored.
#[derive(Debug, PartialEq, Deserialize)]
pub struct HookPayload {
    text: String,
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Payload isn't an object with a string `text` field: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("Expected `text` to hold a message and a board URL on two lines, found {parts} line(s)")]
    MalformedPayload { parts: usize },
}

impl HookPayload {
    /// Split `text` into the message and the board URL. Anything other than
    /// exactly two lines is rejected outright.
    pub fn split(&self) -> Result<(&str, &str), PayloadError> {
        let parts: Vec<&str> = self.text.split('\n').collect();

        match parts.as_slice() {
            [message, board_url] => Ok((*message, *board_url)),
            _ => Err(PayloadError::MalformedPayload { parts: parts.len() }),
        }
    }
}

/// A notification queued for a channel, because of its subscription `slug`.
#[derive(Debug, PartialEq, Eq)]
pub struct Delivery {
    pub channel: ChannelName,
    pub slug: String,
}

/// Validate a decoded payload and send its message to every channel on the
/// network subscribed to its board. Each channel receives it at most once.
///
/// Finding no subscribed channels isn't an error.
pub fn forward(
    store: &dyn ConfigStore,
    network: &dyn Network,
    payload: &serde_json::Value,
) -> Result<Vec<Delivery>, PayloadError> {
    let payload = HookPayload::deserialize(payload)?;
    let (message, board_url) = payload.split()?;

    debug!("Running on network {}", network.name());

    let mut deliveries = Vec::new();

    for channel in network.channels() {
        let boards = registry::load(store, &channel);

        if let Some(slug) = best_match(&boards, board_url) {
            send_message(network, &channel, message, store.use_notices(&channel));

            deliveries.push(Delivery {
                slug: slug.to_owned(),
                channel,
            });
        }
    }

    Ok(deliveries)
}

/// Find the subscription whose URL is a prefix of `board_url`. When several
/// are, the longest URL wins, then the smallest slug.
///
/// Matching is a raw, case-sensitive string comparison so that subscribing to
/// a board also covers its cards.
pub fn best_match<'a>(boards: &'a Boards, board_url: &str) -> Option<&'a str> {
    boards
        .iter()
        .filter(|(_, url)| board_url.starts_with(url.as_str()))
        .max_by(|(slug_a, url_a), (slug_b, url_b)| {
            url_a.len().cmp(&url_b.len()).then_with(|| slug_b.cmp(slug_a))
        })
        .map(|(slug, _)| slug.as_str())
}
