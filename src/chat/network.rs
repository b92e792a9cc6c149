//! Live chat connections, looked up by name.

use super::{channel::ChannelName, message::OutboundMessage};
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// A single chat connection.
pub trait Network: Send + Sync {
    fn name(&self) -> &str;

    /// Channels currently joined on this connection, in sorted order.
    fn channels(&self) -> Vec<ChannelName>;

    /// Put a message on the outbound queue without waiting for it to be sent.
    fn queue_msg(&self, msg: OutboundMessage);
}

/// The set of known live connections.
pub trait Networks: Send + Sync {
    fn get_network(&self, name: &str) -> Option<Arc<dyn Network>>;
}

/// A network whose outbound queue is an in-process channel. Whatever holds
/// the receiving end is the actual connection.
pub struct LiveNetwork {
    name: String,
    channels: BTreeSet<ChannelName>,
    outbox: mpsc::UnboundedSender<OutboundMessage>,
}

impl LiveNetwork {
    pub fn new<I, C>(name: &str, channels: I) -> (Self, mpsc::UnboundedReceiver<OutboundMessage>)
    where
        I: IntoIterator<Item = C>,
        C: Into<ChannelName>,
    {
        let (outbox, rx) = mpsc::unbounded_channel();
        let net = LiveNetwork {
            name: name.to_owned(),
            channels: channels.into_iter().map(Into::into).collect(),
            outbox,
        };

        (net, rx)
    }
}

impl Network for LiveNetwork {
    fn name(&self) -> &str {
        &self.name
    }

    fn channels(&self) -> Vec<ChannelName> {
        self.channels.iter().cloned().collect()
    }

    fn queue_msg(&self, msg: OutboundMessage) {
        if let Err(e) = self.outbox.send(msg) {
            warn!("Dropped message for {} on {}: queue closed", e.0.target, self.name);
        }
    }
}

/// Drain a [LiveNetwork]'s queue, logging each message as it would go out on
/// the wire. Stands in for a real connection in the standalone binary.
pub async fn log_outbox(network: String, mut rx: mpsc::UnboundedReceiver<OutboundMessage>) {
    while let Some(msg) = rx.recv().await {
        info!(network = %network, "{}", msg);
    }
}

/// Networks keyed by their case-sensitive name.
#[derive(Default)]
pub struct NetworkSet(HashMap<String, Arc<dyn Network>>);

impl NetworkSet {
    pub fn insert(&mut self, net: Arc<dyn Network>) {
        self.0.insert(net.name().to_owned(), net);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Networks for NetworkSet {
    fn get_network(&self, name: &str) -> Option<Arc<dyn Network>> {
        self.0.get(name).cloned()
    }
}
