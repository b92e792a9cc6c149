//! Which boards each channel has subscribed to.
//!
//! A channel's subscriptions are a mapping from a local slug to the board's
//! URL. The whole mapping is read and written at once.

use crate::{chat::channel::ChannelName, config::ConfigError};
use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

/// Board slug to board URL, ordered by slug.
pub type Boards = BTreeMap<String, String>;

/// Per-channel settings, owned by whoever hosts the relay.
pub trait ConfigStore: Send + Sync {
    /// The channel's `boards` value, if it was ever set.
    fn boards(&self, channel: &ChannelName) -> Option<Boards>;

    /// Replace the channel's `boards` value.
    fn set_boards(&self, channel: &ChannelName, boards: Boards) -> Result<(), ConfigError>;

    /// The channel's `use-notices` flag.
    fn use_notices(&self, channel: &ChannelName) -> bool;
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("This board is already announced to this channel.")]
    DuplicateSlug(String),
    #[error("This board is not registered to this channel.")]
    UnknownSlug(String),
    #[error("Board slugs can't be empty or contain whitespace: {0:?}")]
    InvalidSlug(String),
    #[error("Not an HTTP URL: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Store(#[from] ConfigError),
}

pub fn load(store: &dyn ConfigStore, channel: &ChannelName) -> Boards {
    store.boards(channel).unwrap_or_default()
}

pub fn save(
    store: &dyn ConfigStore,
    channel: &ChannelName,
    boards: Boards,
) -> Result<(), RegistryError> {
    Ok(store.set_boards(channel, boards)?)
}

/// Subscribe `channel` to the board at `url` under `slug`.
///
/// The URL is kept exactly as given, since it's matched as a raw prefix.
pub fn add(
    store: &dyn ConfigStore,
    channel: &ChannelName,
    slug: &str,
    url: &str,
) -> Result<(), RegistryError> {
    validate_slug(slug)?;
    validate_url(url)?;

    let mut boards = load(store, channel);
    if boards.contains_key(slug) {
        return Err(RegistryError::DuplicateSlug(slug.to_owned()));
    }

    boards.insert(slug.to_owned(), url.to_owned());
    save(store, channel, boards)
}

pub fn remove(store: &dyn ConfigStore, channel: &ChannelName, slug: &str) -> Result<(), RegistryError> {
    let mut boards = load(store, channel);
    if boards.remove(slug).is_none() {
        return Err(RegistryError::UnknownSlug(slug.to_owned()));
    }

    save(store, channel, boards)
}

/// `(slug, url)` pairs ordered by slug.
pub fn list(store: &dyn ConfigStore, channel: &ChannelName) -> Vec<(String, String)> {
    load(store, channel).into_iter().collect()
}

fn validate_slug(slug: &str) -> Result<(), RegistryError> {
    if !slug.is_empty() && !slug.chars().any(char::is_whitespace) {
        Ok(())
    } else {
        Err(RegistryError::InvalidSlug(slug.to_owned()))
    }
}

fn validate_url(url: &str) -> Result<(), RegistryError> {
    match Url::parse(url) {
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.has_host() => Ok(()),
        _ => Err(RegistryError::InvalidUrl(url.to_owned())),
    }
}
