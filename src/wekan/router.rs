//! Wekan subrouter definition.
//!
//! The following subroutes are supported, relative to [MOUNT]:
//!
//! - POST: `/:network`
//! - POST: `/:network/*rest`, with `rest` ignored
//!
//! Any other method on these paths, or on [MOUNT] itself, gets [POST_ONLY].

use super::{error::HookError, webhook::forward};
use crate::router::Deps;
use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    routing::{post, MethodRouter},
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

/// Where Wekan's outgoing webhook should point, followed by the network name.
pub const MOUNT: &str = "/wekan";

/// Returned with a `200 OK` for anything but a POST.
pub const POST_ONLY: &str =
    "This plugin handles only POST request, please don't use other requests.";

#[derive(Deserialize)]
struct HookPath {
    network: String,
}

/// Instantiate a new Wekan subrouter.
pub fn wekan_router() -> Router<Deps> {
    Router::new()
        .route(MOUNT, missing_network())
        .route(&format!("{}/", MOUNT), missing_network())
        .route(&format!("{}/:network", MOUNT), hook())
        .route(&format!("{}/:network/*rest", MOUNT), hook())
}

fn missing_network() -> MethodRouter<Deps> {
    post(missing_network_handler).fallback(post_only_handler)
}

fn hook() -> MethodRouter<Deps> {
    post(webhook_handler).fallback(post_only_handler)
}

async fn post_only_handler() -> &'static str {
    POST_ONLY
}

async fn missing_network_handler() -> HookError {
    HookError::MissingNetwork
}

/// Handler for the POST subroute `/:network`.
///
/// `network` must name a live network. Accepts a JSON body whose `text` field
/// holds a message and a board URL on separate lines; the message is relayed
/// to every channel on that network subscribed to the board.
async fn webhook_handler(
    State(deps): State<Deps>,
    path: Result<Path<HookPath>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<&'static str, HookError> {
    let Path(HookPath { network }) = path.map_err(|e| {
        info!("Could not read network from path: {}", e);
        HookError::MissingNetwork
    })?;

    let net = deps
        .networks
        .get_network(&network)
        .ok_or_else(|| HookError::UnknownNetwork(network.clone()))?;

    let body = body.map_err(|e| {
        info!("Failed to read payload: {}", e);
        HookError::UnreadableBody(e)
    })?;

    let payload = serde_json::from_slice::<Value>(&body).map_err(|e| {
        info!("Failed to decode payload: {}", e);
        HookError::InvalidJson(e)
    })?;

    let deliveries = forward(deps.store.as_ref(), net.as_ref(), &payload).map_err(|e| {
        warn!("Rejected payload for {}: {}", network, e);
        HookError::from(e)
    })?;

    if deliveries.is_empty() {
        info!("No channels on {} are subscribed to this board", network);
    }
    for d in &deliveries {
        info!("Relayed board {} to {} on {}", d.slug, d.channel, network);
    }

    Ok("OK")
}
