//! Relay Wekan board activity to the chat channels that care about it.
//!
//! Wekan's outgoing webhook is pointed at `/wekan/<network>`. Each channel
//! joined on that network can subscribe to boards by URL, and receives the
//! webhook's message whenever activity happens on one of them.
//!
//! Board subscriptions are managed with the commands in [command], available
//! to the local operator on stdin.

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

use chat::network::{log_outbox, LiveNetwork, NetworkSet};
use config::{Config, JsonStore};
use dotenvy::dotenv;
use router::Deps;
use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::{io::BufReader, sync::oneshot};
use tracing::{info, warn};

mod chat;
mod command;
mod config;
mod registry;
mod router;
mod wekan;

/// Application entrypoint. Initialises tracing, checks for environment
/// variables, loads the config file, binds to 0.0.0.0, and starts the server
/// alongside the operator console.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    let has_dotenv = dotenv().is_ok();
    if !has_dotenv {
        warn!("No .env found");
    }

    let port: u16 = env::var("PORT")
        .map(|x| x.parse().expect("Could not parse PORT to u16"))
        .unwrap_or(80);

    let config_path = env::var_os("WEKAN_CONFIG").map(PathBuf::from);
    let config = match &config_path {
        Some(path) => Config::load(path).expect("Could not load $WEKAN_CONFIG"),
        None => {
            warn!("No $WEKAN_CONFIG environment variable found, boards won't be saved");
            Config::default()
        }
    };

    let deps = deps(config, config_path);

    tokio::spawn(command::console(
        deps.clone(),
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    server_(addr, deps).await;
}

/// Bring up an in-process connection for every configured network, logging
/// whatever is sent on it.
fn deps(config: Config, config_path: Option<PathBuf>) -> Deps {
    let mut networks = NetworkSet::default();

    for (name, net) in &config.networks {
        let (live, rx) = LiveNetwork::new(name, net.channels.iter().cloned());
        tokio::spawn(log_outbox(name.clone(), rx));
        networks.insert(Arc::new(live));
    }

    if networks.is_empty() {
        warn!("No networks configured, every webhook will be refused");
    } else {
        info!("Relaying to {} network(s)", networks.len());
    }

    Deps {
        networks: Arc::new(networks),
        store: Arc::new(JsonStore::new(config, config_path)),
    }
}

/// Initialise a server without graceful shutdown.
async fn server_(addr: SocketAddr, deps: Deps) {
    // The receiver resolves once the sender is dropped, so hold onto it.
    let (_tx, rx) = oneshot::channel::<()>();
    server(addr, deps, rx).await;
}

/// Initialise a server with graceful shutdown via `rx`.
async fn server(addr: SocketAddr, deps: Deps, rx: oneshot::Receiver<()>) {
    info!("Listening on {}", addr.to_string());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, router::new(deps))
        .with_graceful_shutdown(async {
            rx.await.ok();
        })
        .await
        .expect("Failed to start server");
}
