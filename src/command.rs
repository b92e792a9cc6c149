//! Administrative commands for managing a channel's board subscriptions.
//!
//! ```text
//! board add [<channel>] <board-slug> <board-url>
//! board remove [<channel>] <board-slug>
//! board list [<channel>]
//! ```
//!
//! The channel defaults to wherever the command was issued. An optional
//! leading `wekan` is accepted, matching how the commands are namespaced in
//! chat. Every command requires the `admin` capability.

use crate::{
    chat::channel::{is_channel_name, ChannelName},
    registry::{self, ConfigStore},
    router::Deps,
};
use std::fmt;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

const CAPABILITY: &str = "admin";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Add {
        channel: Option<ChannelName>,
        slug: String,
        url: String,
    },
    Remove {
        channel: Option<ChannelName>,
        slug: String,
    },
    List {
        channel: Option<ChannelName>,
    },
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("(board add [<channel>] <board-slug> <board-url>)")]
    AddUsage,
    #[error("(board remove [<channel>] <board-slug>)")]
    RemoveUsage,
    #[error("(board list [<channel>])")]
    ListUsage,
    #[error("Unknown command: {0}")]
    Unknown(String),
}

/// Decides whether a user holds a capability.
pub trait Capabilities {
    fn check_capability(&self, user: &str, capability: &str) -> bool;
}

impl<F: Fn(&str, &str) -> bool> Capabilities for F {
    fn check_capability(&self, user: &str, capability: &str) -> bool {
        self(user, capability)
    }
}

/// The local operator on the console holds every capability.
pub struct Operator;

impl Capabilities for Operator {
    fn check_capability(&self, _user: &str, _capability: &str) -> bool {
        true
    }
}

/// Who issued a command, and where.
pub struct Context<'a> {
    pub user: &'a str,
    pub channel: Option<&'a ChannelName>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Success,
    Error(String),
    Lines(Vec<String>),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Success => write!(f, "The operation succeeded."),
            Reply::Error(e) => write!(f, "Error: {}", e),
            Reply::Lines(xs) => write!(f, "{}", xs.join("\n")),
        }
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let mut args: Vec<&str> = line.split_whitespace().collect();
        if args.first() == Some(&"wekan") {
            args.remove(0);
        }

        match args.as_slice() {
            ["board", "add", rest @ ..] => match split_channel(rest) {
                (channel, [slug, url]) => Ok(Command::Add {
                    channel,
                    slug: slug.to_string(),
                    url: url.to_string(),
                }),
                _ => Err(CommandError::AddUsage),
            },
            ["board", "remove", rest @ ..] => match split_channel(rest) {
                (channel, [slug]) => Ok(Command::Remove {
                    channel,
                    slug: slug.to_string(),
                }),
                _ => Err(CommandError::RemoveUsage),
            },
            ["board", "list", rest @ ..] => match split_channel(rest) {
                (channel, []) => Ok(Command::List { channel }),
                _ => Err(CommandError::ListUsage),
            },
            _ => Err(CommandError::Unknown(args.join(" "))),
        }
    }

    fn channel(&self) -> Option<&ChannelName> {
        match self {
            Command::Add { channel, .. }
            | Command::Remove { channel, .. }
            | Command::List { channel } => channel.as_ref(),
        }
    }
}

/// Take a leading channel argument off `args`, if there is one.
fn split_channel<'a, 'b>(args: &'b [&'a str]) -> (Option<ChannelName>, &'b [&'a str]) {
    match args {
        [first, rest @ ..] if is_channel_name(first) => (Some(ChannelName::from(*first)), rest),
        _ => (None, args),
    }
}

/// Run a parsed command on behalf of `ctx.user`.
pub fn execute(
    store: &dyn ConfigStore,
    caps: &dyn Capabilities,
    ctx: &Context,
    cmd: &Command,
) -> Reply {
    if !caps.check_capability(ctx.user, CAPABILITY) {
        return Reply::Error(format!("You don't have the {} capability.", CAPABILITY));
    }

    let channel = match cmd.channel().or(ctx.channel) {
        Some(c) => c,
        None => return Reply::Error("A channel must be given outside of a channel.".into()),
    };

    let res = match cmd {
        Command::Add { slug, url, .. } => registry::add(store, channel, slug, url),
        Command::Remove { slug, .. } => registry::remove(store, channel, slug),
        Command::List { .. } => {
            let boards = registry::list(store, channel);
            if boards.is_empty() {
                return Reply::Error("This channel has no registered boards.".into());
            }

            return Reply::Lines(
                boards
                    .iter()
                    .map(|(slug, url)| format!("{}: {}", slug, url))
                    .collect(),
            );
        }
    };

    match res {
        Ok(()) => {
            info!("{} ran {:?} in {}", ctx.user, cmd, channel);
            Reply::Success
        }
        Err(e) => Reply::Error(e.to_string()),
    }
}

/// Read commands from the local operator a line at a time, writing each
/// reply back. Runs until `input` is exhausted.
pub async fn console<R, W>(deps: Deps, input: R, mut output: W)
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let ctx = Context {
        user: "console",
        channel: None,
    };
    let mut lines = input.lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Console input failed: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let reply = match Command::parse(&line) {
            Ok(cmd) => execute(deps.store.as_ref(), &Operator, &ctx, &cmd),
            Err(e) => Reply::Error(e.to_string()),
        };

        if let Err(e) = output.write_all(format!("{}\n", reply).as_bytes()).await {
            warn!("Console output failed: {}", e);
            break;
        }
    }

    if let Err(e) = output.flush().await {
        warn!("Console output failed: {}", e);
    }
}
