//! Thread auto-reply core: the glue between gateway events and replies.
//!
//! Flow: gateway event → [`router::EventRouter`] → either the command
//! dispatcher (operator messages carrying the prefix) or the thread watcher
//! (thread creations) → replies through the [`autoping_channels::ChatGateway`].

pub mod commands;
pub mod error;
pub mod listing;
pub mod router;
pub mod store;
pub mod validate;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testing;

pub use {
    commands::{Command, CommandDispatcher, CommandKind, DispatchOutcome, parse_command},
    error::{Error, Result},
    listing::{ChannelEntry, ChannelLister, ChannelPages, Grouping},
    router::{EventRouter, GatewayEvent, ReadyInfo, RouterSettings},
    store::{ConfigPatch, ConfigStore, RuntimeConfig},
    validate::{ChannelValidator, ValidatedChannel, ValidationError, validate_message},
    watcher::{IgnoreReason, ThreadOutcome, ThreadWatcher, WaitOutcome},
};
