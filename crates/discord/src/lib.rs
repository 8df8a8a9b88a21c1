//! Discord adapter for autoping.
//!
//! Bridges serenity's gateway callbacks into [`autoping_auto_reply::GatewayEvent`]s
//! and implements [`autoping_channels::ChatGateway`] over serenity's HTTP
//! client, cache and message collectors.

pub mod client;
pub mod error;
pub mod gateway;
pub mod handler;

pub use {
    client::{ChannelListing, fetch_channel_listing, run},
    error::{Error, Result},
    gateway::SerenityGateway,
    handler::DiscordHandler,
};
