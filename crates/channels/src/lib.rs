//! Chat platform boundary for autoping.
//!
//! The core never talks to the platform SDK directly. It sees normalized
//! channel snapshots and thread/message events, and reaches the platform only
//! through the [`ChatGateway`] trait implemented by an adapter crate.

pub mod error;
pub mod gateway;
pub mod types;

pub use {
    error::{Error, PlatformErrorCode, Result},
    gateway::ChatGateway,
    types::{ChannelKind, ChannelSnapshot, InboundMessage, PermissionCheck, ThreadEvent},
};
