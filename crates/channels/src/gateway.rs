use async_trait::async_trait;

use crate::{
    Result,
    types::{ChannelSnapshot, InboundMessage},
};

/// Everything the core needs from the real-time chat connection.
///
/// Connection management (login, reconnect, event delivery) stays in the
/// adapter; the core only issues these calls.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Look up a channel by id. `Ok(None)` when the platform has nothing.
    async fn fetch_channel(&self, channel_id: &str) -> Result<Option<ChannelSnapshot>>;

    /// Join a thread so the account can post in it.
    async fn join_thread(&self, thread_id: &str) -> Result<()>;

    /// Post a text message to a channel or thread.
    async fn send(&self, channel_id: &str, text: &str) -> Result<()>;

    async fn delete_message(&self, channel_id: &str, message_id: &str) -> Result<()>;

    /// Resolve with the next message posted in `channel_id` by `author_id`.
    ///
    /// Has no timeout of its own. Dropping the future drops the underlying
    /// subscription.
    async fn next_message_from(&self, channel_id: &str, author_id: &str)
    -> Result<InboundMessage>;

    /// Every channel currently known to the connection's cache, across all
    /// workspaces.
    fn cached_channels(&self) -> Vec<ChannelSnapshot>;
}
