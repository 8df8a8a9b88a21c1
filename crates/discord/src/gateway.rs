use std::collections::HashMap;

use {
    async_trait::async_trait,
    autoping_channels::{
        ChannelKind, ChannelSnapshot, ChatGateway, Error, InboundMessage, PermissionCheck, Result,
    },
    serenity::{
        all::{
            Channel, ChannelId, ChannelType, Context, GuildChannel, GuildId, Message,
            MessageCollector, MessageId, UserId,
        },
        model::Timestamp,
    },
};

use crate::error::to_channel_error;

/// Threads whose snowflake is older than this when `thread_create` arrives
/// were surfaced by a sync or membership change, not created just now.
///
/// serenity's `GuildChannel` does not expose Discord's `newly_created` flag,
/// so age is the only signal here. A replay of a thread younger than the
/// window still looks new; the router drops those once it has seen and
/// joined the thread.
const NEWLY_CREATED_WINDOW_SECS: i64 = 60;

/// [`ChatGateway`] over one serenity [`Context`]. Cheap to build per event.
pub struct SerenityGateway {
    ctx: Context,
}

impl SerenityGateway {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    fn workspace_name(&self, guild_id: GuildId) -> Option<String> {
        guild_id.name(&self.ctx.cache)
    }

    fn category_name(&self, guild_id: GuildId, parent_id: ChannelId) -> Option<String> {
        let guild = self.ctx.cache.guild(guild_id)?;
        guild.channels.get(&parent_id).map(|c| c.name.clone())
    }

    fn send_permission(&self, channel: &GuildChannel) -> PermissionCheck {
        let me = self.ctx.cache.current_user().id;
        match channel.permissions_for_user(&self.ctx.cache, me) {
            Ok(perms) if perms.send_messages() => PermissionCheck::Allowed,
            Ok(_) => PermissionCheck::Denied,
            Err(e) => PermissionCheck::Indeterminate(e.to_string()),
        }
    }

    fn snapshot(
        &self,
        channel: &GuildChannel,
        workspace_name: Option<String>,
        category: Option<String>,
    ) -> ChannelSnapshot {
        ChannelSnapshot {
            id: channel.id.to_string(),
            name: channel.name.clone(),
            workspace_id: Some(channel.guild_id.to_string()),
            workspace_name,
            category,
            kind: channel_kind(channel.kind),
            send_permission: self.send_permission(channel),
        }
    }
}

#[async_trait]
impl ChatGateway for SerenityGateway {
    async fn fetch_channel(&self, channel_id: &str) -> Result<Option<ChannelSnapshot>> {
        let Some(id) = parse_channel_id(channel_id) else {
            return Ok(None);
        };
        match id.to_channel(&self.ctx).await {
            Ok(Channel::Guild(channel)) => {
                let workspace = self.workspace_name(channel.guild_id);
                let category = channel
                    .parent_id
                    .and_then(|parent| self.category_name(channel.guild_id, parent));
                Ok(Some(self.snapshot(&channel, workspace, category)))
            },
            Ok(Channel::Private(dm)) => Ok(Some(ChannelSnapshot {
                id: dm.id.to_string(),
                name: dm.recipient.name.clone(),
                workspace_id: None,
                workspace_name: None,
                category: None,
                kind: channel_kind(dm.kind),
                send_permission: PermissionCheck::Indeterminate("direct message".into()),
            })),
            Ok(_) => Ok(None),
            Err(e) => Err(to_channel_error("fetch channel", e)),
        }
    }

    async fn join_thread(&self, thread_id: &str) -> Result<()> {
        let id = require_channel_id(thread_id)?;
        id.join_thread(&self.ctx.http)
            .await
            .map_err(|e| to_channel_error("join thread", e))
    }

    async fn send(&self, channel_id: &str, text: &str) -> Result<()> {
        let id = require_channel_id(channel_id)?;
        id.say(&self.ctx, text)
            .await
            .map(|_| ())
            .map_err(|e| to_channel_error("send message", e))
    }

    async fn delete_message(&self, channel_id: &str, message_id: &str) -> Result<()> {
        let id = require_channel_id(channel_id)?;
        let message = parse_snowflake(message_id)
            .map(MessageId::new)
            .ok_or_else(|| Error::invalid_input(format!("bad message id: {message_id}")))?;
        id.delete_message(&self.ctx, message)
            .await
            .map_err(|e| to_channel_error("delete message", e))
    }

    async fn next_message_from(
        &self,
        channel_id: &str,
        author_id: &str,
    ) -> Result<InboundMessage> {
        let channel = require_channel_id(channel_id)?;
        let author = parse_snowflake(author_id)
            .map(UserId::new)
            .ok_or_else(|| Error::invalid_input(format!("bad user id: {author_id}")))?;

        MessageCollector::new(&self.ctx)
            .channel_id(channel)
            .author_id(author)
            .next()
            .await
            .map(|msg| inbound(&msg))
            .ok_or_else(|| Error::unavailable("message collector closed"))
    }

    fn cached_channels(&self) -> Vec<ChannelSnapshot> {
        let cache = &self.ctx.cache;
        // Copy out of the cache first; permission checks read it again.
        let guilds: Vec<(String, Vec<GuildChannel>)> = cache
            .guilds()
            .into_iter()
            .filter_map(|id| {
                let guild = cache.guild(id)?;
                Some((guild.name.clone(), guild.channels.values().cloned().collect()))
            })
            .collect();

        let mut snapshots = Vec::new();
        for (workspace, channels) in guilds {
            let categories: HashMap<ChannelId, String> = channels
                .iter()
                .filter(|c| c.kind == ChannelType::Category)
                .map(|c| (c.id, c.name.clone()))
                .collect();
            for channel in channels.iter().filter(|c| c.kind != ChannelType::Category) {
                let category = channel
                    .parent_id
                    .and_then(|parent| categories.get(&parent).cloned());
                snapshots.push(self.snapshot(channel, Some(workspace.clone()), category));
            }
        }
        snapshots
    }
}

pub(crate) fn inbound(msg: &Message) -> InboundMessage {
    InboundMessage {
        id: msg.id.to_string(),
        channel_id: msg.channel_id.to_string(),
        author_id: msg.author.id.to_string(),
        content: msg.content.clone(),
    }
}

pub(crate) fn channel_kind(kind: ChannelType) -> ChannelKind {
    ChannelKind::from_discord_code(u8::from(kind))
}

/// `thread_create` also fires for existing threads (sync on reconnect,
/// being added to a thread). Only threads minted recently count as new.
pub(crate) fn is_newly_created(thread_id: ChannelId, now: Timestamp) -> bool {
    created_within(
        thread_id.created_at().unix_timestamp(),
        now.unix_timestamp(),
    )
}

fn created_within(created_unix: i64, now_unix: i64) -> bool {
    now_unix.saturating_sub(created_unix) <= NEWLY_CREATED_WINDOW_SECS
}

fn parse_snowflake(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|id| *id != 0)
}

fn parse_channel_id(raw: &str) -> Option<ChannelId> {
    parse_snowflake(raw).map(ChannelId::new)
}

fn require_channel_id(raw: &str) -> Result<ChannelId> {
    parse_channel_id(raw).ok_or_else(|| Error::invalid_input(format!("bad channel id: {raw}")))
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("123456789012345678", Some(123_456_789_012_345_678))]
    #[case(" 123456789012345678 ", Some(123_456_789_012_345_678))]
    #[case("0", None)]
    #[case("abc", None)]
    #[case("-1", None)]
    #[case("", None)]
    fn snowflake_parsing(#[case] raw: &str, #[case] expected: Option<u64>) {
        assert_eq!(parse_snowflake(raw), expected);
    }

    #[rstest]
    #[case(ChannelType::Text, ChannelKind::Text)]
    #[case(ChannelType::News, ChannelKind::Announcement)]
    #[case(ChannelType::Forum, ChannelKind::Forum)]
    #[case(ChannelType::Voice, ChannelKind::Other(2))]
    #[case(ChannelType::Category, ChannelKind::Other(4))]
    fn channel_types_normalize(#[case] raw: ChannelType, #[case] expected: ChannelKind) {
        assert_eq!(channel_kind(raw), expected);
    }

    #[rstest]
    #[case(1_700_000_000, 1_700_000_000, true)]
    #[case(1_700_000_000, 1_700_000_060, true)]
    #[case(1_700_000_000, 1_700_000_061, false)]
    #[case(1_700_000_000, 1_699_999_990, true)]
    fn newly_created_window(#[case] created: i64, #[case] now: i64, #[case] expected: bool) {
        assert_eq!(created_within(created, now), expected);
    }

    #[test]
    fn old_snowflake_is_not_new() {
        // Discord epoch + a few ms: created in 2015.
        let thread = ChannelId::new(1 << 22);
        assert!(!is_newly_created(thread, Timestamp::now()));
    }
}
