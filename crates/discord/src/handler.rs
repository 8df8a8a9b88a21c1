//! Discord event handler for serenity.
//!
//! Every callback is turned into a [`GatewayEvent`] and handed to the shared
//! [`EventRouter`]. serenity runs each callback on its own task, so a slow
//! thread wait never holds up other events.

use std::{
    sync::{Arc, RwLock},
    time::Duration,
};

use {
    autoping_auto_reply::{EventRouter, GatewayEvent, ReadyInfo},
    autoping_channels::ThreadEvent,
    serenity::{
        all::{
            ConnectionStage, Context, EventHandler, GatewayIntents, GuildChannel, GuildId,
            Message, Ready, ResumedEvent, ShardStageUpdateEvent,
        },
        async_trait,
        http::RatelimitInfo,
        model::Timestamp,
    },
    tracing::{debug, info, warn},
};

use crate::gateway::{SerenityGateway, inbound, is_newly_created};

/// Handler for Discord gateway events.
pub struct DiscordHandler {
    router: Arc<EventRouter>,
    /// Context from the latest `ready`, for callbacks delivered without one.
    session: RwLock<Option<Context>>,
}

impl DiscordHandler {
    pub fn new(router: Arc<EventRouter>) -> Self {
        Self {
            router,
            session: RwLock::new(None),
        }
    }

    /// Required gateway intents.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }

    async fn route(&self, ctx: Context, event: GatewayEvent) {
        self.router
            .route(Arc::new(SerenityGateway::new(ctx)), event)
            .await;
    }
}

fn rate_limit_message(path: &str, retry_after: Duration, global: bool) -> String {
    let scope = if global {
        "global"
    } else {
        "route"
    };
    format!(
        "{scope} rate limit hit on {path}, retrying in {}ms",
        retry_after.as_millis()
    )
}

fn thread_event(thread: &GuildChannel, now: Timestamp) -> ThreadEvent {
    ThreadEvent {
        thread_id: thread.id.to_string(),
        parent_channel_id: thread.parent_id.map(|id| id.to_string()),
        creator_id: thread.owner_id.map(|id| id.to_string()),
        name: thread.name.clone(),
        newly_created: is_newly_created(thread.id, now),
        joined: thread.member.is_some(),
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        let info = ReadyInfo {
            user_id: ready.user.id.to_string(),
            user_tag: ready.user.tag(),
            guild_count: ready.guilds.len(),
        };
        *self.session.write().unwrap_or_else(|e| e.into_inner()) = Some(ctx.clone());
        self.route(ctx, GatewayEvent::Ready(info)).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        self.route(ctx, GatewayEvent::MessageReceived(inbound(&msg)))
            .await;
    }

    async fn thread_create(&self, ctx: Context, thread: GuildChannel) {
        let event = thread_event(&thread, Timestamp::now());
        self.route(ctx, GatewayEvent::ThreadCreated(event)).await;
    }

    async fn shard_stage_update(&self, ctx: Context, event: ShardStageUpdateEvent) {
        let shard = event.shard_id.0;
        match event.new {
            ConnectionStage::Disconnected => {
                self.route(ctx, GatewayEvent::Disconnected(format!("shard {shard}")))
                    .await;
            },
            ConnectionStage::Connected => info!(shard, "gateway connected"),
            ConnectionStage::Resuming => info!(shard, "resuming gateway session"),
            stage => debug!(shard, ?stage, "shard stage changed"),
        }
    }

    async fn ratelimit(&self, data: RatelimitInfo) {
        let message = rate_limit_message(&data.path, data.timeout, data.global);
        let ctx = self
            .session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        match ctx {
            Some(ctx) => self.route(ctx, GatewayEvent::Error(message)).await,
            None => warn!(error = %message, "gateway error before ready"),
        }
    }

    async fn resume(&self, _ctx: Context, _event: ResumedEvent) {
        info!("gateway session resumed");
    }

    async fn cache_ready(&self, _ctx: Context, guilds: Vec<GuildId>) {
        debug!(guild_count = guilds.len(), "discord cache ready");
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case(false, "route rate limit hit on /channels/1/messages, retrying in 1500ms")]
    #[case(true, "global rate limit hit on /channels/1/messages, retrying in 1500ms")]
    fn rate_limits_become_error_notifications(#[case] global: bool, #[case] expected: &str) {
        assert_eq!(
            rate_limit_message("/channels/1/messages", Duration::from_millis(1500), global),
            expected
        );
    }

    #[test]
    fn intents_cover_threads_and_commands() {
        let intents = DiscordHandler::intents();
        assert!(intents.contains(GatewayIntents::GUILDS));
        assert!(intents.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(intents.contains(GatewayIntents::DIRECT_MESSAGES));
    }
}
