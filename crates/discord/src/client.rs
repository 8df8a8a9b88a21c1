use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use {
    autoping_auto_reply::{ConfigStore, EventRouter, RouterSettings},
    autoping_channels::{ChannelSnapshot, ChatGateway},
    autoping_config::AutoPingConfig,
    secrecy::ExposeSecret,
    serenity::{
        Client,
        all::{Context, EventHandler, GatewayIntents, GuildId, Ready},
        async_trait,
    },
    tokio::sync::oneshot,
    tracing::{debug, error, info, warn},
};

use crate::{
    error::{Error, Result},
    gateway::SerenityGateway,
    handler::DiscordHandler,
};

/// How long `list-channels` waits for the guild cache to fill.
const LISTING_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect and serve events until the gateway stops or Ctrl-C is pressed.
pub async fn run(config: &AutoPingConfig) -> Result<()> {
    let router = Arc::new(EventRouter::new(
        ConfigStore::from(config),
        RouterSettings {
            delete_after: Duration::from_millis(config.commands.delete_after_ms),
            max_per_page: config.listing.max_per_message,
            operator_override: config.discord.operator_id.clone(),
        },
    ));

    info!("connecting to discord");
    let mut client = Client::builder(
        config.discord.token.expose_secret(),
        DiscordHandler::intents(),
    )
    .event_handler(DiscordHandler::new(router))
    .await
    .map_err(Error::connection)?;

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutting down autoping");
                shard_manager.shutdown_all().await;
            },
            Err(e) => warn!(error = %e, "ctrl-c handler unavailable"),
        }
    });

    if let Err(e) = client.start().await {
        let err = Error::connection(e);
        error!(error = %err, "gateway stopped");
        return Err(err);
    }
    info!("gateway stopped");
    Ok(())
}

/// Every cached channel, as seen by one short-lived connection.
#[derive(Debug, Clone)]
pub struct ChannelListing {
    pub user_tag: String,
    pub guild_count: usize,
    pub channels: Vec<ChannelSnapshot>,
}

type ListingSender = oneshot::Sender<ChannelListing>;

struct ListingHandler {
    tx: Mutex<Option<ListingSender>>,
}

impl ListingHandler {
    fn finish(&self, listing: ChannelListing) {
        let tx = self.tx.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(tx) = tx
            && tx.send(listing).is_err()
        {
            debug!("listing receiver dropped");
        }
    }
}

#[async_trait]
impl EventHandler for ListingHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        // No guilds means no cache_ready.
        if ready.guilds.is_empty() {
            self.finish(ChannelListing {
                user_tag: ready.user.tag(),
                guild_count: 0,
                channels: Vec::new(),
            });
        }
    }

    async fn cache_ready(&self, ctx: Context, guilds: Vec<GuildId>) {
        let user_tag = ctx.cache.current_user().tag();
        let channels = SerenityGateway::new(ctx).cached_channels();
        self.finish(ChannelListing {
            user_tag,
            guild_count: guilds.len(),
            channels,
        });
    }
}

/// Connect, wait for the guild cache, snapshot every channel, disconnect.
pub async fn fetch_channel_listing(token: &str) -> Result<ChannelListing> {
    let (tx, rx) = oneshot::channel();
    let handler = ListingHandler {
        tx: Mutex::new(Some(tx)),
    };
    let mut client = Client::builder(token, GatewayIntents::GUILDS)
        .event_handler(handler)
        .await
        .map_err(Error::connection)?;
    let shard_manager = Arc::clone(&client.shard_manager);

    info!("connecting to list channels");
    let mut runner = tokio::spawn(async move { client.start().await });

    let outcome = tokio::select! {
        listing = rx => listing.map_err(|_| Error::message("connection closed before the cache was ready")),
        stopped = &mut runner => Err(match stopped {
            Ok(Err(e)) => Error::connection(e),
            Ok(Ok(())) => Error::message("connection closed before the cache was ready"),
            Err(e) => Error::external("gateway task", e),
        }),
        () = tokio::time::sleep(LISTING_TIMEOUT) => Err(Error::message("timed out waiting for the guild cache")),
    };

    shard_manager.shutdown_all().await;
    runner.abort();
    outcome
}
