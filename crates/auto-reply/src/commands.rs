//! In-band operator commands.
//!
//! A command is any message authored by the operator whose text starts with
//! the configured prefix: `!autoPing delay 5000`. Unknown command names are
//! ignored without a reply.

use std::{sync::Arc, time::Duration};

use {
    autoping_channels::{ChatGateway, InboundMessage},
    tracing::{debug, error, info, warn},
};

use crate::{
    error::Result,
    listing::ChannelLister,
    store::{ConfigPatch, ConfigStore},
    validate::{ChannelValidator, validate_message},
};

const VOLATILE_NOTICE: &str =
    "\n\n⚠️ This change lasts until restart. To keep it, edit `.env` or the config file.";

/// A parsed command: lowercase name plus whitespace-separated arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

/// Parse `text` as a command if it starts with `prefix`.
#[must_use]
pub fn parse_command(prefix: &str, text: &str) -> Option<Command> {
    let mut tokens = text.strip_prefix(prefix)?.split_whitespace();
    let name = tokens.next()?.to_lowercase();
    Some(Command {
        name,
        args: tokens.map(str::to_string).collect(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Status,
    Canal,
    Msg,
    Delay,
    Listar,
    Ajuda,
    On,
    Off,
}

impl CommandKind {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "status" => Self::Status,
            "canal" => Self::Canal,
            "msg" => Self::Msg,
            "delay" => Self::Delay,
            "listar" => Self::Listar,
            "ajuda" => Self::Ajuda,
            "on" => Self::On,
            "off" => Self::Off,
            _ => return None,
        })
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Canal => "canal",
            Self::Msg => "msg",
            Self::Delay => "delay",
            Self::Listar => "listar",
            Self::Ajuda => "ajuda",
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Author is not the operator account.
    NotOperator,
    /// Text does not carry the command prefix.
    NotCommand,
    /// Prefix matched but no handler exists for the name.
    Unknown(String),
    Handled(CommandKind),
    /// The handler raised; a generic failure notice was attempted.
    Failed(CommandKind),
}

/// Human description of a wait window, shared by `status` and the startup
/// report.
pub(crate) fn describe_wait_mode(wait_window_ms: u64) -> String {
    if wait_window_ms > 0 {
        format!("⏱️ Wait for the first message (up to {wait_window_ms}ms)")
    } else {
        "⚡ Reply immediately".to_string()
    }
}

pub struct CommandDispatcher {
    store: ConfigStore,
    gateway: Arc<dyn ChatGateway>,
    validator: ChannelValidator,
    lister: ChannelLister,
    delete_after: Duration,
}

impl CommandDispatcher {
    pub fn new(
        store: ConfigStore,
        gateway: Arc<dyn ChatGateway>,
        delete_after: Duration,
        max_per_page: usize,
    ) -> Self {
        Self {
            store,
            validator: ChannelValidator::new(Arc::clone(&gateway)),
            gateway,
            lister: ChannelLister::new(max_per_page),
            delete_after,
        }
    }

    /// Route one inbound message. Never fails: handler errors are logged and
    /// reported back to the operator.
    pub async fn dispatch(&self, msg: &InboundMessage, operator_id: &str) -> DispatchOutcome {
        if msg.author_id != operator_id {
            return DispatchOutcome::NotOperator;
        }

        let prefix = self.store.get().command_prefix;
        let Some(command) = parse_command(&prefix, &msg.content) else {
            return DispatchOutcome::NotCommand;
        };
        let Some(kind) = CommandKind::from_name(&command.name) else {
            debug!(name = %command.name, "unknown command ignored");
            return DispatchOutcome::Unknown(command.name);
        };

        debug!(command = %kind, args = command.args.len(), "running command");
        match self.execute(kind, &command.args, &msg.channel_id).await {
            Ok(()) => {
                self.schedule_delete(msg);
                DispatchOutcome::Handled(kind)
            },
            Err(e) => {
                error!(command = %kind, error = %e, "command failed");
                let notice = format!("❌ Failed to run command: {}", e.reason());
                if let Err(e) = self.gateway.send(&msg.channel_id, &notice).await {
                    warn!(command = %kind, error = %e, "failure notice not delivered");
                }
                DispatchOutcome::Failed(kind)
            },
        }
    }

    async fn execute(&self, kind: CommandKind, args: &[String], reply_to: &str) -> Result<()> {
        match kind {
            CommandKind::Status => self.status(reply_to).await,
            CommandKind::Canal => self.canal(args, reply_to).await,
            CommandKind::Msg => self.msg(args, reply_to).await,
            CommandKind::Delay => self.delay(args, reply_to).await,
            CommandKind::Listar => self.listar(reply_to).await,
            CommandKind::Ajuda => self.ajuda(reply_to).await,
            CommandKind::On => self.toggle(true, reply_to).await,
            CommandKind::Off => self.toggle(false, reply_to).await,
        }
    }

    async fn reply(&self, channel_id: &str, text: &str) -> Result<()> {
        self.gateway.send(channel_id, text).await?;
        Ok(())
    }

    /// Deleting the command message is cosmetic; failures are dropped.
    fn schedule_delete(&self, msg: &InboundMessage) {
        let gateway = Arc::clone(&self.gateway);
        let delay = self.delete_after;
        let channel_id = msg.channel_id.clone();
        let message_id = msg.id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = gateway.delete_message(&channel_id, &message_id).await {
                debug!(message_id, error = %e, "command message not deleted");
            }
        });
    }

    async fn status(&self, reply_to: &str) -> Result<()> {
        let config = self.store.get();

        let (channel_line, channel_state) = if config.monitored_channel_id.is_empty() {
            (
                "not configured".to_string(),
                "❌ Channel not configured".to_string(),
            )
        } else {
            match self.validator.validate(&config.monitored_channel_id).await {
                Ok(valid) => (valid.label, "✅ Channel valid".to_string()),
                Err(e) => (config.monitored_channel_id.clone(), format!("❌ {e}")),
            }
        };

        let (message_line, message_state) = if config.auto_message.is_empty() {
            ("not configured", "❌ Message not configured")
        } else {
            (config.auto_message.as_str(), "✅ Message valid")
        };

        let text = format!(
            "**🤖 AutoPing status**\n\n\
             📺 **Channel:** {channel_line}\n{channel_state}\n\n\
             💬 **Message:** `{message_line}`\n{message_state}\n\n\
             🕐 **Mode:** {}\n\n\
             ⚡ **Status:** {}\n\n\
             📝 **Commands:** `{} ajuda`",
            describe_wait_mode(config.wait_window_ms),
            if config.enabled {
                "🟢 Active"
            } else {
                "🔴 Disabled"
            },
            config.command_prefix,
        );
        self.reply(reply_to, &text).await
    }

    async fn canal(&self, args: &[String], reply_to: &str) -> Result<()> {
        let prefix = self.store.get().command_prefix;
        let Some(channel_id) = args.first() else {
            let usage = format!(
                "❌ Usage: `{prefix} canal CHANNEL_ID`\nExample: `{prefix} canal 123456789012345678`"
            );
            return self.reply(reply_to, &usage).await;
        };

        self.reply(reply_to, "🔄 Validating channel...").await?;

        let valid = match self.validator.validate(channel_id).await {
            Ok(valid) => valid,
            Err(e) => return self.reply(reply_to, &format!("❌ **Error:** {e}")).await,
        };

        let previous = self.store.set(ConfigPatch {
            monitored_channel_id: Some(valid.channel.id.clone()),
            ..Default::default()
        });
        info!(
            old = %previous.monitored_channel_id,
            new = %valid.channel.id,
            channel = %valid.label,
            "monitored channel changed"
        );

        let text = format!(
            "✅ **Channel updated!**\n📺 Now watching: {}{VOLATILE_NOTICE}",
            valid.label
        );
        self.reply(reply_to, &text).await
    }

    async fn msg(&self, args: &[String], reply_to: &str) -> Result<()> {
        let text = args.join(" ");
        if text.is_empty() {
            let prefix = self.store.get().command_prefix;
            let usage = format!(
                "❌ Usage: `{prefix} msg YOUR_MESSAGE`\nExample: `{prefix} msg Hi! I'm interested!`"
            );
            return self.reply(reply_to, &usage).await;
        }

        if let Err(e) = validate_message(&text) {
            return self.reply(reply_to, &format!("❌ **Error:** {e}")).await;
        }

        let previous = self.store.set(ConfigPatch {
            auto_message: Some(text.clone()),
            ..Default::default()
        });
        info!(old = ?previous.auto_message, new = ?text, "auto message changed");

        let confirmation =
            format!("✅ **Message updated!**\n💬 New message: `{text}`{VOLATILE_NOTICE}");
        self.reply(reply_to, &confirmation).await
    }

    async fn delay(&self, args: &[String], reply_to: &str) -> Result<()> {
        let Some(wait_ms) = args.first().and_then(|arg| arg.parse::<u64>().ok()) else {
            let config = self.store.get();
            let prefix = config.command_prefix;
            let usage = format!(
                "❌ Usage: `{prefix} delay MS`\n\n**Examples:**\n\
                 `{prefix} delay 5000` - wait up to 5 seconds for the first message\n\
                 `{prefix} delay 0` - reply immediately (default)\n\n\
                 **Current:** {}ms",
                config.wait_window_ms
            );
            return self.reply(reply_to, &usage).await;
        };

        let previous = self.store.set(ConfigPatch {
            wait_window_ms: Some(wait_ms),
            ..Default::default()
        });
        info!(
            old_ms = previous.wait_window_ms,
            new_ms = wait_ms,
            "wait window changed"
        );

        let text = if wait_ms == 0 {
            format!(
                "✅ **Mode updated!**\n⚡ New threads now get a reply **immediately**.{VOLATILE_NOTICE}"
            )
        } else {
            format!(
                "✅ **Mode updated!**\n⏱️ Now waiting up to **{wait_ms}ms** for the creator's first message before replying.{VOLATILE_NOTICE}"
            )
        };
        self.reply(reply_to, &text).await
    }

    async fn listar(&self, reply_to: &str) -> Result<()> {
        self.reply(reply_to, "🔄 Loading channel list...").await?;

        let prefix = self.store.get().command_prefix;
        let entries = self.lister.collect(self.gateway.cached_channels());
        if entries.is_empty() {
            return self.reply(reply_to, "No channels found.").await;
        }

        let lister = self
            .lister
            .clone()
            .footer(format!("💡 Use `{prefix} canal ID` to set the channel."));
        for page in lister.pages(&entries) {
            self.reply(reply_to, &page).await?;
        }
        Ok(())
    }

    async fn ajuda(&self, reply_to: &str) -> Result<()> {
        let p = self.store.get().command_prefix;
        let text = format!(
            "**🤖 AutoPing commands**\n\n\
             `{p} status` - show the current configuration\n\
             `{p} canal ID` - set the channel to watch\n\
             `{p} msg TEXT` - set the automatic message\n\
             `{p} delay MS` - set the wait window (0 = immediate)\n\
             `{p} listar` - list every available channel\n\
             `{p} on` - enable AutoPing\n\
             `{p} off` - disable AutoPing\n\
             `{p} ajuda` - show this message\n\n\
             **Examples:**\n\
             `{p} canal 123456789012345678`\n\
             `{p} msg 222/555/666-FB/666-Rep`\n\
             `{p} delay 5000` - wait up to 5s for the first message\n\
             `{p} delay 0` - reply immediately"
        );
        self.reply(reply_to, &text).await
    }

    async fn toggle(&self, enabled: bool, reply_to: &str) -> Result<()> {
        self.store.set(ConfigPatch {
            enabled: Some(enabled),
            ..Default::default()
        });
        if enabled {
            info!("auto reply enabled by command");
            self.reply(reply_to, "✅ AutoPing **enabled**!").await
        } else {
            info!("auto reply disabled by command");
            self.reply(reply_to, "🔴 AutoPing **disabled**!").await
        }
    }
}
