//! Dispatch table from gateway notifications to the core handlers.

use std::{
    collections::{HashSet, VecDeque},
    sync::{Arc, Mutex, RwLock},
    time::Duration,
};

use {
    autoping_channels::{ChatGateway, InboundMessage, ThreadEvent},
    tracing::{debug, error, info, warn},
};

use crate::{
    commands::{CommandDispatcher, DispatchOutcome, describe_wait_mode},
    store::ConfigStore,
    validate::ChannelValidator,
    watcher::ThreadWatcher,
};

/// Account details reported when the connection becomes ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyInfo {
    pub user_id: String,
    pub user_tag: String,
    pub guild_count: usize,
}

/// Notifications delivered by the gateway adapter.
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    Ready(ReadyInfo),
    MessageReceived(InboundMessage),
    ThreadCreated(ThreadEvent),
    Error(String),
    Disconnected(String),
}

#[derive(Debug, Clone)]
pub struct RouterSettings {
    /// Delay before a processed command message is deleted.
    pub delete_after: Duration,
    /// Channel entries per `listar` page.
    pub max_per_page: usize,
    /// Account whose messages count as commands. Defaults to the account
    /// that logged in.
    pub operator_override: Option<String>,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            delete_after: Duration::from_millis(2000),
            max_per_page: 15,
            operator_override: None,
        }
    }
}

/// Thread ids remembered for replay detection.
const RECENT_THREADS: usize = 512;

/// Bounded, insertion-ordered set of thread ids already handed to the
/// watcher. The oldest id is forgotten once the capacity is reached.
#[derive(Debug)]
struct RecentThreads {
    capacity: usize,
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl RecentThreads {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::new(),
            seen: HashSet::new(),
        }
    }

    /// Returns `false` when `id` was already present.
    fn insert(&mut self, id: &str) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        if self.order.len() >= self.capacity
            && let Some(oldest) = self.order.pop_front()
        {
            self.seen.remove(&oldest);
        }
        self.order.push_back(id.to_string());
        self.seen.insert(id.to_string());
        true
    }
}

/// Shared by every event task. Handlers for one event never block another.
pub struct EventRouter {
    store: ConfigStore,
    settings: RouterSettings,
    operator_id: RwLock<Option<String>>,
    recent_threads: Mutex<RecentThreads>,
}

impl EventRouter {
    pub fn new(store: ConfigStore, settings: RouterSettings) -> Self {
        let operator_id = RwLock::new(settings.operator_override.clone());
        Self {
            store,
            settings,
            operator_id,
            recent_threads: Mutex::new(RecentThreads::new(RECENT_THREADS)),
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Operator account, known once an override is set or `Ready` arrives.
    pub fn operator_id(&self) -> Option<String> {
        self.operator_id
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub async fn route(&self, gateway: Arc<dyn ChatGateway>, event: GatewayEvent) {
        match event {
            GatewayEvent::Ready(info) => self.on_ready(gateway, info).await,
            GatewayEvent::MessageReceived(msg) => self.on_message(gateway, msg).await,
            GatewayEvent::ThreadCreated(thread) => {
                if self.is_replay(&thread) {
                    debug!(thread_id = %thread.thread_id, "thread already handled, ignoring replay");
                    return;
                }
                ThreadWatcher::new(self.store.clone(), gateway)
                    .on_thread_created(&thread)
                    .await;
            },
            GatewayEvent::Error(message) => error!(error = %message, "gateway error"),
            GatewayEvent::Disconnected(reason) => {
                warn!(%reason, "disconnected, waiting for the gateway to reconnect");
            },
        }
    }

    /// A thread we already saw and have since joined is a replay, even when
    /// it still falls inside the newly-created window.
    fn is_replay(&self, thread: &ThreadEvent) -> bool {
        let first_time = self
            .recent_threads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(&thread.thread_id);
        !first_time && thread.joined
    }

    async fn on_message(&self, gateway: Arc<dyn ChatGateway>, msg: InboundMessage) {
        let Some(operator_id) = self.operator_id() else {
            debug!("message before ready, operator unknown");
            return;
        };
        let dispatcher = CommandDispatcher::new(
            self.store.clone(),
            gateway,
            self.settings.delete_after,
            self.settings.max_per_page,
        );
        match dispatcher.dispatch(&msg, &operator_id).await {
            DispatchOutcome::Handled(kind) => debug!(command = %kind, "command handled"),
            DispatchOutcome::Failed(kind) => debug!(command = %kind, "command failed"),
            _ => {},
        }
    }

    async fn on_ready(&self, gateway: Arc<dyn ChatGateway>, ready: ReadyInfo) {
        let operator = {
            let mut slot = self.operator_id.write().unwrap_or_else(|e| e.into_inner());
            slot.get_or_insert_with(|| ready.user_id.clone()).clone()
        };
        info!(
            user = %ready.user_tag,
            guilds = ready.guild_count,
            operator = %operator,
            "autoping connected"
        );

        let config = self.store.get();
        if config.monitored_channel_id.is_empty() {
            warn!(
                "no channel configured, use `{} canal ID`",
                config.command_prefix
            );
        } else {
            match ChannelValidator::new(gateway)
                .validate(&config.monitored_channel_id)
                .await
            {
                Ok(valid) => info!(channel = %valid.label, "monitoring"),
                Err(e) => warn!(
                    channel_id = %config.monitored_channel_id,
                    problem = %e,
                    "configured channel has a problem, use `{} canal ID` to set a valid one",
                    config.command_prefix
                ),
            }
        }

        let message = if config.auto_message.is_empty() {
            "not configured"
        } else {
            config.auto_message.as_str()
        };
        info!(
            auto_message = %message,
            mode = %describe_wait_mode(config.wait_window_ms),
            "waiting for new threads, commands: `{} ajuda`",
            config.command_prefix
        );
    }
}
