//! Thread-creation handling: gate → join → optional wait → send.
//!
//! Each notification runs independently. The only shared state is the
//! [`ConfigStore`], read at the gate, again for the wait window after the
//! join, and again for the message at send time. A command that lands after
//! the gate does not abort a response that is already under way.

use std::{sync::Arc, time::Duration};

use {
    autoping_channels::{ChatGateway, Error, ThreadEvent},
    tokio::time::Instant,
    tracing::{debug, error, info, warn},
};

use crate::store::ConfigStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Disabled,
    /// Replayed on reconnect or surfaced by a sync, not a fresh creation.
    NotNewlyCreated,
    OtherChannel,
}

/// How the wait step ended. Timing out is the normal fallback, not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Immediate,
    FirstMessage { message_id: String },
    TimedOut,
}

#[derive(Debug)]
pub enum ThreadOutcome {
    Ignored(IgnoreReason),
    /// Passed the gate but no auto message is configured.
    Misconfigured,
    JoinFailed(Error),
    Sent { wait: WaitOutcome, elapsed: Duration },
    SendFailed(Error),
}

pub struct ThreadWatcher {
    store: ConfigStore,
    gateway: Arc<dyn ChatGateway>,
}

impl ThreadWatcher {
    pub fn new(store: ConfigStore, gateway: Arc<dyn ChatGateway>) -> Self {
        Self { store, gateway }
    }

    pub async fn on_thread_created(&self, thread: &ThreadEvent) -> ThreadOutcome {
        let config = self.store.get();
        let ignored = if !config.enabled {
            Some(IgnoreReason::Disabled)
        } else if !thread.newly_created {
            Some(IgnoreReason::NotNewlyCreated)
        } else if thread.parent_channel_id.as_deref() != Some(config.monitored_channel_id.as_str())
        {
            Some(IgnoreReason::OtherChannel)
        } else {
            None
        };
        if let Some(reason) = ignored {
            debug!(thread_id = %thread.thread_id, ?reason, "thread ignored");
            return ThreadOutcome::Ignored(reason);
        }

        info!(
            thread_id = %thread.thread_id,
            name = %thread.name,
            creator = thread.creator_id.as_deref().unwrap_or("unknown"),
            "new thread detected"
        );

        if config.auto_message.is_empty() {
            error!(thread_id = %thread.thread_id, "auto message not configured, skipping thread");
            return ThreadOutcome::Misconfigured;
        }

        let started = Instant::now();

        if !thread.joined
            && let Err(e) = self.gateway.join_thread(&thread.thread_id).await
        {
            warn!(
                thread_id = %thread.thread_id,
                code = e.platform_code().map(|c| c.code()),
                reason = %e.reason(),
                "failed to join thread"
            );
            return ThreadOutcome::JoinFailed(e);
        }

        let wait = match self.store.get().wait_window() {
            Some(window) => self.wait_for_creator(thread, window).await,
            None => WaitOutcome::Immediate,
        };

        let message = self.store.get().auto_message;
        if let Err(e) = self.gateway.send(&thread.thread_id, &message).await {
            warn!(
                thread_id = %thread.thread_id,
                code = e.platform_code().map(|c| c.code()),
                reason = %e.reason(),
                "failed to send auto message"
            );
            return ThreadOutcome::SendFailed(e);
        }

        let elapsed = started.elapsed();
        info!(
            thread_id = %thread.thread_id,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            ?wait,
            "auto message sent"
        );
        ThreadOutcome::Sent { wait, elapsed }
    }

    /// Race the window against the creator's first message in the thread.
    async fn wait_for_creator(&self, thread: &ThreadEvent, window: Duration) -> WaitOutcome {
        let deadline = Instant::now() + window;
        debug!(
            thread_id = %thread.thread_id,
            window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
            "waiting for the creator's first message"
        );

        let Some(creator) = thread.creator_id.as_deref() else {
            tokio::time::sleep_until(deadline).await;
            return WaitOutcome::TimedOut;
        };

        let first = self.gateway.next_message_from(&thread.thread_id, creator);
        match tokio::time::timeout_at(deadline, first).await {
            Ok(Ok(msg)) => {
                debug!(thread_id = %thread.thread_id, message_id = %msg.id, "creator posted first");
                WaitOutcome::FirstMessage { message_id: msg.id }
            },
            Ok(Err(e)) => {
                debug!(thread_id = %thread.thread_id, error = %e, "message wait failed, waiting out the window");
                tokio::time::sleep_until(deadline).await;
                WaitOutcome::TimedOut
            },
            Err(_) => {
                debug!(thread_id = %thread.thread_id, "no message from the creator, sending anyway");
                WaitOutcome::TimedOut
            },
        }
    }
}
