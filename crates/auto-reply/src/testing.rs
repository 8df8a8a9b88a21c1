//! In-crate fakes for the gateway collaborator.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{collections::HashMap, sync::Mutex, time::Duration};

use {
    async_trait::async_trait,
    autoping_channels::{
        ChannelKind, ChannelSnapshot, ChatGateway, Error, InboundMessage, PermissionCheck,
        PlatformErrorCode, Result,
    },
};

use crate::store::{ConfigStore, RuntimeConfig};

/// Records every outbound call and serves scripted lookups.
pub(crate) struct FakeGateway {
    channels: Mutex<HashMap<String, ChannelSnapshot>>,
    lookup_failures: Mutex<HashMap<String, PlatformErrorCode>>,
    join_failure: Mutex<Option<PlatformErrorCode>>,
    send_failure: Mutex<Option<PlatformErrorCode>>,
    delete_failure: Mutex<Option<PlatformErrorCode>>,
    wait_unavailable: Mutex<bool>,
    pub lookups: Mutex<Vec<String>>,
    pub joined: Mutex<Vec<String>>,
    pub sent: Mutex<Vec<(String, String)>>,
    pub deleted: Mutex<Vec<(String, String)>>,
    creator_reply: Mutex<Option<(Duration, String)>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            lookup_failures: Mutex::new(HashMap::new()),
            join_failure: Mutex::new(None),
            send_failure: Mutex::new(None),
            delete_failure: Mutex::new(None),
            wait_unavailable: Mutex::new(false),
            lookups: Mutex::new(Vec::new()),
            joined: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            creator_reply: Mutex::new(None),
        }
    }

    pub fn with_channel(self, channel: ChannelSnapshot) -> Self {
        self.channels
            .lock()
            .unwrap()
            .insert(channel.id.clone(), channel);
        self
    }

    pub fn fail_lookup(self, channel_id: &str, code: PlatformErrorCode) -> Self {
        self.lookup_failures
            .lock()
            .unwrap()
            .insert(channel_id.to_string(), code);
        self
    }

    pub fn fail_join(self, code: PlatformErrorCode) -> Self {
        *self.join_failure.lock().unwrap() = Some(code);
        self
    }

    pub fn fail_send(self, code: PlatformErrorCode) -> Self {
        *self.send_failure.lock().unwrap() = Some(code);
        self
    }

    pub fn fail_delete(self, code: PlatformErrorCode) -> Self {
        *self.delete_failure.lock().unwrap() = Some(code);
        self
    }

    /// Message subscriptions fail straight away.
    pub fn fail_wait(self) -> Self {
        *self.wait_unavailable.lock().unwrap() = true;
        self
    }

    /// `author_id` posts into whichever thread is being waited on, `delay`
    /// after the wait starts. Without this, waits never see a message.
    pub fn reply_after(self, delay: Duration, author_id: &str) -> Self {
        *self.creator_reply.lock().unwrap() = Some((delay, author_id.to_string()));
        self
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, channel_id: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| to == channel_id)
            .map(|(_, text)| text)
            .collect()
    }
}

#[async_trait]
impl ChatGateway for FakeGateway {
    async fn fetch_channel(&self, channel_id: &str) -> Result<Option<ChannelSnapshot>> {
        self.lookups.lock().unwrap().push(channel_id.to_string());
        if let Some(code) = self.lookup_failures.lock().unwrap().get(channel_id) {
            return Err(Error::platform(*code, "scripted lookup failure"));
        }
        Ok(self.channels.lock().unwrap().get(channel_id).cloned())
    }

    async fn join_thread(&self, thread_id: &str) -> Result<()> {
        if let Some(code) = *self.join_failure.lock().unwrap() {
            return Err(Error::platform(code, "scripted join failure"));
        }
        self.joined.lock().unwrap().push(thread_id.to_string());
        Ok(())
    }

    async fn send(&self, channel_id: &str, text: &str) -> Result<()> {
        if let Some(code) = *self.send_failure.lock().unwrap() {
            return Err(Error::platform(code, "scripted send failure"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn delete_message(&self, channel_id: &str, message_id: &str) -> Result<()> {
        if let Some(code) = *self.delete_failure.lock().unwrap() {
            return Err(Error::platform(code, "scripted delete failure"));
        }
        self.deleted
            .lock()
            .unwrap()
            .push((channel_id.to_string(), message_id.to_string()));
        Ok(())
    }

    async fn next_message_from(
        &self,
        channel_id: &str,
        author_id: &str,
    ) -> Result<InboundMessage> {
        if *self.wait_unavailable.lock().unwrap() {
            return Err(Error::unavailable("message subscription closed"));
        }
        let scripted = self.creator_reply.lock().unwrap().clone();
        match scripted {
            Some((delay, author)) if author == author_id => {
                tokio::time::sleep(delay).await;
                Ok(InboundMessage {
                    id: "900000000000000001".into(),
                    channel_id: channel_id.into(),
                    author_id: author,
                    content: "first!".into(),
                })
            },
            _ => std::future::pending().await,
        }
    }

    fn cached_channels(&self) -> Vec<ChannelSnapshot> {
        let mut channels: Vec<_> = self.channels.lock().unwrap().values().cloned().collect();
        channels.sort_by(|a, b| a.id.cmp(&b.id));
        channels
    }
}

pub(crate) fn channel(id: &str, name: &str, workspace: &str, kind: ChannelKind) -> ChannelSnapshot {
    ChannelSnapshot {
        id: id.into(),
        name: name.into(),
        workspace_id: Some(format!("{workspace}-id")),
        workspace_name: Some(workspace.into()),
        category: None,
        kind,
        send_permission: PermissionCheck::Allowed,
    }
}

pub(crate) fn store(channel_id: &str, message: &str, wait_ms: u64) -> ConfigStore {
    ConfigStore::new(RuntimeConfig {
        monitored_channel_id: channel_id.into(),
        auto_message: message.into(),
        wait_window_ms: wait_ms,
        command_prefix: "!autoPing".into(),
        enabled: true,
    })
}
