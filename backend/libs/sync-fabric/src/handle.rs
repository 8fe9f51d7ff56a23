use lapin::Channel;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle to the process's current broker channel.
///
/// The supervisor installs a channel after each successful connect and
/// clears it when the connection drops; publishers observe `None` during
/// an outage and drop their events (best-effort publish).
#[derive(Clone, Default)]
pub struct ChannelHandle {
    inner: Arc<RwLock<Option<Channel>>>,
}

impl ChannelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, channel: Channel) {
        *self.inner.write().await = Some(channel);
    }

    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }

    pub async fn get(&self) -> Option<Channel> {
        self.inner.read().await.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.read().await.is_some()
    }
}
