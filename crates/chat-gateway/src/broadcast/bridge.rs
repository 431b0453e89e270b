//! Bus bridge
//!
//! Consumes the bus subscription and delivers each envelope to this
//! instance's connections exactly once.

use super::Fanout;
use chat_cache::BusEnvelope;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;

pub struct BusBridge {
    fanout: Arc<Fanout>,
    running: AtomicBool,
    shutdown: Notify,
}

impl BusBridge {
    pub fn new(fanout: Arc<Fanout>) -> Arc<Self> {
        Arc::new(Self {
            fanout,
            running: AtomicBool::new(false),
            shutdown: Notify::new(),
        })
    }

    /// Subscribe to the bus and spawn the delivery loop
    ///
    /// The subscription is taken before this returns, so nothing published
    /// afterwards is missed. Returns `None` without a bus or when already
    /// running.
    pub fn start(self: Arc<Self>) -> Option<JoinHandle<()>> {
        let receiver = self.fanout.bus()?.subscribe();

        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Bus bridge is already running");
            return None;
        }

        let bridge = self.clone();
        let handle = tokio::spawn(async move {
            bridge.run(receiver).await;
        });

        tracing::info!("Bus bridge started");
        Some(handle)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.notify_one();
        tracing::info!("Bus bridge stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn run(&self, mut receiver: broadcast::Receiver<BusEnvelope>) {
        while self.is_running() {
            tokio::select! {
                _ = self.shutdown.notified() => break,
                received = receiver.recv() => match received {
                    Ok(envelope) => {
                        let sent = self.fanout.deliver_local(&envelope);
                        tracing::trace!(
                            channel_id = %envelope.channel_id,
                            event_type = %envelope.event_type,
                            sent = sent,
                            "Bus event delivered"
                        );
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "Bus bridge lagged behind, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::warn!("Bus subscription closed");
                        break;
                    }
                },
            }
        }

        self.running.store(false, Ordering::SeqCst);
        tracing::info!("Bus bridge loop ended");
    }
}

impl std::fmt::Debug for BusBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusBridge")
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionManager;
    use chat_cache::{LocalBus, MessageBus};
    use chat_core::Snowflake;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_without_bus_nothing_starts() {
        let bridge = BusBridge::new(Arc::new(Fanout::local(ConnectionManager::new_shared())));
        assert!(bridge.clone().start().is_none());
        assert!(!bridge.is_running());
    }

    #[tokio::test]
    async fn test_two_bridges_one_delivery_each() {
        let bus = LocalBus::default();
        let general = Snowflake::new(1);

        let mut receivers = Vec::new();
        let mut bridges = Vec::new();
        for user in [1001, 1002] {
            let manager = ConnectionManager::new_shared();
            let (tx, rx) = mpsc::channel(10);
            let session = format!("s{user}");
            manager.add_connection(session.clone(), Snowflake::new(user), tx);
            manager.subscribe(&session, general);
            receivers.push(rx);

            let bridge = BusBridge::new(Arc::new(Fanout::new(manager, Some(Arc::new(bus.clone())))));
            assert!(bridge.clone().start().is_some());
            bridges.push(bridge);
        }

        bus.publish(&BusEnvelope::new(general, "new_message", serde_json::json!({})))
            .await
            .unwrap();

        for rx in &mut receivers {
            let frame = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(frame.frame_type, "new_message");
            assert!(rx.try_recv().is_err());
        }

        for bridge in &bridges {
            bridge.stop();
        }
    }
}
