//! # Notification Watcher
//!
//! Re-evaluates the notification rules on a fixed interval, and once
//! immediately when started.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Notification Watcher                                │
//! │                                                                         │
//! │  WatcherHandle ── EvaluateNow / Shutdown ──┐                            │
//! │                                            ▼                            │
//! │                                   ┌─────────────────┐                   │
//! │  interval.tick() ────────────────►│   Watcher loop  │                   │
//! │  (first tick fires immediately)   └────────┬────────┘                   │
//! │                                            │                            │
//! │                       store.read() ──► WatchSnapshot                    │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                          NotificationCenter::evaluate(snapshot, now)    │
//! │                                            │                            │
//! │                                 newly raised (may be empty)             │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                                  NotificationSink::deliver              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A tick that races an in-flight mutation waits for the store's write lock
//! to drop and then evaluates what the mutation left behind.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use dokon_core::{Notification, NotificationKind};

use crate::state::AppState;

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("Watcher channel closed")]
    ChannelClosed,
}

// =============================================================================
// Sink
// =============================================================================

/// Receives the notifications each evaluation raised.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, raised: &[Notification]);
}

/// Writes each notification to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, raised: &[Notification]) {
        for n in raised {
            match n.kind {
                NotificationKind::Warning | NotificationKind::Error => {
                    warn!(id = %n.id, title = %n.title, "{}", n.message)
                }
                NotificationKind::Info | NotificationKind::Success => {
                    info!(id = %n.id, title = %n.title, "{}", n.message)
                }
            }
        }
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Runs the rules once against the current store and returns what was
/// raised. Used by the watcher and by the `evaluate_notifications` command.
pub async fn evaluate(state: &AppState) -> Vec<Notification> {
    let store = state.store.read().await;
    let now = state.now();
    let raised = state
        .notifications
        .with_center_mut(|center| center.evaluate(store.snapshot(), now));
    debug!(raised = raised.len(), "Notification rules evaluated");
    raised
}

// =============================================================================
// Watcher
// =============================================================================

pub struct Watcher {
    state: AppState,
    sink: Arc<dyn NotificationSink>,
    period: Duration,
}

/// Handle for controlling a running watcher.
#[derive(Clone)]
pub struct WatcherHandle {
    cmd_tx: mpsc::Sender<WatcherCommand>,
}

#[derive(Debug)]
enum WatcherCommand {
    /// Evaluate without waiting for the next tick; replies with the count raised.
    EvaluateNow(oneshot::Sender<usize>),
    Shutdown,
}

impl WatcherHandle {
    pub async fn evaluate_now(&self) -> Result<usize, WatcherError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx
            .send(WatcherCommand::EvaluateNow(reply_tx))
            .await
            .map_err(|_| WatcherError::ChannelClosed)?;
        reply_rx.await.map_err(|_| WatcherError::ChannelClosed)
    }

    pub async fn shutdown(&self) -> Result<(), WatcherError> {
        self.cmd_tx
            .send(WatcherCommand::Shutdown)
            .await
            .map_err(|_| WatcherError::ChannelClosed)
    }
}

impl Watcher {
    /// Watcher using the configured `[notifications] interval_secs`.
    pub fn new(state: AppState, sink: Arc<dyn NotificationSink>) -> Self {
        let period = Duration::from_secs(state.config.notifications.interval_secs);
        Watcher { state, sink, period }
    }

    /// Starts the watcher and returns a handle.
    pub fn start(self) -> WatcherHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);

        tokio::spawn(async move {
            self.run(cmd_rx).await;
        });

        WatcherHandle { cmd_tx }
    }

    async fn run(self, mut cmd_rx: mpsc::Receiver<WatcherCommand>) {
        info!(interval_secs = self.period.as_secs(), "Notification watcher started");

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                Some(cmd) = cmd_rx.recv() => {
                    match cmd {
                        WatcherCommand::Shutdown => {
                            info!("Notification watcher shutting down");
                            break;
                        }
                        WatcherCommand::EvaluateNow(reply) => {
                            let count = self.tick().await;
                            let _ = reply.send(count);
                        }
                    }
                }
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    async fn tick(&self) -> usize {
        let raised = evaluate(&self.state).await;
        if !raised.is_empty() {
            self.sink.deliver(&raised).await;
        }
        raised.len()
    }
}
