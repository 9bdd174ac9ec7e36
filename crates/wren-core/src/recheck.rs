//! Offline retry timer
//!
//! After a load failed without network, a task polls the network monitor
//! at a fixed interval and sends a single reload once it comes back.

use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use wren_view::NetworkMonitor;

use crate::events::ViewCommand;

#[derive(Debug, Default)]
pub struct NetworkRecheck {
    task: Option<JoinHandle<()>>,
}

impl NetworkRecheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start polling for `uri`, replacing any earlier schedule.
    pub fn schedule(
        &mut self,
        runtime: &Handle,
        view_id: String,
        uri: String,
        interval: Duration,
        network: Arc<dyn NetworkMonitor>,
        commands: UnboundedSender<ViewCommand>,
    ) {
        self.cancel();

        tracing::debug!(view_id = %view_id, uri = %uri, "Waiting for network");

        self.task = Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if network.is_available() {
                    tracing::info!(view_id = %view_id, uri = %uri, "Network back, reloading");
                    if commands.send(ViewCommand::Reload { view_id, uri }).is_err() {
                        tracing::debug!("View closed before network came back");
                    }
                    break;
                }
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for NetworkRecheck {
    fn drop(&mut self) {
        self.cancel();
    }
}
