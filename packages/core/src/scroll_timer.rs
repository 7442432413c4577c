//! Repeating timer for auto-scrolling while the play head is dragged past
//! the edge of the track.
//!
//! The timer only produces ticks; the host applies each one with
//! [`TimelineEditor::auto_scroll_step`](crate::TimelineEditor::auto_scroll_step).
//! The background task is aborted on `cancel` and on drop.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

#[derive(Debug, Default)]
pub struct DragScrollTimer {
    task: Option<JoinHandle<()>>,
}

impl DragScrollTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking every `period`. The first tick arrives after one period.
    ///
    /// Returns `None` while a timer is already running. Must be called from
    /// within a tokio runtime.
    pub fn start(&mut self, period: Duration) -> Option<mpsc::UnboundedReceiver<()>> {
        if self.is_running() {
            return None;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if tx.send(()).is_err() {
                    break;
                }
            }
        }));

        debug!("Drag scroll timer started ({:?})", period);
        Some(rx)
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Drag scroll timer cancelled");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for DragScrollTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
