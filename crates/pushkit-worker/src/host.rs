//! Worker host
//!
//! Runs a [`NotificationWorker`] as its own task. Events arrive on a one-way
//! channel; outcomes optionally go back out on another.

use pushkit_platform::{NotificationDisplay, WindowClients, WorkerEvent};
use smol::channel::{Receiver, Sender};

use crate::worker::{NotificationWorker, WorkerOutcome};

/// Channel carrying platform events into the worker
pub fn event_channel() -> (Sender<WorkerEvent>, Receiver<WorkerEvent>) {
    smol::channel::unbounded()
}

/// Event loop around a notification worker
pub struct WorkerHost<N, W> {
    worker: NotificationWorker<N, W>,
    events: Receiver<WorkerEvent>,
    outcomes: Option<Sender<WorkerOutcome>>,
}

impl<N: NotificationDisplay, W: WindowClients> WorkerHost<N, W> {
    pub fn new(worker: NotificationWorker<N, W>, events: Receiver<WorkerEvent>) -> Self {
        Self {
            worker,
            events,
            outcomes: None,
        }
    }

    /// Report every outcome on `outcomes`
    pub fn with_outcomes(mut self, outcomes: Sender<WorkerOutcome>) -> Self {
        self.outcomes = Some(outcomes);
        self
    }

    pub fn worker(&self) -> &NotificationWorker<N, W> {
        &self.worker
    }

    /// Handle events until every sender is dropped
    ///
    /// Returns the number of events handled.
    pub async fn run(self) -> usize {
        tracing::info!("Notification worker started");

        let mut handled = 0;
        while let Ok(event) = self.events.recv().await {
            tracing::debug!("Dispatching {} event", event.name());
            // Finish this event before taking the next
            let outcome = self.worker.handle_event(event).await;
            handled += 1;

            if let Some(outcomes) = &self.outcomes {
                if outcomes.send(outcome).await.is_err() {
                    tracing::debug!("Outcome receiver dropped");
                }
            }
        }

        tracing::info!("Notification worker stopped after {} events", handled);
        handled
    }
}
