//! In-process event bus between producers and notification persistence.
//!
//! Publishing never waits for the row to be written. Each event is persisted
//! by its own task; failures are logged and dropped (at-most-once).

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::event::NotificationEvent;
use super::NotificationService;
use crate::schemas::notification::CreateNotification;

#[derive(Clone)]
pub struct NotificationPublisher {
    tx: UnboundedSender<NotificationEvent>,
}

impl NotificationPublisher {
    pub fn channel() -> (Self, UnboundedReceiver<NotificationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn publish(&self, event: NotificationEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::error!(
                receiver_id = %e.0.receiver_id(),
                "Notification bus closed, dropping event"
            );
        }
    }
}

pub struct NotificationListener;

impl NotificationListener {
    /// Start the consumer. It runs until every publisher is dropped.
    pub fn spawn(
        service: NotificationService,
        mut rx: UnboundedReceiver<NotificationEvent>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let service = service.clone();
                tokio::spawn(async move {
                    handle(service, event).await;
                });
            }
            tracing::debug!("Notification listener stopped");
        })
    }
}

async fn handle(service: NotificationService, event: NotificationEvent) {
    let request = CreateNotification::from(&event);
    match service.create(request).await {
        Ok(created) => {
            tracing::debug!(
                notification_id = %created.id,
                receiver_id = %created.receiver_id,
                "Notification created"
            );
        }
        Err(e) => {
            tracing::error!(
                receiver_id = %event.receiver_id(),
                error = %e,
                "Failed to create notification"
            );
        }
    }
}
