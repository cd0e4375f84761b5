use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted by the services. Delivery is best-effort:
/// a full or closed channel is logged, never surfaced to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Order events
    OrderPlaced {
        order_id: Uuid,
        order_number: i32,
    },
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    WaiterCalled(Uuid),
    BillRequested {
        order_id: Uuid,
        payment_method: String,
    },
    CallDismissed(Uuid),
    BillDismissed(Uuid),

    // Catalog events
    MenuItemCreated(Uuid),
    MenuItemUpdated(Uuid),
    MenuItemDeleted(Uuid),

    // Payment events
    PaymentCompleted {
        session_id: String,
        order_id: Uuid,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging (not propagating) failures
    pub async fn send_logged(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping domain event: {}", e);
        }
    }
}

/// Drains the event channel, logging every event. Dashboards poll the
/// database directly, so this loop is the only consumer.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderPlaced {
                order_id,
                order_number,
            } => {
                info!(%order_id, order_number, "order placed");
            }
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(%order_id, %old_status, %new_status, "order status changed");
            }
            Event::WaiterCalled(order_id) => {
                info!(%order_id, "waiter called");
            }
            Event::BillRequested {
                order_id,
                payment_method,
            } => {
                info!(%order_id, %payment_method, "bill requested");
            }
            Event::CallDismissed(order_id) => {
                info!(%order_id, "waiter call dismissed");
            }
            Event::BillDismissed(order_id) => {
                info!(%order_id, "bill request dismissed");
            }
            Event::MenuItemCreated(id) => info!(item_id = %id, "menu item created"),
            Event::MenuItemUpdated(id) => info!(item_id = %id, "menu item updated"),
            Event::MenuItemDeleted(id) => info!(item_id = %id, "menu item deleted"),
            Event::PaymentCompleted {
                session_id,
                order_id,
            } => {
                info!(%session_id, %order_id, "payment completed");
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_logged_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        // Must not panic or error out
        sender.send_logged(Event::WaiterCalled(Uuid::new_v4())).await;
    }
}
