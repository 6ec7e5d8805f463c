use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted after state changes commit. Consumers only observe;
/// nothing downstream of the channel participates in the originating
/// transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    UserRegistered(Uuid),
    BookingCreated {
        booking_id: Uuid,
        user_id: Uuid,
        hotel_id: Uuid,
        price: Decimal,
        loyalty_points_awarded: i64,
    },
    BookingCancelled {
        booking_id: Uuid,
        reason: Option<String>,
    },
    BookingStatusChanged {
        booking_id: Uuid,
        old_status: String,
        new_status: String,
    },
    PaymentOrderCreated {
        booking_id: Uuid,
        gateway_order_id: String,
        amount_minor: i64,
    },
    PaymentCaptured {
        booking_id: Uuid,
        payment_id: String,
    },
    PaymentFailed {
        booking_id: Uuid,
        reason: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, logging on a closed channel instead of failing the
    /// caller. Events are advisory; the write that produced them has already
    /// committed.
    pub async fn send(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            warn!("event channel closed, dropping event: {}", e);
        }
    }
}

/// Builds a bounded event channel, returning the sender and receiver halves.
pub fn event_channel(buffer: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(buffer);
    (EventSender::new(tx), rx)
}

/// Consumer loop. Currently logs each event; side channels (mail, analytics
/// export) hang off this point.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::BookingCreated {
                booking_id,
                user_id,
                price,
                loyalty_points_awarded,
                ..
            } => {
                info!(
                    %booking_id,
                    %user_id,
                    %price,
                    loyalty_points_awarded,
                    "booking created"
                );
            }
            Event::BookingCancelled { booking_id, reason } => {
                info!(%booking_id, reason = reason.as_deref().unwrap_or("-"), "booking cancelled");
            }
            Event::PaymentCaptured {
                booking_id,
                payment_id,
            } => {
                info!(%booking_id, %payment_id, "payment captured");
            }
            Event::PaymentFailed { booking_id, reason } => {
                warn!(%booking_id, reason = reason.as_deref().unwrap_or("-"), "payment failed");
            }
            other => {
                info!(event = ?other, "event");
            }
        }
    }

    info!("event channel closed, stopping event processing loop");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (sender, mut rx) = event_channel(8);
        let id = Uuid::new_v4();
        sender.send(Event::UserRegistered(id)).await;

        match rx.recv().await {
            Some(Event::UserRegistered(got)) => assert_eq!(got, id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_on_closed_channel_does_not_panic() {
        let (sender, rx) = event_channel(1);
        drop(rx);
        sender.send(Event::UserRegistered(Uuid::new_v4())).await;
    }
}
