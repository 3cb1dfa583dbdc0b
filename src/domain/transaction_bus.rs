//! Broadcast channel for committed transfers.
//!
//! [`TransactionBus`] wraps a [`tokio::sync::broadcast`] channel. The
//! ledger publishes a [`TransferEvent`] for each side of every committed
//! transfer, and monitoring sessions subscribe to receive filtered events.

use tokio::sync::broadcast;

use super::TransferEvent;

/// Broadcast bus for [`TransferEvent`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity.
/// The ring buffer bounds per-subscriber memory: when it is full, the
/// oldest events are dropped for lagging receivers, which observe a
/// `Lagged` error on their next receive. There is no client-side
/// acknowledgment in the protocol, so this drop-oldest policy is the
/// only available overflow behavior.
#[derive(Debug, Clone)]
pub struct TransactionBus {
    sender: broadcast::Sender<TransferEvent>,
}

impl TransactionBus {
    /// Creates a new `TransactionBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event.
    /// If there are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: TransferEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future events.
    ///
    /// History is not replayed: the receiver only observes transfers
    /// committed after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TransferEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::TransactionRecord;

    fn make_event(account: &str, seq: u64) -> TransferEvent {
        TransferEvent {
            account: account.to_string(),
            record: TransactionRecord {
                counterparty: "Bob".to_string(),
                delta: -10,
                comment: "test".to_string(),
            },
            seq,
        }
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = TransactionBus::new(16);
        let count = bus.publish(make_event("Alice", 0));
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn subscriber_receives_event() {
        let bus = TransactionBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(make_event("Alice", 7));

        let event = rx.recv().await;
        let Ok(event) = event else {
            panic!("expected to receive event");
        };
        assert_eq!(event.account, "Alice");
        assert_eq!(event.seq, 7);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = TransactionBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let count = bus.publish(make_event("Alice", 1));
        assert_eq!(count, 2);

        let e1 = rx1.recv().await;
        let e2 = rx2.recv().await;
        let Ok(e1) = e1 else {
            panic!("rx1 failed");
        };
        let Ok(e2) = e2 else {
            panic!("rx2 failed");
        };
        assert_eq!(e1.seq, e2.seq);
    }

    #[tokio::test]
    async fn events_arrive_in_publish_order() {
        let bus = TransactionBus::new(16);
        let mut rx = bus.subscribe();

        for seq in 0..5 {
            bus.publish(make_event("Alice", seq));
        }
        for expected in 0..5 {
            let Ok(event) = rx.recv().await else {
                panic!("missing event {expected}");
            };
            assert_eq!(event.seq, expected);
        }
    }

    #[tokio::test]
    async fn lagging_receiver_drops_oldest() {
        let bus = TransactionBus::new(2);
        let mut rx = bus.subscribe();

        for seq in 0..4 {
            bus.publish(make_event("Alice", seq));
        }

        let lag = rx.recv().await;
        let Err(broadcast::error::RecvError::Lagged(n)) = lag else {
            panic!("expected a lag error, got {lag:?}");
        };
        assert_eq!(n, 2);

        // After the lag report the oldest retained event is next.
        let Ok(event) = rx.recv().await else {
            panic!("expected retained event");
        };
        assert_eq!(event.seq, 2);
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus = TransactionBus::new(16);
        assert_eq!(bus.receiver_count(), 0);

        let _rx1 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);

        let _rx2 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);

        drop(_rx1);
        assert_eq!(bus.receiver_count(), 1);
    }
}
