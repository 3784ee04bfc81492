//! # Record Events
//!
//! Real-time change feed of the record store. Every committed create or update is
//! published on a tokio broadcast channel; subscribers pick the collections they
//! care about.
//!
//! Delivery is best-effort: a subscriber that falls more than the channel capacity
//! behind gets [`SubscriptionError::Lagged`] and should reload from the store.

use log::debug;
use tokio::sync::broadcast;

use crate::backend::domain::models::{daily_log::DailyLog, student::Student, transaction::Transaction};

/// Default number of events buffered per subscriber
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Students,
    Transactions,
    DailyLogs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Student(Student),
    Transaction(Transaction),
    DailyLog(DailyLog),
}

impl Record {
    pub fn collection(&self) -> Collection {
        match self {
            Record::Student(_) => Collection::Students,
            Record::Transaction(_) => Collection::Transactions,
            Record::DailyLog(_) => Collection::DailyLogs,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordEvent {
    pub action: RecordAction,
    pub record: Record,
}

impl RecordEvent {
    pub fn created(record: Record) -> Self {
        Self { action: RecordAction::Created, record }
    }

    pub fn updated(record: Record) -> Self {
        Self { action: RecordAction::Updated, record }
    }

    pub fn collection(&self) -> Collection {
        self.record.collection()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionError {
    #[error("subscriber lagged behind and skipped {0} events")]
    Lagged(u64),
    #[error("event hub closed")]
    Closed,
}

/// Fan-out point for record events
#[derive(Clone)]
pub struct EventHub {
    sender: broadcast::Sender<RecordEvent>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: RecordEvent) {
        let collection = event.collection();
        match self.sender.send(event) {
            Ok(receivers) => debug!("Published {:?} event to {} subscribers", collection, receivers),
            Err(_) => debug!("Published {:?} event with no subscribers", collection),
        }
    }

    /// Subscribe to events of one collection
    pub fn subscribe(&self, collection: Collection) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            collection: Some(collection),
        }
    }

    /// Subscribe to events of every collection
    pub fn subscribe_all(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            collection: None,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAPACITY)
    }
}

/// Receiving end of a subscription; dropping it unsubscribes.
pub struct Subscription {
    receiver: broadcast::Receiver<RecordEvent>,
    collection: Option<Collection>,
}

impl Subscription {
    /// Wait for the next matching event
    pub async fn recv(&mut self) -> Result<RecordEvent, SubscriptionError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.matches(&event) {
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    return Err(SubscriptionError::Lagged(skipped))
                }
                Err(broadcast::error::RecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }

    fn matches(&self, event: &RecordEvent) -> bool {
        self.collection.map_or(true, |c| c == event.collection())
    }
}
