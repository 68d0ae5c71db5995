//! Loan lifecycle events
//!
//! Published on a broadcast channel so that other parts of the service (the
//! catalogue, loggers) can react to returns without the ledger knowing them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use super::model::LoanId;

/// Events emitted by the ledger
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoanEvent {
    DeviceReturned {
        #[serde(rename = "loanId")]
        loan_id: LoanId,
        #[serde(rename = "deviceId")]
        device_id: String,
        #[serde(rename = "returnedAt")]
        returned_at: DateTime<Utc>,
    },
}

impl LoanEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            LoanEvent::DeviceReturned { .. } => "device_returned",
        }
    }
}

/// Fan-out channel for loan events
#[derive(Clone)]
pub struct LoanEvents {
    tx: broadcast::Sender<LoanEvent>,
}

impl LoanEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LoanEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: LoanEvent) {
        match self.tx.send(event) {
            Ok(receivers) => {
                tracing::debug!(receivers, "Loan event published");
            }
            Err(broadcast::error::SendError(event)) => {
                tracing::debug!(event = event.name(), "No subscribers for loan event");
            }
        }
    }
}

impl Default for LoanEvents {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Log every event until the channel closes
pub async fn log_events(mut rx: broadcast::Receiver<LoanEvent>) {
    loop {
        match rx.recv().await {
            Ok(LoanEvent::DeviceReturned {
                loan_id,
                device_id,
                returned_at,
            }) => {
                tracing::info!(
                    loan_id = %loan_id,
                    device_id = %device_id,
                    returned_at = %returned_at,
                    "device_returned"
                );
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Loan event listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = LoanEvent::DeviceReturned {
            loan_id: LoanId::from_sequence(2),
            device_id: "lap-001".to_string(),
            returned_at: Utc::now(),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "device_returned");
        assert_eq!(value["loanId"], "loan-002");
        assert_eq!(value["deviceId"], "lap-001");
        assert_eq!(event.name(), "device_returned");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let events = LoanEvents::default();
        events.publish(LoanEvent::DeviceReturned {
            loan_id: LoanId::from_sequence(1),
            device_id: "cam-001".to_string(),
            returned_at: Utc::now(),
        });

        let mut rx = events.subscribe();
        assert!(rx.try_recv().is_err());
    }
}
