//! Push-channel event types.
//!
//! Events arrive as JSON frames on the push channel. Payloads are carried
//! for logging, but the stores treat every event as a refetch signal only;
//! a partial or stale payload must never be written into store state.

use serde::{Deserialize, Serialize};

use super::id::OrderId;
use super::status::OrderStatus;

/// A server-pushed notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PushEvent {
    /// The backend created an order for this user (e.g., from another
    /// device or a support agent).
    #[serde(rename = "order-created")]
    OrderCreated {
        #[serde(rename = "orderId")]
        order_id: OrderId,
    },
    /// An order's lifecycle status changed server-side.
    #[serde(rename = "order-status-updated")]
    OrderStatusUpdated {
        #[serde(rename = "orderId")]
        order_id: OrderId,
        /// Status hint from the server; informational only.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<OrderStatus>,
    },
}

impl PushEvent {
    /// The kind of this event, for listener registration.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::OrderCreated { .. } => EventKind::OrderCreated,
            Self::OrderStatusUpdated { .. } => EventKind::OrderStatusUpdated,
        }
    }
}

/// Event kinds a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    OrderCreated,
    OrderStatusUpdated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_order_created_frame() {
        let frame = r#"{"type":"order-created","orderId":"o-91"}"#;
        let event: PushEvent = serde_json::from_str(frame).expect("decode");
        assert_eq!(
            event,
            PushEvent::OrderCreated {
                order_id: OrderId::new("o-91")
            }
        );
        assert_eq!(event.kind(), EventKind::OrderCreated);
    }

    #[test]
    fn decodes_status_update_with_and_without_hint() {
        let with_hint =
            r#"{"type":"order-status-updated","orderId":"o-5","status":"preparing"}"#;
        let event: PushEvent = serde_json::from_str(with_hint).expect("decode");
        assert_eq!(
            event,
            PushEvent::OrderStatusUpdated {
                order_id: OrderId::new("o-5"),
                status: Some(OrderStatus::Preparing),
            }
        );

        let without_hint = r#"{"type":"order-status-updated","orderId":"o-5"}"#;
        let event: PushEvent = serde_json::from_str(without_hint).expect("decode");
        assert_eq!(
            event,
            PushEvent::OrderStatusUpdated {
                order_id: OrderId::new("o-5"),
                status: None,
            }
        );
    }
}
