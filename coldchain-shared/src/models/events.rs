use uuid::Uuid;

/// Published after a temperature reading has been appended to an order.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ReadingRecordedEvent {
    pub event_id: Uuid,
    pub order_id: String,
    pub celsius: f64,
    pub observed_at: i64,
    pub reading_count: usize,
}

/// Published after a handoff or customer scan has been evaluated and persisted.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct OrderEvaluatedEvent {
    pub event_id: Uuid,
    pub order_id: String,
    pub checkpoint: String, // LOGISTICS, RETAILER, STORE or CUSTOMER
    pub status: String,
    pub edibility_status: String,
    pub lowest_celsius: Option<f64>,
    pub highest_celsius: Option<f64>,
    pub arrived_late: bool,
    pub timestamp: i64,
}

/// Everything the service fans out to stream subscribers.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShipmentNotification {
    ReadingRecorded(ReadingRecordedEvent),
    OrderEvaluated(OrderEvaluatedEvent),
}

impl ShipmentNotification {
    pub fn order_id(&self) -> &str {
        match self {
            ShipmentNotification::ReadingRecorded(e) => &e.order_id,
            ShipmentNotification::OrderEvaluated(e) => &e.order_id,
        }
    }

    /// SSE event name
    pub fn event_name(&self) -> &'static str {
        match self {
            ShipmentNotification::ReadingRecorded(_) => "reading_recorded",
            ShipmentNotification::OrderEvaluated(_) => "order_evaluated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_is_tagged_by_kind() {
        let event = ShipmentNotification::OrderEvaluated(OrderEvaluatedEvent {
            event_id: Uuid::new_v4(),
            order_id: "ORDER_001".to_string(),
            checkpoint: "STORE".to_string(),
            status: "REJECTED_BY_STORE".to_string(),
            edibility_status: "NO".to_string(),
            lowest_celsius: Some(3.0),
            highest_celsius: Some(12.0),
            arrived_late: false,
            timestamp: chrono::Utc::now().timestamp(),
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["kind"], "order_evaluated");
        assert_eq!(value["order_id"], "ORDER_001");
        assert_eq!(event.order_id(), "ORDER_001");
        assert_eq!(event.event_name(), "order_evaluated");
    }
}
