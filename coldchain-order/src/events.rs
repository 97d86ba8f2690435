use crate::models::Stage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inbound custody events, one order each
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentEvent {
    TemperatureReading {
        order_id: String,
        celsius: f64,
        timestamp: DateTime<Utc>,
    },
    Handoff {
        order_id: String,
        stage: Stage,
        timestamp: DateTime<Utc>,
    },
    CustomerScan {
        order_id: String,
        timestamp: DateTime<Utc>,
    },
}

impl ShipmentEvent {
    pub fn order_id(&self) -> &str {
        match self {
            ShipmentEvent::TemperatureReading { order_id, .. }
            | ShipmentEvent::Handoff { order_id, .. }
            | ShipmentEvent::CustomerScan { order_id, .. } => order_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ShipmentEvent::TemperatureReading { timestamp, .. }
            | ShipmentEvent::Handoff { timestamp, .. }
            | ShipmentEvent::CustomerScan { timestamp, .. } => *timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let json = serde_json::json!({
            "type": "HANDOFF",
            "order_id": "ORDER_001",
            "stage": "RETAILER",
            "timestamp": "2024-03-01T10:00:00Z",
        });

        let event: ShipmentEvent = serde_json::from_value(json).unwrap();
        assert_eq!(event.order_id(), "ORDER_001");
        assert!(matches!(event, ShipmentEvent::Handoff { stage: Stage::Retailer, .. }));
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let json = serde_json::json!({
            "type": "ORDER_SHIPPED",
            "order_id": "ORDER_001",
            "timestamp": "2024-03-01T10:00:00Z",
        });
        assert!(serde_json::from_value::<ShipmentEvent>(json).is_err());
    }
}
