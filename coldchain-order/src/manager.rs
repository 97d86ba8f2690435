use crate::models::{Checkpoint, EdibilityStatus, Order, OrderStatus, Stage};
use chrono::{DateTime, Utc};
use coldchain_core::{evaluate, ComplianceError, Contract, TemperatureReading, Verdict};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What was decided at a checkpoint, alongside the order it produced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    pub order_id: String,
    pub checkpoint: Checkpoint,
    pub verdict: Option<Verdict>,
    pub status: OrderStatus,
    pub edibility_status: EdibilityStatus,
    pub arrived_late: bool,
    pub decided_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub order: Order,
    pub decision: Decision,
}

/// Applies custody events to an order.
///
/// Every operation takes the order by value and hands back the updated one.
/// Stage ordering is not enforced: any handoff may be applied to an order in
/// any status. Out-of-sequence handoffs are only logged.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Append a sensor reading. No status change, never fails.
    pub fn record_reading(mut order: Order, reading: TemperatureReading) -> Order {
        info!(
            "Adding temperature {} to order {}",
            reading.celsius, order.id
        );
        order.push_reading(reading);
        order
    }

    /// Custody passes to `stage`. Acceptance is the default; an excursion
    /// in either direction rejects and spoils the order.
    ///
    /// An order without readings is accepted without any temperature check.
    pub fn handoff_at_stage(
        mut order: Order,
        contract: &Contract,
        stage: Stage,
        at: DateTime<Utc>,
    ) -> Result<Transition, OrderError> {
        let checkpoint = Checkpoint::from(stage);
        Self::log_arrival(&order, contract, checkpoint, at);

        order.update_status(stage.accepted());

        if !order.has_readings() {
            warn!(
                "Order {} handed to {} without any temperature readings",
                order.id, stage
            );
            return Ok(Self::conclude(order, contract, checkpoint, None, at));
        }

        let verdict = evaluate(order.readings().as_slice(), contract)?;
        info!("Lowest temp reading: {}", verdict.lowest.celsius);
        info!("Highest temp reading: {}", verdict.highest.celsius);

        if verdict.violates_low {
            warn!(
                "Order {}: temperature {} lower than contract minimum {}",
                order.id, verdict.lowest.celsius, contract.min_temperature
            );
        }
        if verdict.violates_high {
            warn!(
                "Order {}: temperature {} higher than contract maximum {}",
                order.id, verdict.highest.celsius, contract.max_temperature
            );
        }
        if !verdict.compliant {
            order.mark_inedible();
            order.update_status(stage.rejected());
        }

        Ok(Self::conclude(order, contract, checkpoint, Some(verdict), at))
    }

    /// Final decision by the end customer. Unlike a handoff, a scan needs
    /// at least one reading.
    pub fn customer_scan(
        mut order: Order,
        contract: &Contract,
        at: DateTime<Utc>,
    ) -> Result<Transition, OrderError> {
        let verdict = evaluate(order.readings().as_slice(), contract)
            .map_err(|_| OrderError::NoReadings(order.id.clone()))?;

        Self::log_arrival(&order, contract, Checkpoint::Customer, at);

        if !order.is_edible() || verdict.violates_low || verdict.violates_high {
            info!("Order {} unsafe for purchase", order.id);
            order.update_status(OrderStatus::RejectedByCustomer);
            order.mark_inedible();
        } else {
            info!("Order {} safe for purchase", order.id);
            order.update_status(OrderStatus::AcceptedByCustomer);
        }

        Ok(Self::conclude(
            order,
            contract,
            Checkpoint::Customer,
            Some(verdict),
            at,
        ))
    }

    fn log_arrival(order: &Order, contract: &Contract, checkpoint: Checkpoint, at: DateTime<Utc>) {
        info!("Received at: {}", at);
        info!("Contract arrival deadline: {}", contract.arrival_deadline);

        if !checkpoint.expected_prior().contains(&order.status()) {
            warn!(
                "Order {} reached {} out of sequence (current status {})",
                order.id,
                checkpoint,
                order.status()
            );
        }
        if contract.is_late(at) {
            warn!(
                "Order {} reached {} after the contract arrival deadline",
                order.id, checkpoint
            );
        }
    }

    fn conclude(
        order: Order,
        contract: &Contract,
        checkpoint: Checkpoint,
        verdict: Option<Verdict>,
        at: DateTime<Utc>,
    ) -> Transition {
        let decision = Decision {
            order_id: order.id.clone(),
            checkpoint,
            verdict,
            status: order.status(),
            edibility_status: order.edibility_status(),
            arrived_late: contract.is_late(at),
            decided_at: at,
        };
        Transition { order, decision }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("Order {0} has no temperature readings; a customer scan requires at least one")]
    NoReadings(String),

    #[error(transparent)]
    Compliance(#[from] ComplianceError),
}
